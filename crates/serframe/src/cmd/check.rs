use serframe_frame::{validate_packet, Frame, Verdict};

use crate::cmd::{parse_hex, CheckArgs};
use crate::exit::{CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_verdict, OutputFormat};

pub fn run(args: CheckArgs, format: OutputFormat) -> CliResult<i32> {
    let bytes = parse_hex("frame", &args.frame)?;
    let (verdict, detail) = inspect(bytes);
    print_verdict(verdict_name(verdict), detail.as_deref(), format);

    match verdict {
        Verdict::Ok => Ok(SUCCESS),
        Verdict::BadChecksum | Verdict::BadSeparators => Ok(DATA_INVALID),
    }
}

fn inspect(bytes: Vec<u8>) -> (Verdict, Option<String>) {
    let verdict = validate_packet(&bytes);
    let detail = Frame::parse(bytes).err().map(|err| err.to_string());
    (verdict, detail)
}

fn verdict_name(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Ok => "ok",
        Verdict::BadChecksum => "bad-checksum",
        Verdict::BadSeparators => "bad-separators",
    }
}
