use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod check;
pub mod decode;
pub mod encode;
pub mod envinfo;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode frames from a capture file, stdin, or a serial device.
    Decode(DecodeArgs),
    /// Encode a frame body (hex) into wire bytes.
    Encode(EncodeArgs),
    /// Validate a single frame (hex, without start markers).
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Check(args) => check::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to decode ("-" for stdin).
    #[arg(default_value = "-", conflicts_with = "serial")]
    pub input: PathBuf,
    /// Serial device to read from instead of a file.
    #[arg(long, value_name = "DEVICE")]
    pub serial: Option<String>,
    /// Serial line speed.
    #[arg(long, default_value = "115200", requires = "serial")]
    pub baud: u32,
    /// Message catalog (JSON object of identifier to frame length).
    #[arg(long, value_name = "FILE", env = "SERFRAME_CATALOG")]
    pub catalog: Option<PathBuf>,
    /// Stop after this much silence (e.g. 5s, 500ms). Default: wait forever.
    #[arg(long, env = "SERFRAME_IDLE_TIMEOUT")]
    pub idle_timeout: Option<String>,
    /// Delay between polls while the line is idle.
    #[arg(long, default_value = "10ms", env = "SERFRAME_POLL_INTERVAL")]
    pub poll_interval: String,
    /// Treat the first empty read as end of input.
    #[arg(long, conflicts_with = "idle_timeout")]
    pub end_on_idle: bool,
    /// Exit after dispatching N frames.
    #[arg(long)]
    pub count: Option<u64>,
    /// Exit after N synchronize/read iterations.
    #[arg(long)]
    pub max_iterations: Option<u64>,
    /// Print a decode summary when the loop stops.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Frame body as hex: identifier first, a multiple of 4 bytes, no separators.
    pub body: String,
    /// Message catalog used to check the identifier against the frame length.
    #[arg(long, value_name = "FILE", env = "SERFRAME_CATALOG")]
    pub catalog: Option<PathBuf>,
    /// Encode even if the catalog disagrees with the frame length.
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Frame as hex, identifier through final separator.
    pub frame: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}

pub(crate) fn parse_hex(label: &str, input: &str) -> CliResult<Vec<u8>> {
    let cleaned: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    hex::decode(&cleaned).map_err(|err| CliError::new(USAGE, format!("{label} is not valid hex: {err}")))
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}
