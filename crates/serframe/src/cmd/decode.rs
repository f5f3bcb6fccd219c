use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serframe_frame::{Decoder, DecoderConfig, Frame, IdlePolicy, StopReason};
use serframe_source::{ByteSource, IoSource};
use tracing::info;

use crate::catalog::load_catalog;
use crate::cmd::{parse_duration, DecodeArgs};
use crate::exit::{frame_error, source_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::{print_frame, print_summary, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let stop = Arc::new(AtomicBool::new(false));
    let mut config = decoder_config(&args)?;
    config.cancel = Some(stop.clone());
    let catalog = load_catalog(args.catalog.as_deref())?;
    let source = open_source(&args)?;

    install_ctrlc_handler(stop)?;

    let dispatcher = |frame: Frame, _id: u8| print_frame(&frame, format);
    let mut decoder = Decoder::with_catalog(source, catalog, config, dispatcher);

    let count = args.count;
    let summary = decoder
        .run_until(|stats| count.is_some_and(|n| stats.dispatched >= n))
        .map_err(|err| frame_error("decode failed", err))?;

    if args.summary {
        print_summary(&summary, format);
    }

    match summary.stop {
        StopReason::IdleTimeout if summary.stats.dispatched == 0 => Err(CliError::new(
            TIMEOUT,
            "no frames before idle timeout",
        )),
        _ => Ok(SUCCESS),
    }
}

fn decoder_config(args: &DecodeArgs) -> CliResult<DecoderConfig> {
    let idle = if args.end_on_idle {
        IdlePolicy::TreatAsEnd
    } else {
        IdlePolicy::Wait {
            poll_interval: parse_duration(&args.poll_interval)?,
            timeout: args.idle_timeout.as_deref().map(parse_duration).transpose()?,
        }
    };
    Ok(DecoderConfig {
        idle,
        max_iterations: args.max_iterations,
        cancel: None,
    })
}

fn open_source(args: &DecodeArgs) -> CliResult<Box<dyn ByteSource>> {
    if let Some(device) = &args.serial {
        return open_serial(device, args.baud);
    }

    if args.input.as_os_str() == "-" {
        info!("reading from stdin");
        return Ok(Box::new(IoSource::new(std::io::stdin().lock())));
    }

    let source = IoSource::open(&args.input)
        .map_err(|err| source_error("failed opening capture", err))?;
    info!(path = %args.input.display(), "reading capture file");
    Ok(Box::new(source))
}

#[cfg(feature = "serial")]
fn open_serial(device: &str, baud: u32) -> CliResult<Box<dyn ByteSource>> {
    let config = serframe_source::SerialConfig {
        baud_rate: baud,
        ..serframe_source::SerialConfig::default()
    };
    let source = serframe_source::open_serial(device, &config)
        .map_err(|err| source_error(&format!("failed opening {device}"), err))?;
    Ok(Box::new(source))
}

#[cfg(not(feature = "serial"))]
fn open_serial(_device: &str, _baud: u32) -> CliResult<Box<dyn ByteSource>> {
    Err(CliError::new(
        crate::exit::USAGE,
        "serial support not compiled in (rebuild with --features serial)",
    ))
}

/// The first Ctrl-C raises the decoder's stop signal. A second one exits
/// immediately, for sources blocked inside a read that never goes idle.
fn install_ctrlc_handler(stop: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        if stop.swap(true, Ordering::SeqCst) {
            std::process::exit(crate::exit::INTERRUPTED);
        }
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
