use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serframe_frame::{DecodeSummary, Frame, StopReason};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct FrameOutput {
    schema_id: &'static str,
    id: u8,
    len: usize,
    wire_size: usize,
    data: String,
    checksum: String,
    frame: String,
    timestamp: String,
}

impl FrameOutput {
    fn new(frame: &Frame) -> Self {
        Self {
            schema_id: "https://schemas.3leaps.dev/serframe/cli/v1/frame-decoded.schema.json",
            id: frame.id(),
            len: frame.len(),
            wire_size: frame.wire_size(),
            data: hex::encode(frame.data()),
            checksum: hex::encode(frame.checksum()),
            frame: hex::encode(frame.as_bytes()),
            timestamp: now_unix_seconds(),
        }
    }
}

pub fn print_frame(frame: &Frame, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&FrameOutput::new(frame)).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let out = FrameOutput::new(frame);
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ID", "LEN", "CHECKSUM", "DATA"])
                .add_row(vec![
                    format!("0x{:02X}", out.id),
                    out.len.to_string(),
                    out.checksum,
                    out.data,
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let out = FrameOutput::new(frame);
            println!(
                "id=0x{:02X} len={} checksum={} data={}",
                out.id, out.len, out.checksum, out.data
            );
        }
        OutputFormat::Raw => print_raw(frame.as_bytes()),
    }
}

#[derive(Serialize)]
struct SummaryOutput {
    schema_id: &'static str,
    stop: &'static str,
    iterations: u64,
    dispatched: u64,
    bad_checksum: u64,
    bad_separators: u64,
    oversized: u64,
    undersized: u64,
    unknown: u64,
    truncated: u64,
    stalled: u64,
    bytes_consumed: u64,
}

pub fn print_summary(summary: &DecodeSummary, format: OutputFormat) {
    let stats = &summary.stats;
    let out = SummaryOutput {
        schema_id: "https://schemas.3leaps.dev/serframe/cli/v1/decode-summary.schema.json",
        stop: stop_name(summary.stop),
        iterations: stats.iterations,
        dispatched: stats.dispatched,
        bad_checksum: stats.bad_checksum,
        bad_separators: stats.bad_separators,
        oversized: stats.oversized,
        undersized: stats.undersized,
        unknown: stats.unknown,
        truncated: stats.truncated,
        stalled: stats.stalled,
        bytes_consumed: stats.bytes_consumed,
    };

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
        ),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STOP", "DISPATCHED", "DISCARDED", "BYTES"])
                .add_row(vec![
                    out.stop.to_string(),
                    out.dispatched.to_string(),
                    stats.discarded().to_string(),
                    out.bytes_consumed.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => println!(
            "stopped={} dispatched={} bad_checksum={} bad_separators={} oversized={} bytes={}",
            out.stop,
            out.dispatched,
            out.bad_checksum,
            out.bad_separators,
            out.oversized,
            out.bytes_consumed
        ),
        // Raw output carries frame bytes only.
        OutputFormat::Raw => {}
    }
}

#[derive(Serialize)]
struct VerdictOutput<'a> {
    schema_id: &'static str,
    verdict: &'static str,
    detail: Option<&'a str>,
}

pub fn print_verdict(verdict: &'static str, detail: Option<&str>, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = VerdictOutput {
                schema_id: "https://schemas.3leaps.dev/serframe/cli/v1/frame-check.schema.json",
                verdict,
                detail,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => match detail {
            Some(detail) => println!("{verdict}: {detail}"),
            None => println!("{verdict}"),
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn stop_name(stop: StopReason) -> &'static str {
    match stop {
        StopReason::Exhausted => "exhausted",
        StopReason::IdleTimeout => "idle-timeout",
        StopReason::IterationLimit => "iteration-limit",
        StopReason::Requested => "requested",
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
