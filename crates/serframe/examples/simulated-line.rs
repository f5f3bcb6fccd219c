//! Decode a simulated serial line with a noisy prefix and one corrupt frame.
//!
//! Run with:
//!   cargo run --example simulated-line
//!
//! The same stream can be written to a file and fed to the CLI:
//!   cargo run -- decode capture.bin --summary

use serframe::frame::{Decoder, DecoderConfig, Frame, FrameWriter, IdentityCatalog, IdlePolicy};
use serframe::source::MemorySource;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = FrameWriter::new(vec![0x00, 0x13, 0xFF, 0x00]);
    writer.send(&[0x0F, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04])?;
    writer.send(&[0x0A, 0xDE, 0xAD, 0xBE])?;
    let mut line = writer.into_inner();

    // Flip a data byte in the second frame so its checksum no longer matches.
    let corrupt_at = line.len() - 8;
    line[corrupt_at] ^= 0x01;
    writer = FrameWriter::new(line);
    writer.send(&[0x0A, 0x11, 0x22, 0x33])?;
    let line = writer.into_inner();

    // Deliver in small bursts with a pause mid-stream, like a UART would.
    let source = MemorySource::new(line)
        .with_max_chunk(3)
        .with_idle_gap(12, 5);
    let config = DecoderConfig {
        idle: IdlePolicy::default(),
        ..DecoderConfig::default()
    };

    let dispatch = |frame: Frame, id: u8| {
        println!("id=0x{id:02X} len={} data={:02X?}", frame.len(), frame.data());
    };
    let mut decoder = Decoder::with_catalog(source, IdentityCatalog, config, dispatch);
    let summary = decoder.run()?;

    eprintln!(
        "stopped: {:?}, dispatched {}, discarded {}",
        summary.stop,
        summary.stats.dispatched,
        summary.stats.discarded()
    );
    Ok(())
}
