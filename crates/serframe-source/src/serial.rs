use std::time::Duration;

use serialport::SerialPort;
use tracing::info;

use crate::error::Result;
use crate::io::IoSource;

/// Default line speed.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Serial device settings.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line speed in baud.
    pub baud_rate: u32,
    /// Per-read timeout. A read that times out is reported as idle.
    pub read_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(100),
        }
    }
}

/// Open a serial device as a byte source.
pub fn open_serial(path: &str, config: &SerialConfig) -> Result<IoSource<Box<dyn SerialPort>>> {
    let port = serialport::new(path, config.baud_rate)
        .timeout(config.read_timeout)
        .open()?;
    info!(path, baud = config.baud_rate, "serial port opened");
    Ok(IoSource::new(port))
}
