//! Byte source abstraction for serial framing.
//!
//! Provides a single pull-based capability, [`ByteSource::read`], over
//! different origins of bytes:
//! - In-memory buffers with a scripted delivery pattern ([`MemorySource`])
//! - Any `std::io::Read` such as files, pipes or stdin ([`IoSource`])
//! - Serial devices (behind the `serial` feature)
//!
//! This is the lowest layer of serframe. The decoder in `serframe-frame`
//! never sees anything but the [`ReadStatus`] returned here.

pub mod error;
pub mod io;
pub mod memory;
#[cfg(feature = "serial")]
pub mod serial;
pub mod traits;

pub use error::{Result, SourceError};
pub use io::IoSource;
pub use memory::MemorySource;
#[cfg(feature = "serial")]
pub use serial::{open_serial, SerialConfig};
pub use traits::{ByteSource, ReadStatus};
