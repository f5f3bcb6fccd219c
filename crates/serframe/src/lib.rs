//! Serial start-marker frame decoder with slot-aligned XOR checksums.
//!
//! serframe pulls bytes from a serial line (or anything that looks like one),
//! locks onto runs of `0xFF` start markers, reads identifier-sized frames,
//! and checks their separator bytes and XOR checksum before dispatch.
//!
//! # Crate Structure
//!
//! - [`source`]: Byte sources (memory, `io::Read`, serial ports behind `serial`)
//! - [`frame`]: Checksum, validation, frame reader and decode loop

/// Re-export byte source types.
pub mod source {
    pub use serframe_source::*;
}

/// Re-export frame types.
pub mod frame {
    pub use serframe_frame::*;
}
