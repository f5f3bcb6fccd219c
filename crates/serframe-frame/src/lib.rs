//! Start-marker framing with slot-aligned XOR checksums for serial links.
//!
//! Every frame on the wire looks like:
//! - A run of at least 5 start markers (`0xFF`) for stream synchronization
//! - An identifier byte whose catalog entry gives the frame length
//! - 4-byte data slots, each terminated by a separator (`0xFE`)
//! - A final checksum slot carrying the per-column XOR of the data bytes
//!
//! [`FrameReader`] handles synchronization and accumulation, and
//! [`Decoder`] drives it in a loop, handing valid frames to a [`Dispatcher`].

pub mod catalog;
pub mod checksum;
pub mod codec;
pub mod decoder;
pub mod dispatch;
pub mod error;
pub mod reader;
pub mod writer;

pub use catalog::{IdentityCatalog, MessageCatalog, SizeTable};
pub use checksum::{compute_checksum, Checksum};
pub use codec::{
    encode_frame, validate_packet, DecoderConfig, Frame, IdlePolicy, Verdict, CHECKSUM_SIZE,
    MAX_FRAME_LEN, MAX_MESSAGE_SIZE, MIN_START_BYTES, PAYLOAD_UNIT_SIZE, SEPARATOR_BYTE,
    START_BYTE,
};
pub use decoder::{DecodeState, DecodeStats, DecodeSummary, Decoder, Step, StopReason};
pub use dispatch::{Dispatcher, LogDispatcher};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;
