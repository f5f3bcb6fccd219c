use std::time::Duration;

use serframe_source::SourceError;

use crate::checksum::Checksum;

/// Errors that can occur while synchronizing, reading or encoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The source closed before a full run of start markers was seen.
    #[error("source exhausted before start marker run")]
    SyncFailed,

    /// The identifier maps to a frame that does not fit the frame budget.
    #[error("message 0x{id:02X} declares {size} bytes (max {max})")]
    OversizedMessage { id: u8, size: usize, max: usize },

    /// The identifier maps to a frame too short to carry a checksum slot.
    #[error("message 0x{id:02X} declares {size} bytes (min {min})")]
    UndersizedMessage { id: u8, size: usize, min: usize },

    /// The catalog has no entry for the identifier.
    #[error("unknown message identifier 0x{id:02X}")]
    UnknownMessage { id: u8 },

    /// The transmitted checksum slot does not match the computed checksum.
    #[error("bad checksum for message 0x{id:02X} (computed {computed:02X?}, received {received:02X?})")]
    BadChecksum {
        id: u8,
        computed: Checksum,
        received: Checksum,
    },

    /// A slot is not terminated by the separator byte.
    #[error("bad separator in slot {slot} of message 0x{id:02X} (found 0x{found:02X})")]
    BadSeparators { id: u8, slot: usize, found: u8 },

    /// The source closed in the middle of a message.
    #[error("source closed mid-frame ({received} of {expected} bytes)")]
    Truncated { expected: usize, received: usize },

    /// No bytes arrived within the configured idle timeout.
    #[error("no data for {0:?}")]
    IdleTimeout(Duration),

    /// The caller's stop signal was raised while waiting for bytes.
    #[error("stop requested")]
    Cancelled,

    /// A frame body cannot be encoded.
    #[error("cannot encode body of {len} bytes: {reason}")]
    InvalidBody { len: usize, reason: &'static str },

    /// The byte source failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// An I/O error occurred while writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Returns true if the error only discards the current frame and the
    /// stream can be resynchronized.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FrameError::OversizedMessage { .. }
                | FrameError::UndersizedMessage { .. }
                | FrameError::UnknownMessage { .. }
                | FrameError::BadChecksum { .. }
                | FrameError::BadSeparators { .. }
                | FrameError::Truncated { .. }
                | FrameError::IdleTimeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
