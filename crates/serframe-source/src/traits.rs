use crate::error::Result;

/// Outcome of a single [`ByteSource::read`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// `n` bytes (always at least one) were written to the front of the buffer.
    Data(usize),
    /// No bytes are available right now; more may arrive later.
    Idle,
    /// The source is permanently exhausted.
    Closed,
}

/// A pull-based supplier of raw bytes.
///
/// Implementations own their read position exclusively. A read may return
/// fewer bytes than `buf.len()`. Transient starvation is reported as
/// [`ReadStatus::Idle`] and must be kept distinct from end of stream.
pub trait ByteSource {
    /// Read up to `buf.len()` bytes into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        (**self).read(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        (**self).read(buf)
    }
}
