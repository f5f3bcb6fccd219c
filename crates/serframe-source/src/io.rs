use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use tracing::trace;

use crate::error::{Result, SourceError};
use crate::traits::{ByteSource, ReadStatus};

/// Adapts any `std::io::Read` into a [`ByteSource`].
///
/// `Ok(0)` means end of stream. `WouldBlock` and `TimedOut` (non-blocking
/// descriptors, serial ports with a read timeout) are reported as idle.
/// `Interrupted` reads are retried.
#[derive(Debug)]
pub struct IoSource<R> {
    inner: R,
}

impl<R: Read> IoSource<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Borrow the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Mutably borrow the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Consume the source and return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl IoSource<BufReader<File>> {
    /// Open a capture file as a buffered source.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: Read> ByteSource for IoSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        if buf.is_empty() {
            return Ok(ReadStatus::Idle);
        }
        loop {
            return match self.inner.read(buf) {
                Ok(0) => Ok(ReadStatus::Closed),
                Ok(n) => Ok(ReadStatus::Data(n)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) =>
                {
                    trace!(kind = ?err.kind(), "reader has no data");
                    Ok(ReadStatus::Idle)
                }
                Err(err) => Err(SourceError::Io(err)),
            };
        }
    }
}
