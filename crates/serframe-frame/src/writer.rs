use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

use crate::codec::{encode_frame, Frame, MAX_MESSAGE_SIZE, MIN_START_BYTES, START_BYTE};
use crate::error::{FrameError, Result};

/// Writes complete frames, start markers included, to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(MAX_MESSAGE_SIZE),
        }
    }

    /// Write an already validated frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.buf.clear();
        self.buf.put_bytes(START_BYTE, MIN_START_BYTES);
        self.buf.put_slice(frame.as_bytes());
        self.flush_buf()
    }

    /// Encode and send a frame body (identifier first, no separators).
    pub fn send(&mut self, body: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(body, &mut self.buf)?;
        self.flush_buf()
    }

    fn flush_buf(&mut self) -> Result<()> {
        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => {
                    return Err(FrameError::Io(std::io::Error::from(ErrorKind::WriteZero)))
                }
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        self.inner.flush()?;
        Ok(())
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use serframe_source::MemorySource;

    use super::*;
    use crate::reader::FrameReader;

    #[test]
    fn send_then_read_back() {
        let mut writer = FrameWriter::new(Vec::new());
        writer
            .send(&[0x0F, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04])
            .unwrap();
        writer.send(&[0x0A, 0x00, 0x00, 0x00]).unwrap();

        let mut reader = FrameReader::new(MemorySource::new(writer.into_inner()));
        let first = reader.read_frame().unwrap();
        let second = reader.read_frame().unwrap();

        assert_eq!(first.id(), 0x0F);
        assert_eq!(second.id(), 0x0A);
        assert_eq!(second.as_bytes(), &[0x0A, 0, 0, 0, 0xFE, 0x0A, 0, 0, 0, 0xFE]);
    }

    #[test]
    fn write_frame_prefixes_markers() {
        let frame = Frame::parse(vec![0x00, 0x00, 0x00, 0x00, 0xFE]).unwrap();
        let mut writer = FrameWriter::new(Vec::new());
        writer.write_frame(&frame).unwrap();

        assert_eq!(
            writer.get_ref().as_slice(),
            &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0xFE]
        );
    }

    #[test]
    fn send_rejects_bad_body() {
        let mut writer = FrameWriter::new(Vec::new());
        assert!(matches!(
            writer.send(&[1, 2]),
            Err(FrameError::InvalidBody { .. })
        ));
        assert!(writer.get_mut().is_empty());
    }

    struct ChunkedWriter {
        written: Vec<u8>,
        interrupted: bool,
    }

    impl Write for ChunkedWriter {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(ErrorKind::Interrupted.into());
            }
            let n = buf.len().min(3);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn partial_writes_complete() {
        let mut writer = FrameWriter::new(ChunkedWriter {
            written: Vec::new(),
            interrupted: false,
        });
        writer.send(&[0x0A, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(writer.into_inner().written.len(), 15);
    }

    struct ClosedWriter;

    impl Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn zero_write_is_an_error() {
        let mut writer = FrameWriter::new(ClosedWriter);
        let err = writer.send(&[0x0A, 0, 0, 0]).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WriteZero));
    }
}
