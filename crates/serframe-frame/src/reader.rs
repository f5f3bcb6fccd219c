use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use bytes::{BufMut, BytesMut};
use serframe_source::{ByteSource, ReadStatus};
use tracing::{debug, trace, warn};

use crate::catalog::{IdentityCatalog, MessageCatalog};
use crate::codec::{
    check_packet, DecoderConfig, Frame, IdlePolicy, BYTES_TO_READ, MAX_FRAME_LEN,
    MIN_START_BYTES, PAYLOAD_UNIT_SIZE, START_BYTE,
};
use crate::error::{FrameError, Result};

/// Reads complete, validated frames from any [`ByteSource`].
///
/// Bytes are pulled one at a time. [`synchronize`](Self::synchronize) scans
/// for the start marker run and [`read_message`](Self::read_message) reads
/// and validates the frame that follows it.
pub struct FrameReader<S, C = IdentityCatalog> {
    source: S,
    catalog: C,
    config: DecoderConfig,
    consumed: u64,
}

impl<S: ByteSource> FrameReader<S> {
    /// Create a frame reader with the identity catalog and default configuration.
    pub fn new(source: S) -> Self {
        Self::with_config(source, DecoderConfig::default())
    }

    /// Create a frame reader with the identity catalog and explicit configuration.
    pub fn with_config(source: S, config: DecoderConfig) -> Self {
        Self::with_catalog(source, IdentityCatalog, config)
    }
}

impl<S: ByteSource, C: MessageCatalog> FrameReader<S, C> {
    /// Create a frame reader with an explicit catalog and configuration.
    pub fn with_catalog(source: S, catalog: C, config: DecoderConfig) -> Self {
        Self {
            source,
            catalog,
            config,
            consumed: 0,
        }
    }

    /// Consume bytes until `MIN_START_BYTES` consecutive start markers are seen.
    ///
    /// Returns `Err(FrameError::SyncFailed)` when the source runs out first.
    /// The byte following the marker run is left for `read_message`.
    pub fn synchronize(&mut self) -> Result<()> {
        let mut start_bytes = 0usize;
        while start_bytes < MIN_START_BYTES {
            let Some(byte) = self.next_byte()? else {
                debug!(start_bytes, "source exhausted while seeking sync");
                return Err(FrameError::SyncFailed);
            };
            if byte == START_BYTE {
                start_bytes += 1;
            } else {
                start_bytes = 0;
            }
            trace!(start_bytes, "scanning for start markers");
        }
        debug!(consumed = self.consumed, "synchronized");
        Ok(())
    }

    /// Read and validate the frame following a start marker run.
    ///
    /// The identifier's catalog size is checked against the frame budget
    /// before any further byte is consumed.
    pub fn read_message(&mut self) -> Result<Frame> {
        let Some(id) = self.next_byte()? else {
            return Err(FrameError::Truncated {
                expected: 1,
                received: 0,
            });
        };
        let size = self.catalog.size_of(id).ok_or_else(|| {
            warn!(id, "unknown message identifier");
            FrameError::UnknownMessage { id }
        })?;
        if size > MAX_FRAME_LEN {
            warn!(id, size, "invalid message size");
            return Err(FrameError::OversizedMessage {
                id,
                size,
                max: MAX_FRAME_LEN,
            });
        }
        if size < PAYLOAD_UNIT_SIZE {
            warn!(id, size, "invalid message size");
            return Err(FrameError::UndersizedMessage {
                id,
                size,
                min: PAYLOAD_UNIT_SIZE,
            });
        }

        let mut message = BytesMut::with_capacity(size);
        message.put_u8(id);
        while message.len() < size {
            match self.next_byte()? {
                Some(byte) => {
                    trace!(index = message.len(), byte, "message byte");
                    message.put_u8(byte);
                }
                None => {
                    return Err(FrameError::Truncated {
                        expected: size,
                        received: message.len(),
                    })
                }
            }
        }

        if let Err(err) = check_packet(&message) {
            warn!(%err, "discarding frame");
            return Err(err);
        }
        Ok(Frame::from_validated(message.freeze()))
    }

    /// Synchronize, then read the next frame.
    pub fn read_frame(&mut self) -> Result<Frame> {
        self.synchronize()?;
        self.read_message()
    }

    /// Pull one byte, applying the idle policy while the source is starved.
    ///
    /// `Ok(None)` means the stream has ended.
    fn next_byte(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; BYTES_TO_READ];
        let mut idle_since: Option<Instant> = None;
        loop {
            if self.cancel_requested() {
                debug!(consumed = self.consumed, "stop requested");
                return Err(FrameError::Cancelled);
            }
            match self.source.read(&mut buf)? {
                ReadStatus::Data(_) => {
                    self.consumed += 1;
                    return Ok(Some(buf[0]));
                }
                ReadStatus::Closed => return Ok(None),
                ReadStatus::Idle => match self.config.idle {
                    IdlePolicy::TreatAsEnd => return Ok(None),
                    IdlePolicy::Wait {
                        poll_interval,
                        timeout,
                    } => {
                        let since = *idle_since.get_or_insert_with(Instant::now);
                        if let Some(timeout) = timeout {
                            let waited = since.elapsed();
                            if waited >= timeout {
                                return Err(FrameError::IdleTimeout(waited));
                            }
                        }
                        if poll_interval > Duration::ZERO {
                            std::thread::sleep(poll_interval);
                        }
                    }
                },
            }
        }
    }

    fn cancel_requested(&self) -> bool {
        self.config
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Total bytes consumed from the source.
    pub fn bytes_consumed(&self) -> u64 {
        self.consumed
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> S {
        self.source
    }

    /// The catalog used to size frames.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Current reader configuration.
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}
