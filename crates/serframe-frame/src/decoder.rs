use serframe_source::ByteSource;
use tracing::{debug, info};

use crate::catalog::{IdentityCatalog, MessageCatalog};
use crate::codec::DecoderConfig;
use crate::dispatch::Dispatcher;
use crate::error::{FrameError, Result};
use crate::reader::FrameReader;

/// Decode loop position.
///
/// `SeekingSync` until a start marker run is found, then `ReadingMessage`
/// until the frame is dispatched or discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    SeekingSync,
    ReadingMessage,
}

/// Why the decode loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The source closed while seeking a start marker run.
    Exhausted,
    /// The source stayed idle past the configured timeout while seeking.
    IdleTimeout,
    /// `max_iterations` was reached.
    IterationLimit,
    /// The caller's stop condition or stop signal fired.
    Requested,
}

/// Outcome of one decode phase or iteration.
#[derive(Debug)]
pub enum Step {
    /// A start marker run was found; the decoder is now reading the message.
    /// Only returned by [`Decoder::advance`].
    Synchronized,
    /// A valid frame was handed to the dispatcher.
    Dispatched { id: u8, len: usize },
    /// The frame was rejected; the loop resynchronizes next.
    Discarded(FrameError),
    /// The loop cannot continue.
    Stopped(StopReason),
}

/// Running counters for a decode loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    pub iterations: u64,
    pub dispatched: u64,
    pub bad_checksum: u64,
    pub bad_separators: u64,
    pub oversized: u64,
    pub undersized: u64,
    pub unknown: u64,
    pub truncated: u64,
    pub stalled: u64,
    pub bytes_consumed: u64,
}

impl DecodeStats {
    /// Frames that were fully or partially read and then thrown away.
    pub fn discarded(&self) -> u64 {
        self.bad_checksum
            + self.bad_separators
            + self.oversized
            + self.undersized
            + self.unknown
            + self.truncated
            + self.stalled
    }

    fn record(&mut self, err: &FrameError) {
        match err {
            FrameError::BadChecksum { .. } => self.bad_checksum += 1,
            FrameError::BadSeparators { .. } => self.bad_separators += 1,
            FrameError::OversizedMessage { .. } => self.oversized += 1,
            FrameError::UndersizedMessage { .. } => self.undersized += 1,
            FrameError::UnknownMessage { .. } => self.unknown += 1,
            FrameError::Truncated { .. } => self.truncated += 1,
            FrameError::IdleTimeout(_) => self.stalled += 1,
            _ => {}
        }
    }
}

/// Final report of [`Decoder::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeSummary {
    pub stop: StopReason,
    pub stats: DecodeStats,
}

/// Synchronize, read, dispatch; repeated until the source gives out.
///
/// Rejected frames never abort the loop: the partial frame is dropped and
/// the next iteration resynchronizes on the following start marker run.
/// Only source failures are returned as errors.
pub struct Decoder<S, D, C = IdentityCatalog> {
    reader: FrameReader<S, C>,
    dispatcher: D,
    state: DecodeState,
    stats: DecodeStats,
}

impl<S: ByteSource, D: Dispatcher> Decoder<S, D> {
    /// Create a decoder with the identity catalog and default configuration.
    pub fn new(source: S, dispatcher: D) -> Self {
        Self::from_reader(FrameReader::new(source), dispatcher)
    }
}

impl<S: ByteSource, D: Dispatcher, C: MessageCatalog> Decoder<S, D, C> {
    /// Create a decoder with an explicit catalog and configuration.
    pub fn with_catalog(source: S, catalog: C, config: DecoderConfig, dispatcher: D) -> Self {
        Self::from_reader(FrameReader::with_catalog(source, catalog, config), dispatcher)
    }

    /// Drive an existing frame reader.
    pub fn from_reader(reader: FrameReader<S, C>, dispatcher: D) -> Self {
        Self {
            reader,
            dispatcher,
            state: DecodeState::SeekingSync,
            stats: DecodeStats::default(),
        }
    }

    /// Run one phase of the state machine.
    ///
    /// In `SeekingSync` this synchronizes and returns [`Step::Synchronized`].
    /// In `ReadingMessage` it reads the frame, dispatches or discards it, and
    /// returns to `SeekingSync`.
    pub fn advance(&mut self) -> Result<Step> {
        match self.state {
            DecodeState::SeekingSync => self.seek(),
            DecodeState::ReadingMessage => self.read(),
        }
    }

    /// Run one full iteration: synchronize, read, then dispatch or discard.
    pub fn step(&mut self) -> Result<Step> {
        loop {
            match self.advance()? {
                Step::Synchronized => continue,
                step => return Ok(step),
            }
        }
    }

    fn seek(&mut self) -> Result<Step> {
        if let Some(max) = self.reader.config().max_iterations {
            if self.stats.iterations >= max {
                return Ok(Step::Stopped(StopReason::IterationLimit));
            }
        }
        self.stats.iterations += 1;

        let synced = self.reader.synchronize();
        self.stats.bytes_consumed = self.reader.bytes_consumed();
        match synced {
            Ok(()) => {
                self.state = DecodeState::ReadingMessage;
                Ok(Step::Synchronized)
            }
            Err(FrameError::SyncFailed) => Ok(Step::Stopped(StopReason::Exhausted)),
            Err(FrameError::IdleTimeout(waited)) => {
                debug!(?waited, "no start marker run before idle timeout");
                Ok(Step::Stopped(StopReason::IdleTimeout))
            }
            Err(FrameError::Cancelled) => Ok(Step::Stopped(StopReason::Requested)),
            Err(err) => Err(err),
        }
    }

    fn read(&mut self) -> Result<Step> {
        let read = self.reader.read_message();
        self.stats.bytes_consumed = self.reader.bytes_consumed();
        self.state = DecodeState::SeekingSync;
        match read {
            Ok(frame) => {
                let id = frame.id();
                let len = frame.len();
                self.dispatcher.dispatch(frame, id);
                self.stats.dispatched += 1;
                Ok(Step::Dispatched { id, len })
            }
            Err(FrameError::Cancelled) => {
                debug!("partial frame dropped on stop request");
                Ok(Step::Stopped(StopReason::Requested))
            }
            Err(err) if err.is_recoverable() => {
                self.stats.record(&err);
                Ok(Step::Discarded(err))
            }
            Err(err) => Err(err),
        }
    }

    /// Decode until the source is exhausted, idles out, or the iteration
    /// limit is reached.
    pub fn run(&mut self) -> Result<DecodeSummary> {
        self.run_until(|_| false)
    }

    /// Like [`run`](Self::run), but also stops once `stop` returns true.
    /// `stop` is checked before every iteration.
    pub fn run_until(&mut self, mut stop: impl FnMut(&DecodeStats) -> bool) -> Result<DecodeSummary> {
        let reason = loop {
            if stop(&self.stats) {
                break StopReason::Requested;
            }
            if let Step::Stopped(reason) = self.step()? {
                break reason;
            }
        };
        info!(
            ?reason,
            dispatched = self.stats.dispatched,
            discarded = self.stats.discarded(),
            bytes = self.stats.bytes_consumed,
            "decode loop stopped"
        );
        Ok(DecodeSummary {
            stop: reason,
            stats: self.stats,
        })
    }

    /// Current loop position.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// Counters so far.
    pub fn stats(&self) -> &DecodeStats {
        &self.stats
    }
}
