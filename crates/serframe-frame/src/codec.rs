use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::{compute_checksum, expected_checksum, received_checksum, Checksum};
use crate::error::{FrameError, Result};

/// Start-of-frame marker.
pub const START_BYTE: u8 = 0xFF;

/// Terminator of every payload slot.
pub const SEPARATOR_BYTE: u8 = 0xFE;

/// Consecutive start markers required to synchronize.
pub const MIN_START_BYTES: usize = 5;

/// Maximum total frame size, start markers included.
pub const MAX_MESSAGE_SIZE: usize = 100;

/// Slot width: 4 data bytes + 1 separator.
pub const PAYLOAD_UNIT_SIZE: usize = 5;

/// Checksum width, occupying the data positions of the final slot.
pub const CHECKSUM_SIZE: usize = 4;

/// Largest frame (identifier through last separator) that fits the budget.
pub const MAX_FRAME_LEN: usize = MAX_MESSAGE_SIZE - MIN_START_BYTES;

/// Bytes requested from the source per read.
pub(crate) const BYTES_TO_READ: usize = 1;

/// Validation result for a fully read frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Ok,
    BadChecksum,
    BadSeparators,
}

/// A validated frame, identifier byte first.
///
/// Wire layout after the start marker run:
/// ```text
/// ┌──────┬──────────┬──────┬─────┬──────────────┬──────┐
/// │ ID   │ data (3) │ 0xFE │ ... │ checksum (4) │ 0xFE │
/// └──────┴──────────┴──────┴─────┴──────────────┴──────┘
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Validate `bytes` as a complete frame (no start markers).
    pub fn parse(bytes: impl Into<Bytes>) -> Result<Self> {
        let bytes = bytes.into();
        check_packet(&bytes)?;
        Ok(Self { bytes })
    }

    pub(crate) fn from_validated(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// The message identifier (first byte).
    pub fn id(&self) -> u8 {
        self.bytes[0]
    }

    /// Total frame length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Frames always hold at least the checksum slot.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw frame bytes, identifier through final separator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Data bytes with separators and the checksum slot removed.
    pub fn data(&self) -> Vec<u8> {
        self.bytes[..self.bytes.len() - PAYLOAD_UNIT_SIZE]
            .chunks(PAYLOAD_UNIT_SIZE)
            .flat_map(|slot| &slot[..CHECKSUM_SIZE.min(slot.len())])
            .copied()
            .collect()
    }

    /// The transmitted checksum.
    pub fn checksum(&self) -> Checksum {
        received_checksum(&self.bytes).unwrap_or_default()
    }

    /// The total wire size of this frame (start markers + frame).
    pub fn wire_size(&self) -> usize {
        MIN_START_BYTES + self.bytes.len()
    }

    /// Consume the frame and return its bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

/// Classify a fully read frame.
///
/// The checksum is compared first; separators are only inspected when it
/// matches. A frame shorter than one slot has no checksum slot and is
/// reported as `BadChecksum`.
pub fn validate_packet(data: &[u8]) -> Verdict {
    match check_packet(data) {
        Ok(()) => Verdict::Ok,
        Err(FrameError::BadSeparators { .. }) => Verdict::BadSeparators,
        Err(_) => Verdict::BadChecksum,
    }
}

/// Like [`validate_packet`], but with diagnostics in the error.
pub(crate) fn check_packet(data: &[u8]) -> Result<()> {
    let id = data.first().copied().unwrap_or_default();
    let (Some(computed), Some(received)) = (expected_checksum(data), received_checksum(data))
    else {
        return Err(FrameError::BadChecksum {
            id,
            computed: compute_checksum(data, data.len()),
            received: Checksum::default(),
        });
    };
    if computed != received {
        return Err(FrameError::BadChecksum {
            id,
            computed,
            received,
        });
    }

    for (slot, chunk) in data.chunks_exact(PAYLOAD_UNIT_SIZE).enumerate() {
        let found = chunk[PAYLOAD_UNIT_SIZE - 1];
        if found != SEPARATOR_BYTE {
            return Err(FrameError::BadSeparators { id, slot, found });
        }
    }
    Ok(())
}

/// Frame length produced by [`encode_frame`] for a body of `body_len` bytes.
pub fn frame_len_for_body(body_len: usize) -> usize {
    body_len / CHECKSUM_SIZE * PAYLOAD_UNIT_SIZE + PAYLOAD_UNIT_SIZE
}

/// Encode a frame into the wire format.
///
/// `body` holds the data bytes, identifier first, without separators. Its
/// length must be a non-zero multiple of 4. The start marker run, slot
/// separators and checksum slot are added here.
pub fn encode_frame(body: &[u8], dst: &mut BytesMut) -> Result<()> {
    if body.is_empty() {
        return Err(FrameError::InvalidBody {
            len: 0,
            reason: "body must contain the identifier",
        });
    }
    if body.len() % CHECKSUM_SIZE != 0 {
        return Err(FrameError::InvalidBody {
            len: body.len(),
            reason: "body length must be a multiple of 4",
        });
    }
    let frame_len = frame_len_for_body(body.len());
    if frame_len > MAX_FRAME_LEN {
        return Err(FrameError::InvalidBody {
            len: body.len(),
            reason: "frame exceeds the 100 byte budget",
        });
    }

    dst.reserve(MIN_START_BYTES + frame_len);
    dst.put_bytes(START_BYTE, MIN_START_BYTES);
    let frame_start = dst.len();
    for slot in body.chunks(CHECKSUM_SIZE) {
        dst.put_slice(slot);
        dst.put_u8(SEPARATOR_BYTE);
    }
    let checksum = compute_checksum(&dst[frame_start..], dst.len() - frame_start);
    dst.put_slice(&checksum);
    dst.put_u8(SEPARATOR_BYTE);
    Ok(())
}

/// What the decoder does when the source has no bytes right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePolicy {
    /// Poll again after `poll_interval`; give up after `timeout` of silence.
    Wait {
        poll_interval: Duration,
        timeout: Option<Duration>,
    },
    /// Treat an empty read as the end of the stream.
    TreatAsEnd,
}

impl Default for IdlePolicy {
    fn default() -> Self {
        IdlePolicy::Wait {
            poll_interval: Duration::from_millis(10),
            timeout: None,
        }
    }
}

/// Configuration for the frame reader and decode loop.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Starvation handling. Default: poll every 10 ms, wait forever.
    pub idle: IdlePolicy,
    /// Stop after this many synchronize/read iterations. Default: unbounded.
    pub max_iterations: Option<u64>,
    /// Stop signal checked before every byte pull, including idle polls.
    /// Setting it to `true` ends the loop with `StopReason::Requested`.
    pub cancel: Option<Arc<AtomicBool>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: [u8; 15] = [
        0x0F, 0x01, 0x02, 0x03, 0xFE, 0x01, 0x02, 0x03, 0x04, 0xFE, 0x0E, 0x03, 0x01, 0x07, 0xFE,
    ];

    #[test]
    fn sample_frame_is_valid() {
        assert_eq!(validate_packet(&SAMPLE), Verdict::Ok);
    }

    #[test]
    fn wrong_checksum_column() {
        let mut frame = SAMPLE;
        frame[13] = 0x08;
        assert_eq!(validate_packet(&frame), Verdict::BadChecksum);
        assert!(matches!(
            check_packet(&frame),
            Err(FrameError::BadChecksum {
                id: 0x0F,
                computed: [0x0E, 0x03, 0x01, 0x07],
                received: [0x0E, 0x03, 0x01, 0x08],
            })
        ));
    }

    #[test]
    fn bad_separator_reported_with_slot() {
        let mut frame = SAMPLE;
        frame[9] = 0x00;
        assert_eq!(validate_packet(&frame), Verdict::BadSeparators);
        assert!(matches!(
            check_packet(&frame),
            Err(FrameError::BadSeparators {
                slot: 1,
                found: 0x00,
                ..
            })
        ));
    }

    #[test]
    fn checksum_failure_takes_precedence() {
        let mut frame = SAMPLE;
        frame[4] = 0x00;
        frame[1] = 0x55;
        assert_eq!(validate_packet(&frame), Verdict::BadChecksum);
    }

    #[test]
    fn final_separator_is_checked() {
        let mut frame = SAMPLE;
        frame[14] = 0x00;
        assert!(matches!(
            check_packet(&frame),
            Err(FrameError::BadSeparators { slot: 2, .. })
        ));
    }

    #[test]
    fn short_frame_is_bad_checksum() {
        assert_eq!(validate_packet(&[]), Verdict::BadChecksum);
        assert_eq!(validate_packet(&[0x03, 0x00, 0x00]), Verdict::BadChecksum);
    }

    #[test]
    fn single_slot_frame() {
        // Only the checksum slot: computed over nothing, so all zero.
        assert_eq!(validate_packet(&[0, 0, 0, 0, 0xFE]), Verdict::Ok);
        assert_eq!(validate_packet(&[5, 0, 0, 0, 0xFE]), Verdict::BadChecksum);
    }

    #[test]
    fn encode_matches_sample() {
        let mut buf = BytesMut::new();
        encode_frame(&[0x0F, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04], &mut buf).unwrap();

        assert_eq!(&buf[..MIN_START_BYTES], &[START_BYTE; MIN_START_BYTES]);
        assert_eq!(&buf[MIN_START_BYTES..], &SAMPLE);
    }

    #[test]
    fn encode_rejects_bad_bodies() {
        let mut buf = BytesMut::new();
        assert!(matches!(
            encode_frame(&[], &mut buf),
            Err(FrameError::InvalidBody { len: 0, .. })
        ));
        assert!(matches!(
            encode_frame(&[1, 2, 3], &mut buf),
            Err(FrameError::InvalidBody { len: 3, .. })
        ));
        // 72 body bytes -> 95 byte frame fits; 76 -> 100 does not.
        assert!(encode_frame(&[0x5F; 72], &mut buf).is_ok());
        assert!(matches!(
            encode_frame(&[0x64; 76], &mut buf),
            Err(FrameError::InvalidBody { len: 76, .. })
        ));
    }

    #[test]
    fn frame_accessors() {
        let frame = Frame::parse(SAMPLE.to_vec()).unwrap();
        assert_eq!(frame.id(), 0x0F);
        assert_eq!(frame.len(), 15);
        assert_eq!(frame.wire_size(), 20);
        assert_eq!(frame.checksum(), [0x0E, 0x03, 0x01, 0x07]);
        assert_eq!(
            frame.data(),
            vec![0x0F, 0x01, 0x02, 0x03, 0x01, 0x02, 0x03, 0x04]
        );
        assert_eq!(frame.as_bytes(), &SAMPLE);
    }

    #[test]
    fn parse_rejects_invalid() {
        let mut bytes = SAMPLE;
        bytes[2] ^= 0x01;
        assert!(matches!(
            Frame::parse(bytes.to_vec()),
            Err(FrameError::BadChecksum { .. })
        ));
    }

    #[test]
    fn validation_is_idempotent() {
        let mut frame = SAMPLE;
        frame[9] = 0x01;
        let first = validate_packet(&frame);
        for _ in 0..8 {
            assert_eq!(validate_packet(&frame), first);
        }
    }
}
