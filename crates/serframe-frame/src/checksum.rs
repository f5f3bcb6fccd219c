//! Slot-aligned XOR checksum.
//!
//! Column `i` of the checksum is the XOR of every byte at a position `j`
//! with `j % 5 == i`. Column 4 would be the separator column and is skipped.

use crate::codec::{CHECKSUM_SIZE, PAYLOAD_UNIT_SIZE};

/// A 4-byte checksum, one byte per data column.
pub type Checksum = [u8; CHECKSUM_SIZE];

/// Compute the checksum over the first `len` bytes of `data`.
///
/// `len` is clamped to `data.len()`. For a full frame, pass
/// `frame.len() - PAYLOAD_UNIT_SIZE` so the checksum slot itself is excluded.
pub fn compute_checksum(data: &[u8], len: usize) -> Checksum {
    let mut checksum = [0u8; CHECKSUM_SIZE];
    for (j, byte) in data.iter().take(len).enumerate() {
        let column = j % PAYLOAD_UNIT_SIZE;
        if column < CHECKSUM_SIZE {
            checksum[column] ^= byte;
        }
    }
    checksum
}

/// Checksum a complete frame should carry in its final slot.
///
/// Returns `None` when the frame is too short to have a checksum slot.
pub fn expected_checksum(frame: &[u8]) -> Option<Checksum> {
    let data_len = frame.len().checked_sub(PAYLOAD_UNIT_SIZE)?;
    Some(compute_checksum(frame, data_len))
}

/// Checksum carried in the final slot of a complete frame.
pub fn received_checksum(frame: &[u8]) -> Option<Checksum> {
    let start = frame.len().checked_sub(PAYLOAD_UNIT_SIZE)?;
    let mut checksum = [0u8; CHECKSUM_SIZE];
    checksum.copy_from_slice(&frame[start..start + CHECKSUM_SIZE]);
    Some(checksum)
}
