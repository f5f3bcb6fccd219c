use std::collections::VecDeque;

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::error::Result;
use crate::traits::{ByteSource, ReadStatus};

/// In-memory byte source simulating a serial line.
///
/// Bytes are delivered in order from an owned buffer. Delivery can be shaped
/// to look like a real link: at most `max_chunk` bytes per read, and a queue
/// of idle polls that are reported before the next delivery.
#[derive(Debug, Clone)]
pub struct MemorySource {
    data: Bytes,
    max_chunk: usize,
    gaps: VecDeque<Gap>,
    delivered: usize,
    close_when_drained: bool,
}

/// A scripted starvation period: `polls` idle reads once `at` bytes have
/// been delivered.
#[derive(Debug, Clone, Copy)]
struct Gap {
    at: usize,
    polls: usize,
}

impl MemorySource {
    /// Create a source that delivers `data` and then reports `Closed`.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            max_chunk: usize::MAX,
            gaps: VecDeque::new(),
            delivered: 0,
            close_when_drained: true,
        }
    }

    /// Limit each read to at most `max_chunk` bytes (minimum 1).
    pub fn with_max_chunk(mut self, max_chunk: usize) -> Self {
        self.max_chunk = max_chunk.max(1);
        self
    }

    /// Report `polls` idle reads once `at` bytes have been delivered.
    ///
    /// Gaps must be added in increasing `at` order.
    pub fn with_idle_gap(mut self, at: usize, polls: usize) -> Self {
        self.gaps.push_back(Gap { at, polls });
        self
    }

    /// Report `Idle` instead of `Closed` once all bytes are delivered.
    ///
    /// Models a live line that simply stops talking.
    pub fn idle_when_drained(mut self) -> Self {
        self.close_when_drained = false;
        self
    }

    /// Number of bytes delivered so far.
    pub fn position(&self) -> usize {
        self.delivered
    }

    /// Number of bytes not yet delivered.
    pub fn remaining(&self) -> usize {
        self.data.remaining()
    }
}

impl ByteSource for MemorySource {
    fn read(&mut self, buf: &mut [u8]) -> Result<ReadStatus> {
        if let Some(gap) = self.gaps.front_mut() {
            if gap.at <= self.delivered {
                if gap.polls == 0 {
                    self.gaps.pop_front();
                } else {
                    gap.polls -= 1;
                    trace!(position = self.delivered, "scripted idle poll");
                    return Ok(ReadStatus::Idle);
                }
            }
        }

        if !self.data.has_remaining() {
            return Ok(if self.close_when_drained {
                ReadStatus::Closed
            } else {
                ReadStatus::Idle
            });
        }
        if buf.is_empty() {
            return Ok(ReadStatus::Idle);
        }

        let mut n = buf.len().min(self.max_chunk).min(self.data.remaining());
        if let Some(gap) = self.gaps.front() {
            if gap.at > self.delivered {
                n = n.min(gap.at - self.delivered);
            }
        }

        self.data.copy_to_slice(&mut buf[..n]);
        self.delivered += n;
        Ok(ReadStatus::Data(n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(source: &mut MemorySource, chunk: usize) -> (Vec<u8>, Vec<ReadStatus>) {
        let mut out = Vec::new();
        let mut statuses = Vec::new();
        let mut buf = vec![0u8; chunk];
        loop {
            let status = source.read(&mut buf).unwrap();
            statuses.push(status);
            match status {
                ReadStatus::Data(n) => out.extend_from_slice(&buf[..n]),
                ReadStatus::Idle => {}
                ReadStatus::Closed => return (out, statuses),
            }
        }
    }

    #[test]
    fn delivers_all_bytes_then_closes() {
        let mut source = MemorySource::new(vec![1, 2, 3, 4]);
        let (out, statuses) = drain(&mut source, 16);
        assert_eq!(out, vec![1, 2, 3, 4]);
        assert_eq!(statuses, vec![ReadStatus::Data(4), ReadStatus::Closed]);
        assert_eq!(source.position(), 4);
        assert_eq!(source.remaining(), 0);
    }

    #[test]
    fn respects_max_chunk() {
        let mut source = MemorySource::new(vec![9; 5]).with_max_chunk(2);
        let (out, statuses) = drain(&mut source, 16);
        assert_eq!(out.len(), 5);
        assert_eq!(
            statuses,
            vec![
                ReadStatus::Data(2),
                ReadStatus::Data(2),
                ReadStatus::Data(1),
                ReadStatus::Closed
            ]
        );
    }

    #[test]
    fn scripted_gap_reports_idle_at_position() {
        let mut source = MemorySource::new(vec![1, 2, 3, 4]).with_idle_gap(2, 2);
        let (out, statuses) = drain(&mut source, 16);
        assert_eq!(out, vec![1, 2, 3, 4]);
        assert_eq!(
            statuses,
            vec![
                ReadStatus::Data(2),
                ReadStatus::Idle,
                ReadStatus::Idle,
                ReadStatus::Data(2),
                ReadStatus::Closed
            ]
        );
    }

    #[test]
    fn idle_when_drained_never_closes() {
        let mut source = MemorySource::new(vec![7]).idle_when_drained();
        let mut buf = [0u8; 4];
        assert_eq!(source.read(&mut buf).unwrap(), ReadStatus::Data(1));
        assert_eq!(source.read(&mut buf).unwrap(), ReadStatus::Idle);
        assert_eq!(source.read(&mut buf).unwrap(), ReadStatus::Idle);
    }

    #[test]
    fn empty_source_closes_immediately() {
        let mut source = MemorySource::new(Vec::new());
        let mut buf = [0u8; 1];
        assert_eq!(source.read(&mut buf).unwrap(), ReadStatus::Closed);
    }
}
