//! Send window: segments in flight, ordered by sequence number.

use std::collections::VecDeque;
use std::time::Instant;

use crate::core::{TahoeError, TahoeResult};

/// One unacknowledged segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Byte offset of the first payload byte.
    pub seq: u32,
    /// Payload length in bytes.
    pub len: u32,
    /// When the segment was first sent.
    pub sent_at: Instant,
}

impl Segment {
    /// Acknowledgment number that covers exactly this segment.
    ///
    /// Saturates at `u32::MAX`; [`SendWindow::push`] rejects segments whose
    /// end does not fit.
    pub fn end_seq(&self) -> u32 {
        self.seq.saturating_add(self.len)
    }
}

/// Ordered buffer of in-flight segments.
///
/// Sequence numbers are strictly increasing from front to back. The front is
/// the oldest unacknowledged segment and the only retransmission target.
#[derive(Debug, Clone, Default)]
pub struct SendWindow {
    segments: VecDeque<Segment>,
    bytes_in_flight: u64,
}

impl SendWindow {
    /// Create an empty window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a segment at the back.
    ///
    /// Fails if `segment.seq` does not come after the current tail, or if the
    /// segment runs past the end of the sequence space.
    pub fn push(&mut self, segment: Segment) -> TahoeResult<()> {
        if segment.seq.checked_add(segment.len).is_none() {
            return Err(TahoeError::SequenceSpaceExhausted);
        }
        if let Some(last) = self.segments.back()
            && segment.seq <= last.seq
        {
            return Err(TahoeError::OutOfOrderSegment {
                seq: segment.seq,
                last: last.seq,
            });
        }
        self.bytes_in_flight += u64::from(segment.len);
        self.segments.push_back(segment);
        Ok(())
    }

    /// Oldest unacknowledged segment.
    pub fn front(&self) -> Option<&Segment> {
        self.segments.front()
    }

    /// Remove every segment with `seq < ack`, oldest first.
    pub fn drain_acked(&mut self, ack: u32) -> Vec<Segment> {
        let count = self.segments.iter().take_while(|s| s.seq < ack).count();
        let acked: Vec<Segment> = self.segments.drain(..count).collect();
        for segment in &acked {
            self.bytes_in_flight -= u64::from(segment.len);
        }
        acked
    }

    /// Number of segments in flight.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if nothing is in flight.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Payload bytes in flight.
    pub fn bytes_in_flight(&self) -> u64 {
        self.bytes_in_flight
    }

    /// Iterate over segments, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }
}
