//! Manages the sending side of acknowledged transfer: segments waiting for
//! window space and I frames sent but not yet acknowledged.
//!
//! 管理确认传输的发送端：等待窗口空间的分段，以及已发送但尚未确认的 I 帧。

use super::packetizer::Segment;
use super::sequence::SeqNum;
use std::collections::VecDeque;

/// An I frame that has been sent but not yet acknowledged (in-flight).
///
/// 已发送但尚未确认（在途）的 I 帧。
#[derive(Debug, Clone)]
pub struct InFlightSegment {
    pub ns: SeqNum,
    pub segment: Segment,
}

/// Manages outgoing segments.
#[derive(Debug, Default)]
pub struct SendBuffer {
    /// Segments waiting for window space, in transmission order.
    pending: VecDeque<Segment>,
    /// Segments sent and awaiting acknowledgement, oldest first.
    in_flight: VecDeque<InFlightSegment>,
}

impl SendBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the segments of one message to the pending queue.
    ///
    /// 将一条消息的分段追加到待发送队列。
    pub fn enqueue(&mut self, segments: Vec<Segment>) {
        self.pending.extend(segments);
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Returns the number of I frames currently in flight.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight_empty(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Moves the next pending segment into flight under sequence number `ns`.
    ///
    /// 将下一个待发送分段以序列号 `ns` 移入在途队列。
    pub fn take_next(&mut self, ns: SeqNum) -> Option<Segment> {
        let segment = self.pending.pop_front()?;
        self.in_flight.push_back(InFlightSegment {
            ns,
            segment: segment.clone(),
        });
        Some(segment)
    }

    /// Releases the `count` oldest in-flight segments after an acknowledgement.
    ///
    /// 确认后释放最早的 `count` 个在途分段。
    pub fn release(&mut self, count: usize) -> usize {
        let count = count.min(self.in_flight.len());
        self.in_flight.drain(..count);
        count
    }

    /// The oldest unacknowledged segment.
    pub fn oldest_in_flight(&self) -> Option<&InFlightSegment> {
        self.in_flight.front()
    }

    /// All unacknowledged segments, oldest first.
    pub fn in_flight(&self) -> impl Iterator<Item = &InFlightSegment> {
        self.in_flight.iter()
    }

    /// Drops everything, pending and in flight.
    ///
    /// 丢弃所有内容，包括待发送和在途的分段。
    pub fn clear(&mut self) {
        self.pending.clear();
        self.in_flight.clear();
    }
}
