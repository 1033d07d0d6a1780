//! The reliability layer.
//!
//! This layer owns the acknowledged-mode bookkeeping of one link entity: the
//! state variables V(S), V(A) and V(R), the send window, reassembly of
//! inbound segments and the T200 timer. It knows nothing about frame types;
//! the entity drives it.
//!
//! 可靠性层。
//!
//! 该层负责单个链路实体的确认模式记账：状态变量 V(S)、V(A) 和 V(R)、
//! 发送窗口、入站分段的重组以及 T200 定时器。它不了解帧类型，由实体驱动。

pub mod packetizer;
pub mod recv_buffer;
pub mod retransmission;
pub mod send_buffer;
pub mod sequence;

use self::{
    packetizer::{Segment, segment},
    recv_buffer::ReceiveBuffer,
    retransmission::RetransmissionTimer,
    send_buffer::{InFlightSegment, SendBuffer},
    sequence::SeqNum,
};
use crate::{
    config::LinkConfig,
    error::{Error, Result},
};
use bytes::Bytes;
use tracing::trace;

/// The acknowledged-mode state of one link entity.
///
/// 单个链路实体的确认模式状态。
#[derive(Debug)]
pub struct ReliabilityLayer {
    send_buffer: SendBuffer,
    recv_buffer: ReceiveBuffer,
    timer: RetransmissionTimer,
    n201: usize,
    window_size: u8,
    /// V(S): the N(S) of the next new I frame.
    v_s: SeqNum,
    /// V(A): the oldest unacknowledged N(S).
    v_a: SeqNum,
    /// V(R): the N(S) expected from the peer.
    v_r: SeqNum,
}

impl ReliabilityLayer {
    pub fn new(config: &LinkConfig) -> Self {
        Self {
            send_buffer: SendBuffer::new(),
            recv_buffer: ReceiveBuffer::new(config.n201, config.max_message_len),
            timer: RetransmissionTimer::new(config.t200),
            n201: config.n201,
            window_size: config.window_size,
            v_s: SeqNum::default(),
            v_a: SeqNum::default(),
            v_r: SeqNum::default(),
        }
    }

    /// Resets sequencing and drops all queued, in-flight and partially
    /// reassembled data. Used on (re-)establishment and release.
    ///
    /// 重置序列并丢弃所有排队、在途和部分重组的数据。用于（重新）建立和释放。
    pub fn reset(&mut self) {
        self.send_buffer.clear();
        self.recv_buffer.reset();
        self.timer.stop();
        self.v_s = SeqNum::default();
        self.v_a = SeqNum::default();
        self.v_r = SeqNum::default();
    }

    pub fn v_s(&self) -> SeqNum {
        self.v_s
    }

    pub fn v_a(&self) -> SeqNum {
        self.v_a
    }

    pub fn v_r(&self) -> SeqNum {
        self.v_r
    }

    pub fn timer(&self) -> &RetransmissionTimer {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut RetransmissionTimer {
        &mut self.timer
    }

    // --- Sending side ---

    /// Segments a layer-3 message and queues it for acknowledged transfer.
    /// Returns the number of segments queued.
    ///
    /// 将第三层消息分段并排队等待确认传输。返回排队的分段数。
    pub fn queue_message(&mut self, payload: Bytes) -> usize {
        let segments = segment(payload, self.n201);
        let count = segments.len();
        self.send_buffer.enqueue(segments);
        count
    }

    /// Returns `true` if the window has room for another I frame.
    ///
    /// 如果窗口还能容纳一个 I 帧，返回 `true`。
    pub fn window_open(&self) -> bool {
        self.v_a.distance_to(self.v_s) < self.window_size
    }

    /// Number of I frames the window still admits.
    ///
    /// 窗口仍可容纳的 I 帧数量。
    pub fn window_space(&self) -> usize {
        usize::from(self.window_size.saturating_sub(self.v_a.distance_to(self.v_s)))
    }

    /// How many segments a message of `len` octets is split into.
    pub fn segments_for(&self, len: usize) -> usize {
        len.div_ceil(self.n201).max(1)
    }

    pub fn has_pending(&self) -> bool {
        self.send_buffer.has_pending()
    }

    /// Segments queued but not yet sent.
    pub fn pending_count(&self) -> usize {
        self.send_buffer.pending_count()
    }

    pub fn has_outstanding(&self) -> bool {
        !self.send_buffer.is_in_flight_empty()
    }

    pub fn outstanding_count(&self) -> usize {
        self.send_buffer.in_flight_count()
    }

    /// Takes the next queued segment if the window allows, assigning it the
    /// current V(S) and advancing V(S).
    ///
    /// 如果窗口允许，取出下一个排队的分段，为其分配当前 V(S) 并推进 V(S)。
    pub fn next_to_send(&mut self) -> Option<(SeqNum, Segment)> {
        if !self.window_open() {
            return None;
        }
        let ns = self.v_s;
        let segment = self.send_buffer.take_next(ns)?;
        self.v_s = ns.next();
        trace!(ns = ns.value(), more = segment.more, "Segment moved into flight");
        Some((ns, segment))
    }

    pub fn oldest_outstanding(&self) -> Option<&InFlightSegment> {
        self.send_buffer.oldest_in_flight()
    }

    /// Unacknowledged segments, oldest first.
    pub fn outstanding(&self) -> impl Iterator<Item = &InFlightSegment> {
        self.send_buffer.in_flight()
    }

    /// Processes a received N(R). Valid values lie in V(A)..=V(S); the frames
    /// below N(R) are released. Returns how many frames were acknowledged.
    ///
    /// 处理收到的 N(R)。有效值位于 V(A)..=V(S) 之间；N(R) 之前的帧被释放。
    /// 返回被确认的帧数。
    pub fn acknowledge(&mut self, nr: u8) -> Result<usize> {
        let nr = SeqNum::new(nr);
        let acked = self.v_a.distance_to(nr);
        if acked > self.v_a.distance_to(self.v_s) {
            return Err(Error::InvalidNr {
                nr: nr.value(),
                va: self.v_a.value(),
                vs: self.v_s.value(),
            });
        }
        let released = self.send_buffer.release(acked as usize);
        self.v_a = nr;
        if released > 0 {
            trace!(nr = nr.value(), released, "Acknowledged I frames");
        }
        Ok(released)
    }

    // --- Receiving side ---

    /// Returns `true` if `ns` is the N(S) we expect next.
    pub fn is_in_sequence(&self, ns: u8) -> bool {
        SeqNum::new(ns) == self.v_r
    }

    /// Accepts an in-sequence I frame payload: advances V(R) and feeds the
    /// reassembler. Returns the completed message, if any.
    ///
    /// 接收一个按序到达的 I 帧载荷：推进 V(R) 并送入重组器。
    /// 如有完整消息则返回。
    pub fn receive(&mut self, payload: &[u8], more: bool) -> Result<Option<Bytes>> {
        self.v_r = self.v_r.next();
        self.recv_buffer.push(payload, more)
    }

    pub fn is_reassembling(&self) -> bool {
        self.recv_buffer.in_progress()
    }
}
