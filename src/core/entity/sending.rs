//! Frame emission for the `LinkEntity`.
//!
//! `LinkEntity` 的帧发送逻辑。

use super::{LinkEntity, Output};
use crate::{
    packet::frame::Frame,
    primitive::PhPrimitive,
    rll::{RllMessage, RllPrimitive},
};
use bytes::Bytes;
use tokio::time::Instant;
use tracing::{trace, warn};

impl LinkEntity {
    /// Pads a frame to the block length and queues it for the physical layer.
    ///
    /// 将帧补齐到块长度，并放入发往物理层的输出队列。
    pub(super) fn send_frame(&mut self, frame: Frame) {
        trace!(
            kind = %self.kind,
            sapi = self.config.sapi,
            control = %frame.control,
            len = frame.payload.len(),
            "Sending frame"
        );
        let data = frame.encode_padded(self.config.block_len);
        self.outputs.push_back(Output::Physical(PhPrimitive::data_request(
            self.chan_nr,
            self.link_id(),
            data,
        )));
    }

    /// Queues a message for layer 3.
    pub(super) fn indicate(&mut self, primitive: RllPrimitive) {
        self.outputs.push_back(Output::Layer3(RllMessage::new(
            self.chan_nr,
            self.link_id(),
            primitive,
        )));
    }

    fn command_cr(&self) -> bool {
        self.role.command_cr()
    }

    fn response_cr(&self) -> bool {
        self.role.response_cr()
    }

    pub(super) fn send_sabm(&mut self, payload: Bytes) {
        let frame = Frame::new_sabm(self.config.sapi, self.command_cr(), true, payload);
        self.send_frame(frame);
    }

    pub(super) fn send_disc(&mut self) {
        let frame = Frame::new_disc(self.config.sapi, self.command_cr(), true);
        self.send_frame(frame);
    }

    pub(super) fn send_ua(&mut self, final_bit: bool, payload: Bytes) {
        let frame = Frame::new_ua(self.config.sapi, self.response_cr(), final_bit, payload);
        self.send_frame(frame);
    }

    pub(super) fn send_dm(&mut self, final_bit: bool) {
        let frame = Frame::new_dm(self.config.sapi, self.response_cr(), final_bit);
        self.send_frame(frame);
    }

    pub(super) fn send_ui(&mut self, payload: Bytes) {
        let frame = Frame::new_ui(self.config.sapi, self.command_cr(), payload);
        self.send_frame(frame);
    }

    /// Sends RR as a response carrying the current V(R).
    pub(super) fn send_rr(&mut self, final_bit: bool) {
        let nr = self.reliability.v_r().value();
        let frame = Frame::new_rr(self.config.sapi, self.response_cr(), nr, final_bit);
        self.send_frame(frame);
    }

    /// Sends RR as a command with P = 1, asking a busy peer for its state.
    ///
    /// 以 P = 1 的命令形式发送 RR，询问忙碌对端的状态。
    pub(super) fn send_enquiry(&mut self) {
        let nr = self.reliability.v_r().value();
        let frame = Frame::new_rr(self.config.sapi, self.command_cr(), nr, true);
        self.send_frame(frame);
    }

    /// Sends REJ as a response naming the N(S) we expect.
    pub(super) fn send_rej(&mut self, final_bit: bool) {
        let nr = self.reliability.v_r().value();
        let frame = Frame::new_rej(self.config.sapi, self.response_cr(), nr, final_bit);
        self.send_frame(frame);
    }

    /// Sends as many queued segments as the window and the peer allow. Each
    /// I frame carries the current V(R), so this also acknowledges received
    /// frames.
    ///
    /// Returns the number of I frames sent.
    ///
    /// 在窗口和对端允许的范围内发送尽可能多的排队分段。每个 I 帧都携带当前的
    /// V(R)，因此同时确认了已接收的帧。返回发送的 I 帧数量。
    pub(super) fn push_i_frames(&mut self, now: Instant) -> usize {
        let mut sent = 0;
        while !self.peer_busy {
            let Some((ns, segment)) = self.reliability.next_to_send() else {
                break;
            };
            let frame = Frame::new_i(
                self.config.sapi,
                self.command_cr(),
                ns.value(),
                self.reliability.v_r().value(),
                false,
                segment.more,
                segment.data,
            );
            self.send_frame(frame);
            if !self.reliability.timer().is_running() {
                self.reliability.timer_mut().start(now);
            }
            sent += 1;
        }
        sent
    }

    /// Resends every unacknowledged I frame, oldest first, after a REJ.
    ///
    /// 收到 REJ 后，按从旧到新的顺序重发所有未确认的 I 帧。
    pub(super) fn retransmit_outstanding(&mut self, now: Instant) {
        let nr = self.reliability.v_r().value();
        let frames: Vec<Frame> = self
            .reliability
            .outstanding()
            .map(|in_flight| {
                Frame::new_i(
                    self.config.sapi,
                    self.role.command_cr(),
                    in_flight.ns.value(),
                    nr,
                    false,
                    in_flight.segment.more,
                    in_flight.segment.data.clone(),
                )
            })
            .collect();
        if frames.is_empty() {
            return;
        }
        trace!(kind = %self.kind, count = frames.len(), "Retransmitting after REJ");
        for frame in frames {
            self.send_frame(frame);
        }
        // The retry count carries over; only acknowledgements reset it.
        self.reliability.timer_mut().restart(now);
    }

    /// Resends the oldest unacknowledged I frame with the P bit set, asking
    /// the peer for its receive state.
    ///
    /// 重发最早的未确认 I 帧并置位 P 位，要求对端报告其接收状态。
    pub(super) fn retransmit_oldest(&mut self) {
        let Some(oldest) = self.reliability.oldest_outstanding() else {
            warn!(kind = %self.kind, "T200 expired without outstanding I frames");
            return;
        };
        let frame = Frame::new_i(
            self.config.sapi,
            self.role.command_cr(),
            oldest.ns.value(),
            self.reliability.v_r().value(),
            true,
            oldest.segment.more,
            oldest.segment.data.clone(),
        );
        self.send_frame(frame);
    }
}
