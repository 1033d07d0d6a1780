//! Inbound frame handling and T200 expiry for the `LinkEntity`.
//!
//! `LinkEntity` 的入站帧处理与 T200 超时处理。

use super::{LinkEntity, state::LinkState};
use crate::{
    core::reliability::retransmission::Expiry,
    error::{Error, Result},
    packet::{
        control::{Control, FrameType},
        frame::Frame,
    },
    rll::{RllPrimitive, RlmCause},
};
use bytes::Bytes;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

impl LinkEntity {
    /// Dispatches a decoded frame from the peer.
    ///
    /// 分发一个从对端收到并已解码的帧。
    pub(super) fn handle_frame(&mut self, frame: Frame, now: Instant) -> Result<()> {
        let command = self.role.is_peer_command(frame.address.cr);
        if !self.is_acceptable(&frame, command) {
            debug!(
                kind = %self.kind,
                state = %self.state,
                control = %frame.control,
                command,
                len = frame.payload.len(),
                more = frame.more,
                "Discarding unexpected frame"
            );
            return Ok(());
        }
        trace!(
            kind = %self.kind,
            state = %self.state,
            control = %frame.control,
            "Received frame"
        );

        if let Control::Ui { .. } = frame.control {
            self.indicate(RllPrimitive::UnitDataIndication(frame.payload));
            return Ok(());
        }

        match self.state {
            LinkState::Idle => self.handle_frame_idle(frame, command),
            LinkState::EstablishPending => self.handle_frame_establish_pending(frame, now),
            LinkState::Established => self.handle_frame_established(frame, command, now),
            LinkState::DisconnectPending => self.handle_frame_disconnect_pending(frame),
        }
    }

    /// Checks the frame-type independent rules: C/R polarity, payload only on
    /// frames that carry information, the M bit only on I frames, and a
    /// payload no longer than N201.
    ///
    /// 检查与帧类型无关的规则：C/R 极性、只有信息类帧可以携带载荷、
    /// 只有 I 帧可以置 M 位，以及载荷长度不超过 N201。
    fn is_acceptable(&self, frame: &Frame, command: bool) -> bool {
        let polarity_ok = match frame.frame_type() {
            FrameType::I | FrameType::Sabm | FrameType::Disc | FrameType::Ui => command,
            FrameType::Ua | FrameType::Dm => !command,
            FrameType::Rr | FrameType::Rnr | FrameType::Rej => true,
        };
        let payload_ok =
            frame.payload.is_empty() || frame.control.carries_information();
        let more_ok = !frame.more || frame.frame_type() == FrameType::I;
        polarity_ok && payload_ok && more_ok && frame.payload.len() <= self.config.n201
    }

    fn handle_frame_idle(&mut self, frame: Frame, command: bool) -> Result<()> {
        match frame.control {
            Control::Sabm { pf } => self.accept_establishment(pf, frame.payload),
            Control::Disc { pf } | Control::I { pf, .. } => self.send_dm(pf),
            Control::Rr { pf: true, .. }
            | Control::Rnr { pf: true, .. }
            | Control::Rej { pf: true, .. }
                if command =>
            {
                self.send_dm(true)
            }
            _ => trace!(kind = %self.kind, control = %frame.control, "Ignored while idle"),
        }
        Ok(())
    }

    fn handle_frame_establish_pending(&mut self, frame: Frame, now: Instant) -> Result<()> {
        match frame.control {
            Control::Ua { .. } => {
                if !frame.payload.is_empty() && frame.payload != self.establish_payload {
                    warn!(
                        kind = %self.kind,
                        "UA payload does not match our SABM, contention lost"
                    );
                    self.enter_idle();
                    self.indicate(RllPrimitive::ReleaseIndication);
                    return Ok(());
                }
                self.reliability.timer_mut().stop();
                self.transition(LinkState::Established);
                self.indicate(RllPrimitive::EstablishConfirm(frame.payload));
                self.push_i_frames(now);
            }
            Control::Dm { .. } => {
                self.enter_idle();
                self.indicate(RllPrimitive::ReleaseIndication);
            }
            Control::Sabm { pf } => {
                // Both sides asked at once; answering completes our own attempt.
                self.send_ua(pf, frame.payload.clone());
                self.peer_establish_payload = frame.payload;
                self.reliability.timer_mut().stop();
                self.transition(LinkState::Established);
                self.indicate(RllPrimitive::EstablishConfirm(self.establish_payload.clone()));
                self.push_i_frames(now);
            }
            Control::Disc { pf } => self.send_dm(pf),
            _ => trace!(kind = %self.kind, control = %frame.control, "Ignored while establishing"),
        }
        Ok(())
    }

    fn handle_frame_established(&mut self, frame: Frame, command: bool, now: Instant) -> Result<()> {
        match frame.control {
            Control::Sabm { pf } => {
                if !frame.payload.is_empty() && frame.payload == self.peer_establish_payload {
                    debug!(kind = %self.kind, "Repeated SABM, resending UA");
                    self.send_ua(pf, frame.payload);
                } else {
                    self.accept_establishment(pf, frame.payload);
                }
                Ok(())
            }
            Control::I { ns, nr, pf } => {
                self.handle_i_frame(ns, nr, pf, frame.more, frame.payload, now)
            }
            Control::Rr { nr, pf } | Control::Rnr { nr, pf } | Control::Rej { nr, pf } => {
                self.handle_supervisory(frame.control, nr, pf, command, now)
            }
            Control::Disc { pf } => {
                self.send_ua(pf, Bytes::new());
                self.enter_idle();
                self.indicate(RllPrimitive::ReleaseIndication);
                Ok(())
            }
            Control::Dm { .. } => {
                warn!(kind = %self.kind, "Unsolicited DM on established link");
                self.enter_idle();
                self.indicate(RllPrimitive::ErrorIndication(
                    RlmCause::UnsolicitedDmEstablished,
                ));
                Ok(())
            }
            _ => {
                trace!(kind = %self.kind, control = %frame.control, "Ignored while established");
                Ok(())
            }
        }
    }

    fn handle_frame_disconnect_pending(&mut self, frame: Frame) -> Result<()> {
        match frame.control {
            Control::Ua { .. } | Control::Dm { .. } => {
                self.enter_idle();
                self.indicate(RllPrimitive::ReleaseConfirm);
            }
            Control::Sabm { pf } => self.send_dm(pf),
            Control::Disc { pf } => self.send_ua(pf, Bytes::new()),
            _ => trace!(kind = %self.kind, control = %frame.control, "Ignored while releasing"),
        }
        Ok(())
    }

    /// Accepts a SABM from the peer: answers with UA echoing the payload,
    /// resets sequencing and reports the new link upward.
    ///
    /// 接受对端的 SABM：以回显载荷的 UA 应答，重置序列并向上报告新链路。
    fn accept_establishment(&mut self, pf: bool, payload: Bytes) {
        if self.reliability.is_reassembling() {
            debug!(kind = %self.kind, "Re-establishment discards a partial message");
        }
        self.reliability.reset();
        self.peer_busy = false;
        self.send_ua(pf, payload.clone());
        self.peer_establish_payload = payload.clone();
        self.transition(LinkState::Established);
        self.indicate(RllPrimitive::EstablishIndication(payload));
    }

    fn handle_i_frame(
        &mut self,
        ns: u8,
        nr: u8,
        poll: bool,
        more: bool,
        payload: Bytes,
        now: Instant,
    ) -> Result<()> {
        if !self.reliability.is_in_sequence(ns) {
            let expected = self.reliability.v_r().value();
            debug!(kind = %self.kind, expected, received = ns, "Out of sequence I frame");
            self.send_rej(poll);
            return Err(Error::Sequence {
                expected,
                received: ns,
            });
        }

        let released = self.reliability.acknowledge(nr)?;
        self.after_acknowledgement(released, now);

        let reassembled = self.reliability.receive(&payload, more);

        if poll {
            self.send_rr(true);
            self.push_i_frames(now);
        } else if self.push_i_frames(now) == 0 {
            self.send_rr(false);
        }

        match reassembled {
            Ok(Some(message)) => {
                self.indicate(RllPrimitive::DataIndication(message));
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "Dropping badly segmented message");
                Err(e)
            }
        }
    }

    fn handle_supervisory(
        &mut self,
        control: Control,
        nr: u8,
        pf: bool,
        command: bool,
        now: Instant,
    ) -> Result<()> {
        let released = self.reliability.acknowledge(nr)?;
        let was_busy = self.peer_busy;
        self.peer_busy = matches!(control, Control::Rnr { .. });

        if let Control::Rej { .. } = control {
            self.retransmit_outstanding(now);
        }
        self.after_acknowledgement(released, now);

        if self.peer_busy {
            // T200 keeps running while the peer is busy so that a lost RR
            // cannot stall the link. A final RNR answers our enquiry.
            let answered = pf && !command;
            if answered || !self.reliability.timer().is_running() {
                self.reliability.timer_mut().start(now);
            }
        } else if was_busy && !self.reliability.has_outstanding() {
            self.reliability.timer_mut().stop();
        }

        if pf && command {
            self.send_rr(true);
        }
        self.push_i_frames(now);
        Ok(())
    }

    /// Stops or restarts T200 once frames have been acknowledged.
    fn after_acknowledgement(&mut self, released: usize, now: Instant) {
        if released == 0 {
            return;
        }
        if self.reliability.has_outstanding() {
            self.reliability.timer_mut().start(now);
        } else {
            self.reliability.timer_mut().stop();
        }
    }

    /// Handles one T200 expiry in the current state.
    ///
    /// 在当前状态下处理一次 T200 超时。
    pub(super) fn on_t200_expired(&mut self, now: Instant) {
        match self.state {
            LinkState::EstablishPending => {
                match self
                    .reliability
                    .timer_mut()
                    .on_expiry(now, self.config.n200_establish)
                {
                    Expiry::Retry(retry) => {
                        debug!(kind = %self.kind, retry, "T200 expired, resending SABM");
                        self.send_sabm(self.establish_payload.clone());
                    }
                    Expiry::Exhausted => self.link_failure(),
                }
            }
            LinkState::Established => {
                let outstanding = self.reliability.has_outstanding();
                if !outstanding && !self.peer_busy {
                    self.reliability.timer_mut().stop();
                    return;
                }
                match self.reliability.timer_mut().on_expiry(now, self.config.n200) {
                    Expiry::Retry(retry) if outstanding => {
                        debug!(kind = %self.kind, retry, "T200 expired, polling with oldest I frame");
                        self.retransmit_oldest();
                    }
                    Expiry::Retry(retry) => {
                        debug!(kind = %self.kind, retry, "T200 expired, peer busy, sending enquiry");
                        self.send_enquiry();
                    }
                    Expiry::Exhausted => self.link_failure(),
                }
            }
            LinkState::DisconnectPending => {
                match self
                    .reliability
                    .timer_mut()
                    .on_expiry(now, self.config.n200_establish)
                {
                    Expiry::Retry(retry) => {
                        debug!(kind = %self.kind, retry, "T200 expired, resending DISC");
                        self.send_disc();
                    }
                    Expiry::Exhausted => {
                        debug!(kind = %self.kind, "No answer to DISC, releasing locally");
                        self.enter_idle();
                        self.indicate(RllPrimitive::ReleaseConfirm);
                    }
                }
            }
            LinkState::Idle => self.reliability.timer_mut().stop(),
        }
    }

    fn link_failure(&mut self) {
        warn!(
            kind = %self.kind,
            sapi = self.config.sapi,
            state = %self.state,
            "N200 retries exhausted, link failed"
        );
        self.enter_idle();
        self.indicate(RllPrimitive::ErrorIndication(RlmCause::T200Expired));
    }
}
