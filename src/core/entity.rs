//! The data link entity: one LAPDm state machine for one channel kind.
//!
//! The entity is sans-IO. Every call appends what it produced to an ordered
//! output buffer: frames for the physical layer and messages for layer 3.
//! The owning channel drains that buffer after each call and decides how the
//! outputs reach their consumers.
//!
//! 数据链路实体：某一信道类型的 LAPDm 状态机。
//!
//! 实体不执行任何 IO。每次调用都会把产生的内容按顺序追加到输出缓冲区：
//! 发往物理层的帧和发往第三层的消息。所属通道在每次调用后取出这些输出，
//! 并决定它们如何到达消费者。

mod handlers;
mod sending;
pub mod state;

use self::state::LinkState;
use crate::{
    config::LinkConfig,
    core::reliability::ReliabilityLayer,
    error::{Error, Result},
    link::{ChannelKind, LinkId, Role},
    packet::frame::Frame,
    primitive::PhPrimitive,
    rll::{ReleaseMode, RllMessage, RllPrimitive},
};
use bytes::Bytes;
use std::collections::VecDeque;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Something an entity produced for one of its neighbours.
///
/// 实体为相邻层产生的输出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A PH-DATA request for the physical layer.
    /// 发往物理层的 PH-DATA 请求。
    Physical(PhPrimitive),
    /// An indication or confirmation for layer 3.
    /// 发往第三层的指示或确认。
    Layer3(RllMessage),
}

/// One data link entity.
///
/// 一个数据链路实体。
#[derive(Debug)]
pub struct LinkEntity {
    kind: ChannelKind,
    role: Role,
    chan_nr: u8,
    config: LinkConfig,
    state: LinkState,
    reliability: ReliabilityLayer,
    /// Payload of our own SABM, checked against the UA for contention resolution.
    establish_payload: Bytes,
    /// Payload of the last SABM we accepted, used to spot retransmitted SABMs.
    peer_establish_payload: Bytes,
    /// Set while the peer reports RNR.
    peer_busy: bool,
    outputs: VecDeque<Output>,
}

impl LinkEntity {
    pub fn new(kind: ChannelKind, role: Role, chan_nr: u8, config: LinkConfig) -> Self {
        let reliability = ReliabilityLayer::new(&config);
        Self {
            kind,
            role,
            chan_nr,
            config,
            state: LinkState::Idle,
            reliability,
            establish_payload: Bytes::new(),
            peer_establish_payload: Bytes::new(),
            peer_busy: false,
            outputs: VecDeque::new(),
        }
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    /// The link identifier stamped on everything this entity emits.
    ///
    /// 此实体发出的所有内容上携带的链路标识。
    pub fn link_id(&self) -> LinkId {
        LinkId::new(self.kind, self.config.sapi, 0)
    }

    /// Returns `true` while the peer has signalled RNR.
    pub fn is_peer_busy(&self) -> bool {
        self.peer_busy
    }

    /// Number of I frames sent and not yet acknowledged.
    pub fn outstanding_frames(&self) -> usize {
        self.reliability.outstanding_count()
    }

    /// The instant at which [`LinkEntity::on_tick`] will next have work to do.
    ///
    /// [`LinkEntity::on_tick`] 下一次需要处理事件的时间点。
    pub fn next_deadline(&self) -> Option<Instant> {
        self.reliability.timer().deadline()
    }

    /// Takes the next output in production order.
    pub fn pop_output(&mut self) -> Option<Output> {
        self.outputs.pop_front()
    }

    pub fn has_output(&self) -> bool {
        !self.outputs.is_empty()
    }

    /// The number of PH-DATA requests `primitive` would emit if it were
    /// handled now. The channel uses this to refuse requests whose frames
    /// would not fit in a bounded queue.
    ///
    /// 若立即处理 `primitive`，将产生的 PH-DATA 请求数量。通道据此拒绝
    /// 其帧无法放入有界队列的请求。
    pub fn transmit_demand(&self, primitive: &RllPrimitive) -> usize {
        match (primitive, self.state) {
            (RllPrimitive::EstablishRequest(_), LinkState::Idle | LinkState::Established) => 1,
            (RllPrimitive::DataRequest(l3), LinkState::Established) if !self.peer_busy => {
                let queued = self.reliability.pending_count()
                    + self.reliability.segments_for(l3.len());
                queued.min(self.reliability.window_space())
            }
            (RllPrimitive::UnitDataRequest(_), _) => 1,
            (
                RllPrimitive::ReleaseRequest(ReleaseMode::Normal),
                LinkState::Established | LinkState::EstablishPending,
            ) => 1,
            _ => 0,
        }
    }

    /// Handles a request coming down from layer 3.
    ///
    /// 处理来自第三层的请求。
    pub fn handle_request(&mut self, primitive: RllPrimitive, now: Instant) -> Result<()> {
        trace!(
            kind = %self.kind,
            state = %self.state,
            primitive = ?primitive.message_type(),
            "Layer-3 request"
        );
        match primitive {
            RllPrimitive::EstablishRequest(l3) => self.establish_request(l3, now),
            RllPrimitive::DataRequest(l3) => self.data_request(l3, now),
            RllPrimitive::UnitDataRequest(l3) => self.unit_data_request(l3),
            RllPrimitive::ReleaseRequest(mode) => self.release_request(mode, now),
            _ => Err(Error::InvalidMessage("not a request primitive")),
        }
    }

    /// Handles the octets of a PH-DATA indication.
    ///
    /// Malformed frames and frames for another SAPI are rejected with an
    /// error and leave the entity untouched.
    ///
    /// 处理 PH-DATA 指示中的字节。
    ///
    /// 格式错误的帧以及属于其他 SAPI 的帧会被拒绝并返回错误，实体状态不变。
    pub fn handle_frame_bytes(&mut self, data: &[u8], now: Instant) -> Result<()> {
        let frame = Frame::decode(data)?;
        if frame.sapi() != self.config.sapi {
            return Err(Error::UnsupportedSapi(frame.sapi()));
        }
        self.handle_frame(frame, now)
    }

    /// Drives the T200 timer. At most one expiry is handled per call.
    ///
    /// 驱动 T200 定时器。每次调用最多处理一次超时。
    pub fn on_tick(&mut self, now: Instant) {
        if self.reliability.timer().is_expired(now) {
            self.on_t200_expired(now);
        }
    }

    /// Returns the entity to `Idle`, dropping all state, timers and outputs.
    ///
    /// 将实体恢复为 `Idle`，丢弃所有状态、定时器和输出。
    pub fn reset(&mut self) {
        self.reliability.reset();
        self.state = LinkState::Idle;
        self.establish_payload.clear();
        self.peer_establish_payload.clear();
        self.peer_busy = false;
        self.outputs.clear();
    }

    // --- Local requests ---

    fn establish_request(&mut self, l3: Bytes, now: Instant) -> Result<()> {
        if l3.len() > self.config.n201 {
            return Err(Error::MessageTooLarge {
                len: l3.len(),
                max: self.config.n201,
            });
        }
        match self.state {
            LinkState::Idle | LinkState::Established => {
                self.reliability.reset();
                self.peer_busy = false;
                self.establish_payload = l3.clone();
                self.send_sabm(l3);
                self.reliability.timer_mut().start(now);
                self.transition(LinkState::EstablishPending);
                Ok(())
            }
            LinkState::EstablishPending => {
                debug!(kind = %self.kind, "Establishment already pending, request ignored");
                Ok(())
            }
            LinkState::DisconnectPending => Err(Error::InvalidState(self.state.name())),
        }
    }

    fn data_request(&mut self, l3: Bytes, now: Instant) -> Result<()> {
        if l3.len() > self.config.max_message_len {
            return Err(Error::MessageTooLarge {
                len: l3.len(),
                max: self.config.max_message_len,
            });
        }
        match self.state {
            LinkState::Established => {
                let segments = self.reliability.queue_message(l3);
                trace!(kind = %self.kind, segments, "Queued message for acknowledged transfer");
                self.push_i_frames(now);
                Ok(())
            }
            LinkState::EstablishPending => {
                self.reliability.queue_message(l3);
                Ok(())
            }
            LinkState::Idle | LinkState::DisconnectPending => Err(Error::NotEstablished),
        }
    }

    fn unit_data_request(&mut self, l3: Bytes) -> Result<()> {
        if l3.len() > self.config.n201 {
            return Err(Error::MessageTooLarge {
                len: l3.len(),
                max: self.config.n201,
            });
        }
        self.send_ui(l3);
        Ok(())
    }

    fn release_request(&mut self, mode: ReleaseMode, now: Instant) -> Result<()> {
        match (mode, self.state) {
            (ReleaseMode::Local, _) | (_, LinkState::Idle) => {
                self.reliability.reset();
                self.peer_busy = false;
                self.transition(LinkState::Idle);
                self.indicate(RllPrimitive::ReleaseConfirm);
            }
            (ReleaseMode::Normal, LinkState::Established | LinkState::EstablishPending) => {
                self.reliability.reset();
                self.peer_busy = false;
                self.send_disc();
                self.reliability.timer_mut().start(now);
                self.transition(LinkState::DisconnectPending);
            }
            (ReleaseMode::Normal, LinkState::DisconnectPending) => {
                debug!(kind = %self.kind, "Release already pending, request ignored");
            }
        }
        Ok(())
    }

    // --- Helpers shared by the handlers ---

    fn transition(&mut self, next: LinkState) {
        if self.state != next {
            debug!(
                kind = %self.kind,
                sapi = self.config.sapi,
                from = %self.state,
                to = %next,
                "Link state changed"
            );
            self.state = next;
        }
        if !next.uses_timer() {
            self.reliability.timer_mut().stop();
        }
    }

    /// Drops the link after a failure or a release and returns to `Idle`.
    fn enter_idle(&mut self) {
        self.reliability.reset();
        self.peer_busy = false;
        self.transition(LinkState::Idle);
    }
}
