//! The channel: a main and a secondary data link entity under one role.
//!
//! A channel is the unit the neighbouring layers talk to. Layer-3 requests are
//! routed to an entity by the channel kind of their link identifier, inbound
//! PH-DATA indications likewise. Whatever the entity produces is drained
//! right away: frames through the channel's [`delivery`] strategy, messages
//! to the bound layer-3 handler.
//!
//! 通道：同一角色下的主数据链路实体和辅数据链路实体。
//!
//! 通道是相邻层交互的单元。第三层请求按其链路标识中的信道类型路由到实体，
//! 入站 PH-DATA 指示同理。实体产生的输出会被立即取出：帧经由通道的
//! [`delivery`] 策略发送，消息交给已绑定的第三层处理器。

mod builder;
pub mod delivery;


pub use builder::ChannelBuilder;
pub use delivery::{Layer3Handler, PhysicalLayerHandler, PrimitiveQueue};

use self::delivery::Delivery;
use crate::{
    core::entity::{LinkEntity, Output, state::LinkState},
    error::{Error, Result},
    link::{ChannelKind, Role},
    primitive::{Operation, PhPrimitive},
    rll::RllMessage,
};
use tokio::time::Instant;
use tracing::{debug, trace};

/// Operating flags, fixed when the channel is built.
///
/// 运行标志，在通道构建时确定。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelFlags {
    /// Route every outbound primitive through the polling queue, even if a
    /// physical-layer handler is bound.
    /// 即使绑定了物理层处理器，也将所有出站原语送入轮询队列。
    pub polling_only: bool,
}

/// A LAPDm channel.
///
/// 一个 LAPDm 通道。
pub struct Channel {
    role: Role,
    flags: ChannelFlags,
    chan_nr: u8,
    /// Indexed by [`ChannelKind::index`].
    entities: [LinkEntity; 2],
    delivery: Box<dyn Delivery>,
    layer3: Option<Box<dyn Layer3Handler>>,
}

impl Channel {
    /// Starts building a channel for the given side of the radio interface.
    ///
    /// 为无线接口的指定一端开始构建通道。
    pub fn builder(role: Role) -> ChannelBuilder {
        ChannelBuilder::new(role)
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn flags(&self) -> ChannelFlags {
        self.flags
    }

    pub fn chan_nr(&self) -> u8 {
        self.chan_nr
    }

    /// Returns `true` if outbound primitives wait in the polling queue.
    pub fn is_polling(&self) -> bool {
        self.delivery.is_polling()
    }

    pub fn state(&self, kind: ChannelKind) -> LinkState {
        self.entities[kind.index()].state()
    }

    /// Read access to one entity, mainly for inspection.
    pub fn entity(&self, kind: ChannelKind) -> &LinkEntity {
        &self.entities[kind.index()]
    }

    /// Passes a layer-3 request to the entity named by its link identifier.
    ///
    /// In polling mode the request is refused with `QueueFull` if the frames
    /// it would emit do not all fit in the target queue. Nothing is sent or
    /// queued in that case.
    ///
    /// 将第三层请求交给其链路标识所指定的实体。
    ///
    /// 在轮询模式下，若请求将产生的帧无法全部放入目标队列，请求会以
    /// `QueueFull` 被拒绝，此时不会发送或排队任何内容。
    pub fn inject_layer3_message(&mut self, message: RllMessage) -> Result<()> {
        if !message.primitive.is_request() {
            return Err(Error::InvalidMessage("only request primitives can be injected"));
        }
        let kind = message.link_id.kind();
        let sapi = message.link_id.sapi();
        if sapi != self.entities[kind.index()].config().sapi {
            return Err(Error::UnsupportedSapi(sapi));
        }
        let needed = self.entities[kind.index()].transmit_demand(&message.primitive);
        self.delivery.check_capacity(kind, needed)?;

        trace!(
            role = %self.role,
            %kind,
            sapi,
            primitive = ?message.primitive.message_type(),
            "Injecting layer-3 message"
        );
        let result = self.entities[kind.index()].handle_request(message.primitive, Instant::now());
        self.flush(kind);
        result
    }

    /// Decodes an RSL RLL message and injects it.
    ///
    /// 解码一条 RSL RLL 消息并注入。
    pub fn receive_rsl(&mut self, data: &[u8]) -> Result<()> {
        let message = RllMessage::decode(data)?;
        self.inject_layer3_message(message)
    }

    /// Processes a PH-DATA indication from the physical layer. This is
    /// synchronous in both delivery modes.
    ///
    /// 处理来自物理层的 PH-DATA 指示。无论哪种交付模式都同步处理。
    pub fn deliver_physical_layer_primitive(&mut self, primitive: PhPrimitive) -> Result<()> {
        if primitive.operation != Operation::Indication {
            return Err(Error::InvalidPrimitive("expected a PH-DATA indication"));
        }
        let kind = primitive.link_id.kind();
        let result =
            self.entities[kind.index()].handle_frame_bytes(&primitive.data, Instant::now());
        self.flush(kind);
        result
    }

    /// Takes the oldest queued outbound primitive of one kind. `None` means
    /// nothing is pending, which is also always the case in direct mode.
    ///
    /// 取出某一信道类型中最早排队的出站原语。`None` 表示没有待处理的原语；
    /// 在直接模式下总是如此。
    pub fn dequeue_outbound_primitive(&mut self, kind: ChannelKind) -> Option<PhPrimitive> {
        self.delivery.dequeue(kind)
    }

    pub fn pending_primitives(&self, kind: ChannelKind) -> usize {
        self.delivery.pending(kind)
    }

    /// Lets both entities handle due timer expiries.
    ///
    /// 让两个实体处理到期的定时器。
    pub fn tick(&mut self, now: Instant) {
        for kind in ChannelKind::ALL {
            self.entities[kind.index()].on_tick(now);
            self.flush(kind);
        }
    }

    /// The earliest instant at which [`Channel::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entities.iter().filter_map(LinkEntity::next_deadline).min()
    }

    /// Tears the channel down. Timers, queued primitives and partially
    /// reassembled messages are discarded; nothing is reported to either
    /// neighbour.
    ///
    /// 拆除通道。丢弃定时器、排队的原语和部分重组的消息；不会通知任何相邻层。
    pub fn teardown(mut self) {
        for entity in &mut self.entities {
            entity.reset();
        }
        self.delivery.clear();
        debug!(role = %self.role, chan_nr = self.chan_nr, "Channel torn down");
    }

    /// Routes everything the entity produced to its consumer, in order.
    fn flush(&mut self, kind: ChannelKind) {
        while let Some(output) = self.entities[kind.index()].pop_output() {
            match output {
                Output::Physical(primitive) => self.delivery.deliver(primitive),
                Output::Layer3(message) => match self.layer3.as_mut() {
                    Some(handler) => handler.on_message(message),
                    None => trace!(
                        %kind,
                        primitive = ?message.primitive.message_type(),
                        "No layer-3 handler bound, dropping message"
                    ),
                },
            }
        }
    }
}
