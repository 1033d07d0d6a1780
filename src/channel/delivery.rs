//! How outbound primitives leave a channel, and the handler traits for the
//! neighbouring layers.
//!
//! A channel picks one [`Delivery`] strategy when it is built: [`Direct`]
//! pushes every primitive into a bound physical-layer handler, [`Polling`]
//! parks them in a per-kind [`PrimitiveQueue`] until a consumer dequeues
//! them. Inbound processing does not depend on the strategy.
//!
//! 出站原语如何离开通道，以及相邻层的处理器 trait。
//!
//! 通道在构建时选定一种 [`Delivery`] 策略：[`Direct`] 把每个原语推送给已绑定的
//! 物理层处理器，[`Polling`] 把它们按信道类型暂存在 [`PrimitiveQueue`] 中，
//! 直到消费者取出。入站处理与所选策略无关。

use crate::{
    error::{Error, Result},
    link::ChannelKind,
    primitive::PhPrimitive,
    rll::RllMessage,
};
use std::collections::VecDeque;
use tracing::{trace, warn};

/// Receives PH-DATA requests in direct mode.
///
/// Implementations must not call back into the channel that invoked them.
///
/// 在直接模式下接收 PH-DATA 请求。
///
/// 实现不得回调调用它的同一个通道。
pub trait PhysicalLayerHandler {
    fn on_primitive(&mut self, primitive: PhPrimitive);
}

impl<F> PhysicalLayerHandler for F
where
    F: FnMut(PhPrimitive),
{
    fn on_primitive(&mut self, primitive: PhPrimitive) {
        self(primitive)
    }
}

/// Receives indications and confirmations for layer 3.
///
/// 接收发往第三层的指示和确认。
pub trait Layer3Handler {
    fn on_message(&mut self, message: RllMessage);
}

impl<F> Layer3Handler for F
where
    F: FnMut(RllMessage),
{
    fn on_message(&mut self, message: RllMessage) {
        self(message)
    }
}

/// The transmit strategy of a channel.
///
/// 通道的发送策略。
pub(crate) trait Delivery {
    /// Hands over one outbound primitive produced by an entity.
    fn deliver(&mut self, primitive: PhPrimitive);

    /// Fails with `QueueFull` unless `needed` more primitives of `kind` fit.
    fn check_capacity(&self, kind: ChannelKind, needed: usize) -> Result<()>;

    fn dequeue(&mut self, kind: ChannelKind) -> Option<PhPrimitive>;

    fn pending(&self, kind: ChannelKind) -> usize;

    /// Drops everything still queued.
    fn clear(&mut self);

    fn is_polling(&self) -> bool;
}

/// Direct (push) delivery through a bound physical-layer handler.
///
/// 通过已绑定物理层处理器的直接（推送）交付。
pub(crate) struct Direct {
    handler: Box<dyn PhysicalLayerHandler>,
}

impl Direct {
    pub(crate) fn new(handler: Box<dyn PhysicalLayerHandler>) -> Self {
        Self { handler }
    }
}

impl Delivery for Direct {
    fn deliver(&mut self, primitive: PhPrimitive) {
        self.handler.on_primitive(primitive);
    }

    fn check_capacity(&self, _kind: ChannelKind, _needed: usize) -> Result<()> {
        Ok(())
    }

    fn dequeue(&mut self, _kind: ChannelKind) -> Option<PhPrimitive> {
        None
    }

    fn pending(&self, _kind: ChannelKind) -> usize {
        0
    }

    fn clear(&mut self) {}

    fn is_polling(&self) -> bool {
        false
    }
}

/// A FIFO of outbound primitives for one channel kind.
///
/// 某一信道类型的出站原语先进先出队列。
#[derive(Debug)]
pub struct PrimitiveQueue {
    items: VecDeque<PhPrimitive>,
    capacity: Option<usize>,
}

impl PrimitiveQueue {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
        }
    }

    /// Appends a primitive, failing when the queue is at capacity.
    ///
    /// 追加一个原语，队列已满时返回错误。
    pub fn push(&mut self, primitive: PhPrimitive) -> Result<()> {
        if let Some(capacity) = self.capacity.filter(|&cap| self.items.len() >= cap) {
            return Err(Error::QueueFull { capacity });
        }
        self.items.push_back(primitive);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<PhPrimitive> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity.is_some_and(|cap| self.items.len() >= cap)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Polling (pull) delivery: one queue per channel kind.
///
/// 轮询（拉取）交付：每种信道类型一个队列。
pub(crate) struct Polling {
    queues: [PrimitiveQueue; 2],
}

impl Polling {
    pub(crate) fn new(capacity: Option<usize>) -> Self {
        Self {
            queues: [PrimitiveQueue::new(capacity), PrimitiveQueue::new(capacity)],
        }
    }
}

impl Delivery for Polling {
    fn deliver(&mut self, primitive: PhPrimitive) {
        let kind = primitive.link_id.kind();
        let queue = &mut self.queues[kind.index()];
        match queue.push(primitive) {
            Ok(()) => trace!(%kind, pending = queue.len(), "Primitive queued for polling"),
            Err(e) => warn!(%kind, error = %e, "Dropping outbound primitive"),
        }
    }

    fn check_capacity(&self, kind: ChannelKind, needed: usize) -> Result<()> {
        let queue = &self.queues[kind.index()];
        match queue.capacity() {
            Some(capacity) if queue.len() + needed > capacity => {
                Err(Error::QueueFull { capacity })
            }
            _ => Ok(()),
        }
    }

    fn dequeue(&mut self, kind: ChannelKind) -> Option<PhPrimitive> {
        self.queues[kind.index()].pop()
    }

    fn pending(&self, kind: ChannelKind) -> usize {
        self.queues[kind.index()].len()
    }

    fn clear(&mut self) {
        for queue in &mut self.queues {
            queue.clear();
        }
    }

    fn is_polling(&self) -> bool {
        true
    }
}
