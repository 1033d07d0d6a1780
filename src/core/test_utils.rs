//! Common testing infrastructure for core link tests.
//!
//! Two polling channels stand in for the MS and BTS sides; `pump` plays the
//! radio interface by moving queued requests across as indications.

use crate::{
    channel::Channel,
    config::Config,
    core::entity::state::LinkState,
    error::Result,
    link::{ChannelKind, LinkId, Role},
    packet::frame::Frame,
    primitive::PhPrimitive,
    rll::{RllMessage, RllPrimitive},
};
use bytes::Bytes;
use std::{cell::RefCell, rc::Rc, sync::Once};

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "lapdm=debug".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// The link identifier the default configuration serves for `kind`.
pub fn link_id(kind: ChannelKind) -> LinkId {
    let config = Config::default();
    LinkId::new(kind, config.link(kind).sapi, 0)
}

/// A polling channel plus a record of everything it passed up to layer 3.
pub struct TestLink {
    pub channel: Channel,
    inbox: Rc<RefCell<Vec<RllMessage>>>,
}

impl TestLink {
    pub fn new(role: Role) -> Self {
        Self::with_config(role, Config::default())
    }

    pub fn with_config(role: Role, config: Config) -> Self {
        let inbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&inbox);
        let channel = Channel::builder(role)
            .config(config)
            .polling_only()
            .layer3(move |message: RllMessage| sink.borrow_mut().push(message))
            .build()
            .unwrap();
        Self { channel, inbox }
    }

    /// Sends a layer-3 request down the given link.
    pub fn request(&mut self, kind: ChannelKind, primitive: RllPrimitive) -> Result<()> {
        self.channel
            .inject_layer3_message(RllMessage::new(0, link_id(kind), primitive))
    }

    /// Drains what layer 3 has received so far.
    pub fn take_messages(&self) -> Vec<RllPrimitive> {
        self.inbox
            .borrow_mut()
            .drain(..)
            .map(|message| message.primitive)
            .collect()
    }

    /// Drains the outbound queue of one kind.
    pub fn take_outbound(&mut self, kind: ChannelKind) -> Vec<PhPrimitive> {
        std::iter::from_fn(|| self.channel.dequeue_outbound_primitive(kind)).collect()
    }

    /// Drains the outbound queue of one kind and decodes the frames.
    pub fn take_frames(&mut self, kind: ChannelKind) -> Vec<Frame> {
        self.take_outbound(kind).iter().map(decode).collect()
    }

    /// Feeds a frame to this side as if it came over the air.
    pub fn receive_frame(&mut self, kind: ChannelKind, frame: &Frame) -> Result<()> {
        let block_len = Config::default().link(kind).block_len;
        self.channel
            .deliver_physical_layer_primitive(PhPrimitive::data_indication(
                0,
                link_id(kind),
                frame.encode_padded(block_len),
            ))
    }

    pub fn state(&self, kind: ChannelKind) -> LinkState {
        self.channel.state(kind)
    }
}

/// Decodes the frame carried by a primitive.
pub fn decode(primitive: &PhPrimitive) -> Frame {
    Frame::decode(&primitive.data).unwrap()
}

/// Moves every queued primitive of `kind` from `from` to `to`. Returns how
/// many crossed over.
pub fn pump(from: &mut TestLink, to: &mut TestLink, kind: ChannelKind) -> usize {
    let primitives = from.take_outbound(kind);
    let count = primitives.len();
    for primitive in primitives {
        // Protocol errors are part of what the tests observe through state.
        let _ = to
            .channel
            .deliver_physical_layer_primitive(primitive.into_indication());
    }
    count
}

/// Pumps in both directions until neither side has anything queued.
pub fn pump_until_idle(a: &mut TestLink, b: &mut TestLink, kind: ChannelKind) {
    while pump(a, b, kind) + pump(b, a, kind) > 0 {}
}

/// Establishes the link of `kind` from the MS side and clears both inboxes.
pub fn establish(ms: &mut TestLink, bts: &mut TestLink, kind: ChannelKind) {
    ms.request(kind, RllPrimitive::EstablishRequest(Bytes::from_static(b"\x05\x24\x31")))
        .unwrap();
    pump_until_idle(ms, bts, kind);
    assert_eq!(ms.state(kind), LinkState::Established);
    assert_eq!(bts.state(kind), LinkState::Established);
    ms.take_messages();
    bts.take_messages();
}
