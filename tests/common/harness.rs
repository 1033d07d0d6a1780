//! tests/common/harness.rs
use lapdm::{Channel, ChannelKind, LinkId, PhPrimitive, RllMessage, RllPrimitive, Role};
use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    sync::Once,
};
use tracing_subscriber::fmt::format::FmtSpan;

/// Initializes tracing for tests, ensuring it's only done once.
pub fn init_tracing() {
    static TRACING_INIT: Once = Once::new();
    TRACING_INIT.call_once(|| {
        let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "lapdm=debug".to_string());
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .with_test_writer()
            .try_init();
    });
}

/// The main-channel link identifier used by the scenarios.
pub fn main_link() -> LinkId {
    LinkId::new(ChannelKind::Main, 0, 0)
}

/// Wraps a layer-3 primitive for the main link.
pub fn main_message(primitive: RllPrimitive) -> RllMessage {
    RllMessage::new(0, main_link(), primitive)
}

/// A BTS that only polls and an MS whose physical layer feeds the BTS
/// directly. Each side counts the messages it hands to layer 3.
pub struct AirInterface {
    pub ms: Channel,
    pub bts: Rc<RefCell<Channel>>,
    pub ms_read: Rc<Cell<usize>>,
    pub bts_read: Rc<Cell<usize>>,
}

impl AirInterface {
    pub fn new() -> Self {
        init_tracing();
        let bts_read = Rc::new(Cell::new(0));
        let counter = Rc::clone(&bts_read);
        let bts = Channel::builder(Role::Bts)
            .polling_only()
            .layer3(move |message: RllMessage| {
                tracing::info!(primitive = ?message.primitive.message_type(), "BTS layer 3");
                counter.set(counter.get() + 1);
            })
            .build()
            .unwrap();
        let bts = Rc::new(RefCell::new(bts));

        let ms_read = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ms_read);
        let uplink = Rc::clone(&bts);
        let ms = Channel::builder(Role::Ms)
            .physical_layer(move |primitive: PhPrimitive| {
                let _ = uplink
                    .borrow_mut()
                    .deliver_physical_layer_primitive(primitive.into_indication());
            })
            .layer3(move |message: RllMessage| {
                tracing::info!(primitive = ?message.primitive.message_type(), "MS layer 3");
                counter.set(counter.get() + 1);
            })
            .build()
            .unwrap();

        Self {
            ms,
            bts,
            ms_read,
            bts_read,
        }
    }

    /// Polls one block from the BTS main queue.
    pub fn poll_bts(&self) -> Option<PhPrimitive> {
        self.bts
            .borrow_mut()
            .dequeue_outbound_primitive(ChannelKind::Main)
    }

    /// Polls one block from the BTS and hands it to the MS. Returns `false`
    /// if the BTS had nothing to send.
    pub fn downlink_once(&mut self) -> bool {
        match self.poll_bts() {
            Some(primitive) => {
                self.ms
                    .deliver_physical_layer_primitive(primitive.into_indication())
                    .unwrap();
                true
            }
            None => false,
        }
    }
}
