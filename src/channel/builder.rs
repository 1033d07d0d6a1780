//! Builder for a `Channel`.
//!
//! `Channel` 的构建器。

use super::{
    Channel, ChannelFlags,
    delivery::{Delivery, Direct, Layer3Handler, PhysicalLayerHandler, Polling},
};
use crate::{
    config::Config,
    core::entity::LinkEntity,
    error::Result,
    link::{ChannelKind, Role},
};
use tracing::debug;

/// Collects role, flags, configuration and handlers, then builds a channel.
/// Everything set here is fixed for the lifetime of the channel.
///
/// 收集角色、标志、配置和处理器，然后构建通道。这里设置的一切在通道生命周期内不变。
pub struct ChannelBuilder {
    role: Role,
    config: Config,
    chan_nr: u8,
    flags: ChannelFlags,
    physical_layer: Option<Box<dyn PhysicalLayerHandler>>,
    layer3: Option<Box<dyn Layer3Handler>>,
}

impl ChannelBuilder {
    pub(crate) fn new(role: Role) -> Self {
        Self {
            role,
            config: Config::default(),
            chan_nr: 0,
            flags: ChannelFlags::default(),
            physical_layer: None,
            layer3: None,
        }
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// The RSL channel number stamped on outbound primitives and messages.
    pub fn chan_nr(mut self, chan_nr: u8) -> Self {
        self.chan_nr = chan_nr;
        self
    }

    pub fn flags(mut self, flags: ChannelFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Shorthand for setting [`ChannelFlags::polling_only`].
    pub fn polling_only(mut self) -> Self {
        self.flags.polling_only = true;
        self
    }

    /// Binds the physical layer. Without one, the channel runs in polling mode.
    ///
    /// 绑定物理层。未绑定时，通道以轮询模式运行。
    pub fn physical_layer<H>(mut self, handler: H) -> Self
    where
        H: PhysicalLayerHandler + 'static,
    {
        self.physical_layer = Some(Box::new(handler));
        self
    }

    /// Binds the layer-3 handler that receives indications and confirmations.
    ///
    /// 绑定接收指示和确认的第三层处理器。
    pub fn layer3<H>(mut self, handler: H) -> Self
    where
        H: Layer3Handler + 'static,
    {
        self.layer3 = Some(Box::new(handler));
        self
    }

    /// Validates the configuration and builds the channel.
    ///
    /// 校验配置并构建通道。
    pub fn build(self) -> Result<Channel> {
        self.config.validate()?;

        let delivery: Box<dyn Delivery> = match self.physical_layer {
            Some(handler) if !self.flags.polling_only => Box::new(Direct::new(handler)),
            bound => {
                if bound.is_some() {
                    debug!(role = %self.role, "Polling only, physical-layer handler unused");
                }
                Box::new(Polling::new(self.config.max_queued_primitives))
            }
        };

        let entity = |kind: ChannelKind| {
            LinkEntity::new(kind, self.role, self.chan_nr, self.config.link(kind).clone())
        };
        let entities = [entity(ChannelKind::Main), entity(ChannelKind::Secondary)];

        debug!(
            role = %self.role,
            chan_nr = self.chan_nr,
            polling = delivery.is_polling(),
            "Channel built"
        );

        Ok(Channel {
            role: self.role,
            flags: self.flags,
            chan_nr: self.chan_nr,
            entities,
            delivery,
            layer3: self.layer3,
        })
    }
}
