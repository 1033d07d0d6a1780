//! 定义了数据链路和通道的可配置参数。
//! Defines configurable parameters for data links and channels.

use crate::{
    error::{Error, Result},
    link::ChannelKind,
    packet::header::{HEADER_LEN, MAX_PAYLOAD_LEN},
};
use std::time::Duration;

/// A structure containing all configurable parameters for a channel.
///
/// 包含所有通道可配置参数的结构体。
#[derive(Debug, Clone)]
pub struct Config {
    /// Parameters of the main signalling link.
    /// 主信令链路的参数。
    pub main: LinkConfig,

    /// Parameters of the secondary (SACCH) link.
    /// 辅助（SACCH）链路的参数。
    pub secondary: LinkConfig,

    /// Upper bound of the outbound primitive queue per channel kind when the
    /// channel runs in polling mode. `None` leaves the queue unbounded.
    ///
    /// 轮询模式下每种信道出站原语队列的上限。`None` 表示不设上限。
    pub max_queued_primitives: Option<usize>,
}

/// Parameters of a single data link.
///
/// 单条数据链路的参数。
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// The SAPI this link serves.
    /// 此链路服务的 SAPI。
    pub sapi: u8,
    /// N201: maximum number of payload octets in one frame.
    /// N201：单帧最大载荷字节数。
    pub n201: usize,
    /// Octets handed to the physical layer per frame; frames are padded with fill octets.
    /// 每帧交给物理层的字节数；帧会以填充字节补齐。
    pub block_len: usize,
    /// T200: retransmission timer.
    /// T200：重传定时器。
    pub t200: Duration,
    /// N200 applied while establishing or releasing the link.
    /// 链路建立或释放期间使用的 N200。
    pub n200_establish: u8,
    /// N200 applied to I-frame retransmission in the established state.
    /// 已建立状态下 I 帧重传使用的 N200。
    pub n200: u8,
    /// k: maximum number of unacknowledged I-frames.
    /// k：未确认 I 帧的最大数量。
    pub window_size: u8,
    /// Largest layer-3 message accepted for segmentation or reassembly.
    /// 可分段或重组的最大第三层消息。
    pub max_message_len: usize,
}

impl Config {
    /// Returns the link parameters of the given kind.
    ///
    /// 返回给定信道种类的链路参数。
    pub fn link(&self, kind: ChannelKind) -> &LinkConfig {
        match kind {
            ChannelKind::Main => &self.main,
            ChannelKind::Secondary => &self.secondary,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        self.main.validate()?;
        self.secondary.validate()?;
        if self.max_queued_primitives == Some(0) {
            return Err(Error::InvalidConfig("primitive queue capacity must be non-zero"));
        }
        Ok(())
    }
}

impl LinkConfig {
    /// Defaults for the main signalling channel: 23-octet blocks, SAPI 0.
    ///
    /// 主信令信道的默认值：23 字节块，SAPI 0。
    pub fn main() -> Self {
        Self {
            sapi: 0,
            n201: 20,
            block_len: 23,
            t200: Duration::from_millis(1000),
            n200_establish: 5,
            n200: 23,
            window_size: 1,
            max_message_len: 251,
        }
    }

    /// Defaults for the secondary channel: 21-octet SACCH blocks, SAPI 3.
    ///
    /// 辅助信道的默认值：21 字节 SACCH 块，SAPI 3。
    pub fn secondary() -> Self {
        Self {
            sapi: 3,
            n201: 18,
            block_len: 21,
            t200: Duration::from_millis(2000),
            n200_establish: 5,
            n200: 5,
            window_size: 1,
            max_message_len: 251,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.sapi > 7 {
            return Err(Error::InvalidConfig("SAPI must fit in three bits"));
        }
        if self.n201 == 0 || self.n201 > MAX_PAYLOAD_LEN {
            return Err(Error::InvalidConfig("N201 must be within 1..=63"));
        }
        if self.block_len < HEADER_LEN + self.n201 {
            return Err(Error::InvalidConfig("block length cannot hold a full frame"));
        }
        if self.window_size == 0 || self.window_size > 7 {
            return Err(Error::InvalidConfig("window size must be within 1..=7"));
        }
        if self.t200.is_zero() {
            return Err(Error::InvalidConfig("T200 must be non-zero"));
        }
        if self.max_message_len < self.n201 {
            return Err(Error::InvalidConfig("maximum message length below N201"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            main: LinkConfig::main(),
            secondary: LinkConfig::secondary(),
            max_queued_primitives: Some(64),
        }
    }
}
