//! Identification of a data link: which side we are, which logical channel,
//! and the RSL link identifier octet that names both.
//!
//! 数据链路的标识：本端角色、逻辑信道类型，以及同时标识二者的 RSL 链路标识字节。

use std::fmt;

/// Which end of the radio interface a channel represents.
///
/// 通道所代表的无线接口的一端。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Mobile station. Sends commands with C/R = 0.
    /// 移动台。发送命令时 C/R = 0。
    Ms,
    /// Base station (network side). Sends commands with C/R = 1.
    /// 基站（网络侧）。发送命令时 C/R = 1。
    Bts,
}

impl Role {
    /// The C/R bit this role puts on commands it sends.
    ///
    /// 此角色发送命令时使用的 C/R 位。
    pub fn command_cr(self) -> bool {
        matches!(self, Role::Bts)
    }

    /// The C/R bit this role puts on responses it sends.
    ///
    /// 此角色发送响应时使用的 C/R 位。
    pub fn response_cr(self) -> bool {
        !self.command_cr()
    }

    /// Returns `true` if a frame received from the peer with the given C/R
    /// bit is a command.
    ///
    /// 如果从对端收到的、带有给定 C/R 位的帧是命令，则返回 `true`。
    pub fn is_peer_command(self, cr: bool) -> bool {
        cr == self.peer().command_cr()
    }

    /// The role at the other end of the link.
    pub fn peer(self) -> Role {
        match self {
            Role::Ms => Role::Bts,
            Role::Bts => Role::Ms,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Ms => write!(f, "MS"),
            Role::Bts => write!(f, "BTS"),
        }
    }
}

/// The logical channel a link entity runs on.
///
/// 链路实体所运行的逻辑信道。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// The main dedicated signalling channel (SDCCH / FACCH).
    /// 主专用信令信道（SDCCH / FACCH）。
    Main,
    /// The slow associated channel used for short messages (SACCH).
    /// 用于短消息的慢速随路信道（SACCH）。
    Secondary,
}

impl ChannelKind {
    /// Both kinds, main first.
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Main, ChannelKind::Secondary];

    /// Index used for per-kind arrays.
    pub(crate) fn index(self) -> usize {
        match self {
            ChannelKind::Main => 0,
            ChannelKind::Secondary => 1,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Main => write!(f, "main"),
            ChannelKind::Secondary => write!(f, "secondary"),
        }
    }
}

const CHANNEL_TYPE_MASK: u8 = 0xc0;
const CHANNEL_TYPE_SACCH: u8 = 0x40;
const PRIORITY_MASK: u8 = 0x18;
const SAPI_MASK: u8 = 0x07;

/// The RSL link identifier octet:
/// `channel type (2) | NA (1) | priority (2) | SAPI (3)`.
///
/// RSL 链路标识字节：`信道类型(2) | NA(1) | 优先级(2) | SAPI(3)`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LinkId(u8);

impl LinkId {
    /// Builds a link identifier from its parts. Out-of-range values are masked.
    ///
    /// 由各部分构建链路标识。超出范围的值会被截断。
    pub fn new(kind: ChannelKind, sapi: u8, priority: u8) -> Self {
        let channel_type = match kind {
            ChannelKind::Main => 0,
            ChannelKind::Secondary => CHANNEL_TYPE_SACCH,
        };
        LinkId(channel_type | ((priority << 3) & PRIORITY_MASK) | (sapi & SAPI_MASK))
    }

    /// Wraps a raw octet as received on the wire.
    pub fn from_raw(raw: u8) -> Self {
        LinkId(raw)
    }

    pub fn raw(self) -> u8 {
        self.0
    }

    /// The channel kind selected by the channel-type bits. Any type other than
    /// SACCH addresses the main channel.
    ///
    /// 由信道类型位选择的信道种类。SACCH 以外的任何类型都指向主信道。
    pub fn kind(self) -> ChannelKind {
        if self.0 & CHANNEL_TYPE_MASK == CHANNEL_TYPE_SACCH {
            ChannelKind::Secondary
        } else {
            ChannelKind::Main
        }
    }

    pub fn sapi(self) -> u8 {
        self.0 & SAPI_MASK
    }

    pub fn priority(self) -> u8 {
        (self.0 & PRIORITY_MASK) >> 3
    }
}
