//! Primitives exchanged with the physical layer (PH-SAP).
//!
//! 与物理层（PH-SAP）交换的原语。

use crate::link::LinkId;
use bytes::Bytes;
use std::fmt;

/// The direction tag of a primitive.
///
/// 原语的方向标记。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Data link to physical layer: a frame ready to transmit.
    /// 数据链路到物理层：待发送的帧。
    Request,
    /// Physical layer to data link: a received frame.
    /// 物理层到数据链路：接收到的帧。
    Indication,
    /// Physical layer to data link: a previous request was carried out.
    /// 物理层到数据链路：之前的请求已执行。
    Confirm,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Request => write!(f, "request"),
            Operation::Indication => write!(f, "indication"),
            Operation::Confirm => write!(f, "confirm"),
        }
    }
}

/// A PH-DATA primitive: one MAC block for one link.
///
/// PH-DATA 原语：某条链路的一个 MAC 块。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhPrimitive {
    pub operation: Operation,
    /// RSL channel number.
    /// RSL 信道号。
    pub chan_nr: u8,
    /// Selects the entity (main or secondary) and SAPI.
    /// 选择实体（主或辅）以及 SAPI。
    pub link_id: LinkId,
    /// The frame octets, padded to the block length on transmit.
    /// 帧字节，发送时补齐到块长度。
    pub data: Bytes,
}

impl PhPrimitive {
    /// Creates a PH-DATA request carrying a frame to transmit.
    ///
    /// 创建一个携带待发送帧的 PH-DATA 请求。
    pub fn data_request(chan_nr: u8, link_id: LinkId, data: Bytes) -> Self {
        Self {
            operation: Operation::Request,
            chan_nr,
            link_id,
            data,
        }
    }

    /// Creates a PH-DATA indication carrying a received frame.
    ///
    /// 创建一个携带已接收帧的 PH-DATA 指示。
    pub fn data_indication(chan_nr: u8, link_id: LinkId, data: Bytes) -> Self {
        Self {
            operation: Operation::Indication,
            chan_nr,
            link_id,
            data,
        }
    }

    /// Turns an outbound request into the indication the peer would see after
    /// the block crossed the radio interface.
    ///
    /// 将出站请求转换为该块经过无线接口后对端看到的指示。
    pub fn into_indication(self) -> Self {
        Self {
            operation: Operation::Indication,
            ..self
        }
    }
}
