//! 定义帧头中的地址字段和长度指示字段。
//! Defines the address and length-indicator fields of the frame header.

use crate::error::DecodeError;

/// Address, control and length indicator: one octet each.
pub const HEADER_LEN: usize = 3;

/// Largest value the six-bit length field can carry.
pub const MAX_PAYLOAD_LEN: usize = 0x3f;

/// Octet used to pad frames up to the block length.
pub const FILL_OCTET: u8 = 0x2b;

const EA_BIT: u8 = 0x01;
const CR_BIT: u8 = 0x02;
const LPD_MASK: u8 = 0x60;
const EL_BIT: u8 = 0x01;
const M_BIT: u8 = 0x02;

/// The address field: `spare | LPD(2) | SAPI(3) | C/R | EA`.
/// LPD is always 0 (normal LAPDm) and EA is always 1 (single-octet address).
///
/// 地址字段：`备用 | LPD(2) | SAPI(3) | C/R | EA`。
/// LPD 恒为 0（普通 LAPDm），EA 恒为 1（单字节地址）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    /// Service access point identifier.
    /// 服务接入点标识符。
    pub sapi: u8,
    /// Command/response bit.
    /// 命令/响应位。
    pub cr: bool,
}

impl Address {
    pub fn new(sapi: u8, cr: bool) -> Self {
        Self { sapi, cr }
    }

    /// 将地址编码为一个字节。
    /// Encodes the address into a single octet.
    pub fn to_u8(&self) -> u8 {
        let cr = if self.cr { CR_BIT } else { 0 };
        ((self.sapi & 0x07) << 2) | cr | EA_BIT
    }

    /// 从一个字节解码地址。
    /// Decodes an address from a single octet.
    pub fn from_u8(byte: u8) -> Result<Self, DecodeError> {
        if byte & EA_BIT == 0 || byte & LPD_MASK != 0 {
            return Err(DecodeError::InvalidAddress(byte));
        }
        Ok(Self {
            sapi: (byte >> 2) & 0x07,
            cr: byte & CR_BIT != 0,
        })
    }
}

/// The length indicator field: `L(6) | M | EL`. EL is always 1.
///
/// 长度指示字段：`L(6) | M | EL`。EL 恒为 1。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthIndicator {
    /// Number of payload octets.
    /// 载荷字节数。
    pub len: usize,
    /// More data follows in the next segment.
    /// 后续分段中还有更多数据。
    pub more: bool,
}

impl LengthIndicator {
    pub fn to_u8(&self) -> u8 {
        debug_assert!(self.len <= MAX_PAYLOAD_LEN);
        let more = if self.more { M_BIT } else { 0 };
        (((self.len & MAX_PAYLOAD_LEN) as u8) << 2) | more | EL_BIT
    }

    pub fn from_u8(byte: u8) -> Result<Self, DecodeError> {
        if byte & EL_BIT == 0 {
            return Err(DecodeError::InvalidLengthIndicator(byte));
        }
        Ok(Self {
            len: (byte >> 2) as usize,
            more: byte & M_BIT != 0,
        })
    }
}
