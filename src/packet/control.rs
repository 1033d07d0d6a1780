//! 定义协议的控制字段及所有帧类型。
//! Defines the control field and all frame types of the protocol.

use crate::error::DecodeError;
use std::fmt;

const PF_BIT: u8 = 0x10;

const S_FORMAT: u8 = 0x01;
const S_RR: u8 = 0x00;
const S_RNR: u8 = 0x04;
const S_REJ: u8 = 0x08;

const U_FORMAT: u8 = 0x03;
const U_SABM: u8 = 0x2f;
const U_DM: u8 = 0x0f;
const U_UI: u8 = 0x03;
const U_DISC: u8 = 0x43;
const U_UA: u8 = 0x63;

/// The type of a frame, without its parameters. Used for logging and matching.
/// 帧的类型（不含参数），用于日志和匹配。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    I,
    Rr,
    Rnr,
    Rej,
    Sabm,
    Ua,
    Disc,
    Dm,
    Ui,
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FrameType::I => "I",
            FrameType::Rr => "RR",
            FrameType::Rnr => "RNR",
            FrameType::Rej => "REJ",
            FrameType::Sabm => "SABM",
            FrameType::Ua => "UA",
            FrameType::Disc => "DISC",
            FrameType::Dm => "DM",
            FrameType::Ui => "UI",
        };
        write!(f, "{}", s)
    }
}

/// The decoded control octet. `pf` is the poll bit on commands and the final
/// bit on responses.
///
/// 解码后的控制字节。`pf` 在命令中为轮询位，在响应中为终止位。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// Numbered information frame.
    /// 带编号的信息帧。
    I { ns: u8, nr: u8, pf: bool },
    /// Receiver ready.
    /// 接收就绪。
    Rr { nr: u8, pf: bool },
    /// Receiver not ready.
    /// 接收未就绪。
    Rnr { nr: u8, pf: bool },
    /// Reject: retransmit from N(R).
    /// 拒绝：从 N(R) 开始重传。
    Rej { nr: u8, pf: bool },
    /// Set asynchronous balanced mode.
    /// 设置异步平衡模式。
    Sabm { pf: bool },
    /// Unnumbered acknowledgement.
    /// 无编号确认。
    Ua { pf: bool },
    /// Disconnect.
    /// 断开连接。
    Disc { pf: bool },
    /// Disconnected mode.
    /// 断开模式。
    Dm { pf: bool },
    /// Unnumbered information.
    /// 无编号信息。
    Ui { pf: bool },
}

impl Control {
    /// 从一个字节尝试转换成 `Control`。
    /// Tries to convert a byte into a `Control`.
    pub fn from_u8(byte: u8) -> Result<Self, DecodeError> {
        let pf = byte & PF_BIT != 0;
        let nr = byte >> 5;

        if byte & 0x01 == 0 {
            return Ok(Control::I {
                ns: (byte >> 1) & 0x07,
                nr,
                pf,
            });
        }

        if byte & 0x03 == S_FORMAT {
            return match byte & 0x0c {
                S_RR => Ok(Control::Rr { nr, pf }),
                S_RNR => Ok(Control::Rnr { nr, pf }),
                S_REJ => Ok(Control::Rej { nr, pf }),
                _ => Err(DecodeError::UnknownFrameType(byte)),
            };
        }

        debug_assert_eq!(byte & 0x03, U_FORMAT);
        match byte & !PF_BIT {
            U_SABM => Ok(Control::Sabm { pf }),
            U_DM => Ok(Control::Dm { pf }),
            U_UI => Ok(Control::Ui { pf }),
            U_DISC => Ok(Control::Disc { pf }),
            U_UA => Ok(Control::Ua { pf }),
            _ => Err(DecodeError::UnknownFrameType(byte)),
        }
    }

    /// 将控制字段编码为一个字节。
    /// Encodes the control field into a single octet.
    pub fn to_u8(&self) -> u8 {
        let pf = |set: bool| if set { PF_BIT } else { 0 };
        match *self {
            Control::I { ns, nr, pf: p } => ((nr & 0x07) << 5) | pf(p) | ((ns & 0x07) << 1),
            Control::Rr { nr, pf: p } => ((nr & 0x07) << 5) | pf(p) | S_RR | S_FORMAT,
            Control::Rnr { nr, pf: p } => ((nr & 0x07) << 5) | pf(p) | S_RNR | S_FORMAT,
            Control::Rej { nr, pf: p } => ((nr & 0x07) << 5) | pf(p) | S_REJ | S_FORMAT,
            Control::Sabm { pf: p } => U_SABM | pf(p),
            Control::Ua { pf: p } => U_UA | pf(p),
            Control::Disc { pf: p } => U_DISC | pf(p),
            Control::Dm { pf: p } => U_DM | pf(p),
            Control::Ui { pf: p } => U_UI | pf(p),
        }
    }

    pub fn frame_type(&self) -> FrameType {
        match self {
            Control::I { .. } => FrameType::I,
            Control::Rr { .. } => FrameType::Rr,
            Control::Rnr { .. } => FrameType::Rnr,
            Control::Rej { .. } => FrameType::Rej,
            Control::Sabm { .. } => FrameType::Sabm,
            Control::Ua { .. } => FrameType::Ua,
            Control::Disc { .. } => FrameType::Disc,
            Control::Dm { .. } => FrameType::Dm,
            Control::Ui { .. } => FrameType::Ui,
        }
    }

    /// The poll/final bit.
    /// 轮询/终止位。
    pub fn pf(&self) -> bool {
        match *self {
            Control::I { pf, .. }
            | Control::Rr { pf, .. }
            | Control::Rnr { pf, .. }
            | Control::Rej { pf, .. }
            | Control::Sabm { pf }
            | Control::Ua { pf }
            | Control::Disc { pf }
            | Control::Dm { pf }
            | Control::Ui { pf } => pf,
        }
    }

    /// N(R) carried by I and supervisory frames.
    /// I 帧和监控帧携带的 N(R)。
    pub fn nr(&self) -> Option<u8> {
        match *self {
            Control::I { nr, .. }
            | Control::Rr { nr, .. }
            | Control::Rnr { nr, .. }
            | Control::Rej { nr, .. } => Some(nr),
            _ => None,
        }
    }

    /// Checks whether this frame type may carry an information field.
    ///
    /// 检查此帧类型是否可以携带信息字段。
    pub fn carries_information(&self) -> bool {
        matches!(
            self,
            Control::I { .. } | Control::Sabm { .. } | Control::Ua { .. } | Control::Ui { .. }
        )
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Control::I { ns, nr, pf } => write!(f, "I(ns={}, nr={}, p={})", ns, nr, pf as u8),
            Control::Rr { nr, pf } | Control::Rnr { nr, pf } | Control::Rej { nr, pf } => {
                write!(f, "{}(nr={}, pf={})", self.frame_type(), nr, pf as u8)
            }
            _ => write!(f, "{}(pf={})", self.frame_type(), self.pf() as u8),
        }
    }
}
