//! 定义了库中所有可能的错误类型。
//! Defines all possible error types in the library.

use crate::rll::RlmCause;
use thiserror::Error;

/// Reasons a received frame could not be decoded.
/// 接收到的帧无法解码的原因。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer is shorter than the fixed three-octet header.
    /// 缓冲区短于固定的三字节头部。
    #[error("frame truncated: need {expected} octets, got {actual}")]
    Truncated { expected: usize, actual: usize },

    /// The length indicator declares more payload than the buffer holds.
    /// 长度指示声明的载荷超过了缓冲区中的数据。
    #[error("length indicator declares {declared} octets but only {available} are present")]
    LengthMismatch { declared: usize, available: usize },

    /// The control field does not match any known frame type.
    /// 控制字段不匹配任何已知的帧类型。
    #[error("unknown frame type in control field 0x{0:02x}")]
    UnknownFrameType(u8),

    /// The address field is not a single-octet LAPDm address (EA or LPD wrong).
    /// 地址字段不是单字节 LAPDm 地址（EA 或 LPD 错误）。
    #[error("invalid address field 0x{0:02x}")]
    InvalidAddress(u8),

    /// The length indicator has its EL bit cleared.
    /// 长度指示的 EL 位未置位。
    #[error("invalid length indicator 0x{0:02x}")]
    InvalidLengthIndicator(u8),
}

/// The primary error type for the LAPDm engine.
/// LAPDm 引擎的主要错误类型。
#[derive(Debug, Error)]
pub enum Error {
    /// A received frame was malformed and has been discarded.
    /// 接收到的帧格式错误，已被丢弃。
    #[error("malformed frame: {0}")]
    Decode(#[from] DecodeError),

    /// An I-frame arrived with N(S) different from V(R). A REJ has been sent.
    /// 收到的 I 帧的 N(S) 与 V(R) 不同。已发送 REJ。
    #[error("out of sequence I-frame: expected N(S)={expected}, received {received}")]
    Sequence { expected: u8, received: u8 },

    /// A received N(R) does not acknowledge a frame that is outstanding.
    /// 收到的 N(R) 未确认任何在途帧。
    #[error("invalid N(R)={nr}, outstanding range is V(A)={va}..=V(S)={vs}")]
    InvalidNr { nr: u8, va: u8, vs: u8 },

    /// Segment lengths did not add up; the partial message was dropped.
    /// 分段长度不一致；部分消息已被丢弃。
    #[error("reassembly failed: expected {expected} octets, got {actual}")]
    Reassembly { expected: usize, actual: usize },

    /// The data link was lost after exhausting the retransmission budget.
    /// 重传次数耗尽后数据链路丢失。
    #[error("link failure: {0:?}")]
    LinkFailure(RlmCause),

    /// The outbound primitive queue is at capacity.
    /// 出站原语队列已满。
    #[error("outbound primitive queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },

    /// The message is larger than the channel allows.
    /// 消息大于通道允许的大小。
    #[error("message of {len} octets exceeds the maximum of {max}")]
    MessageTooLarge { len: usize, max: usize },

    /// Acknowledged data was requested on a link that is not established.
    /// 在未建立的链路上请求发送确认数据。
    #[error("data link not established")]
    NotEstablished,

    /// The request cannot be served in the current link state.
    /// 当前链路状态无法处理该请求。
    #[error("request not allowed in state {0}")]
    InvalidState(&'static str),

    /// The SAPI is not served by the addressed entity.
    /// 目标实体不服务该 SAPI。
    #[error("unsupported SAPI {0}")]
    UnsupportedSapi(u8),

    /// A layer-3 message could not be parsed or is not a request.
    /// 第三层消息无法解析或不是请求。
    #[error("invalid layer-3 message: {0}")]
    InvalidMessage(&'static str),

    /// A physical-layer primitive had the wrong operation for its direction.
    /// 物理层原语的操作类型与方向不符。
    #[error("invalid physical-layer primitive: {0}")]
    InvalidPrimitive(&'static str),

    /// The configuration cannot be used to build a channel.
    /// 该配置无法用于构建通道。
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// A specialized `Result` type for this library.
/// 本库专用的 `Result` 类型。
pub type Result<T> = std::result::Result<T, Error>;
