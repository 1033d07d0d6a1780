//! Layer-3 boundary: radio link layer (RLL) messages exchanged between the
//! data link and the radio resource layer, and their RSL wire encoding.
//!
//! 第三层边界：数据链路与无线资源层之间交换的无线链路层（RLL）消息及其 RSL 编码。

use crate::{
    error::{Error, Result},
    link::LinkId,
};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// RSL message discriminator for radio link layer management.
pub const MDISC_RLL: u8 = 0x02;
const MDISC_TRANSPARENT: u8 = 0x01;

const IE_CHAN_NR: u8 = 0x01;
const IE_LINK_IDENT: u8 = 0x02;
const IE_L3_INFO: u8 = 0x0b;
const IE_RELEASE_MODE: u8 = 0x14;
const IE_RLM_CAUSE: u8 = 0x16;

/// RLL message types as carried in the second RSL octet.
///
/// RSL 第二个字节中携带的 RLL 消息类型。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageType {
    DataRequest = 0x01,
    DataIndication = 0x02,
    ErrorIndication = 0x03,
    EstablishRequest = 0x04,
    EstablishConfirm = 0x05,
    EstablishIndication = 0x06,
    ReleaseRequest = 0x07,
    ReleaseConfirm = 0x08,
    ReleaseIndication = 0x09,
    UnitDataRequest = 0x0a,
    UnitDataIndication = 0x0b,
}

impl MessageType {
    /// 从一个字节尝试转换成 `MessageType`。
    /// Tries to convert a byte into a `MessageType`.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(MessageType::DataRequest),
            0x02 => Some(MessageType::DataIndication),
            0x03 => Some(MessageType::ErrorIndication),
            0x04 => Some(MessageType::EstablishRequest),
            0x05 => Some(MessageType::EstablishConfirm),
            0x06 => Some(MessageType::EstablishIndication),
            0x07 => Some(MessageType::ReleaseRequest),
            0x08 => Some(MessageType::ReleaseConfirm),
            0x09 => Some(MessageType::ReleaseIndication),
            0x0a => Some(MessageType::UnitDataRequest),
            0x0b => Some(MessageType::UnitDataIndication),
            _ => None,
        }
    }
}

/// Reason carried by an ERROR INDICATION.
///
/// ERROR INDICATION 中携带的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RlmCause {
    /// T200 expired N200 + 1 times.
    T200Expired = 0x01,
    ReestablishRequest = 0x02,
    UnsolicitedUa = 0x03,
    UnsolicitedDm = 0x04,
    /// DM received while in multiple frame established state.
    UnsolicitedDmEstablished = 0x05,
    UnsolicitedSupervisory = 0x06,
    SequenceError = 0x07,
    UFrameIncorrectParameters = 0x08,
    SFrameIncorrectParameters = 0x09,
    IFrameIncorrectMBit = 0x0a,
    IFrameIncorrectLength = 0x0b,
    FrameNotImplemented = 0x0c,
}

impl RlmCause {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(RlmCause::T200Expired),
            0x02 => Some(RlmCause::ReestablishRequest),
            0x03 => Some(RlmCause::UnsolicitedUa),
            0x04 => Some(RlmCause::UnsolicitedDm),
            0x05 => Some(RlmCause::UnsolicitedDmEstablished),
            0x06 => Some(RlmCause::UnsolicitedSupervisory),
            0x07 => Some(RlmCause::SequenceError),
            0x08 => Some(RlmCause::UFrameIncorrectParameters),
            0x09 => Some(RlmCause::SFrameIncorrectParameters),
            0x0a => Some(RlmCause::IFrameIncorrectMBit),
            0x0b => Some(RlmCause::IFrameIncorrectLength),
            0x0c => Some(RlmCause::FrameNotImplemented),
            _ => None,
        }
    }
}

/// How a release request is carried out.
///
/// 释放请求的执行方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReleaseMode {
    /// Exchange DISC / UA with the peer.
    /// 与对端交换 DISC / UA。
    #[default]
    Normal,
    /// Drop the link locally without telling the peer.
    /// 在本地直接释放链路，不通知对端。
    Local,
}

/// The content of an RLL message, one variant per primitive.
///
/// RLL 消息的内容，每种原语对应一个变体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RllPrimitive {
    EstablishRequest(Bytes),
    EstablishIndication(Bytes),
    EstablishConfirm(Bytes),
    DataRequest(Bytes),
    DataIndication(Bytes),
    UnitDataRequest(Bytes),
    UnitDataIndication(Bytes),
    ReleaseRequest(ReleaseMode),
    ReleaseIndication,
    ReleaseConfirm,
    ErrorIndication(RlmCause),
}

impl RllPrimitive {
    pub fn message_type(&self) -> MessageType {
        match self {
            RllPrimitive::EstablishRequest(_) => MessageType::EstablishRequest,
            RllPrimitive::EstablishIndication(_) => MessageType::EstablishIndication,
            RllPrimitive::EstablishConfirm(_) => MessageType::EstablishConfirm,
            RllPrimitive::DataRequest(_) => MessageType::DataRequest,
            RllPrimitive::DataIndication(_) => MessageType::DataIndication,
            RllPrimitive::UnitDataRequest(_) => MessageType::UnitDataRequest,
            RllPrimitive::UnitDataIndication(_) => MessageType::UnitDataIndication,
            RllPrimitive::ReleaseRequest(_) => MessageType::ReleaseRequest,
            RllPrimitive::ReleaseIndication => MessageType::ReleaseIndication,
            RllPrimitive::ReleaseConfirm => MessageType::ReleaseConfirm,
            RllPrimitive::ErrorIndication(_) => MessageType::ErrorIndication,
        }
    }

    /// Checks if this primitive travels from layer 3 down to the data link.
    ///
    /// 检查此原语是否从第三层向下传递到数据链路。
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            RllPrimitive::EstablishRequest(_)
                | RllPrimitive::DataRequest(_)
                | RllPrimitive::UnitDataRequest(_)
                | RllPrimitive::ReleaseRequest(_)
        )
    }

    /// The layer-3 information carried, if any.
    pub fn l3_info(&self) -> Option<&Bytes> {
        match self {
            RllPrimitive::EstablishRequest(l3)
            | RllPrimitive::EstablishIndication(l3)
            | RllPrimitive::EstablishConfirm(l3)
            | RllPrimitive::DataRequest(l3)
            | RllPrimitive::DataIndication(l3)
            | RllPrimitive::UnitDataRequest(l3)
            | RllPrimitive::UnitDataIndication(l3) => Some(l3),
            _ => None,
        }
    }
}

/// A layer-3 message addressed to (or coming from) one data link.
///
/// 发往（或来自）某条数据链路的第三层消息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RllMessage {
    /// RSL channel number of the dedicated channel.
    /// 专用信道的 RSL 信道号。
    pub chan_nr: u8,
    /// Channel kind, priority and SAPI.
    /// 信道类型、优先级和 SAPI。
    pub link_id: LinkId,
    pub primitive: RllPrimitive,
}

impl RllMessage {
    pub fn new(chan_nr: u8, link_id: LinkId, primitive: RllPrimitive) -> Self {
        Self {
            chan_nr,
            link_id,
            primitive,
        }
    }

    /// 将消息编码到缓冲区。
    /// Encodes the message in RSL RLL format into a buffer.
    ///
    /// Fails with `MessageTooLarge` if the L3 information does not fit its
    /// 16-bit length field; nothing is written in that case.
    pub fn encode<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        let l3_len = match self.primitive.l3_info() {
            Some(l3) => u16::try_from(l3.len()).map_err(|_| Error::MessageTooLarge {
                len: l3.len(),
                max: usize::from(u16::MAX),
            })?,
            None => 0,
        };

        buf.put_u8(MDISC_RLL);
        buf.put_u8(self.primitive.message_type() as u8);
        buf.put_u8(IE_CHAN_NR);
        buf.put_u8(self.chan_nr);
        buf.put_u8(IE_LINK_IDENT);
        buf.put_u8(self.link_id.raw());

        match &self.primitive {
            RllPrimitive::ReleaseRequest(mode) => {
                buf.put_u8(IE_RELEASE_MODE);
                buf.put_u8(match mode {
                    ReleaseMode::Normal => 0,
                    ReleaseMode::Local => 1,
                });
            }
            RllPrimitive::ErrorIndication(cause) => {
                buf.put_u8(IE_RLM_CAUSE);
                buf.put_u8(1);
                buf.put_u8(*cause as u8);
            }
            other => {
                if let Some(l3) = other.l3_info() {
                    if !l3.is_empty() {
                        buf.put_u8(IE_L3_INFO);
                        buf.put_u16(l3_len);
                        buf.put_slice(l3);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(16);
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }

    /// Decodes an RSL RLL message. Information elements may appear in any
    /// order; unknown ones are rejected.
    ///
    /// 解码一条 RSL RLL 消息。信息单元可以任意顺序出现；未知的会被拒绝。
    pub fn decode(mut buf: &[u8]) -> Result<Self> {
        if buf.remaining() < 2 {
            return Err(Error::InvalidMessage("RSL header truncated"));
        }
        if buf.get_u8() & !MDISC_TRANSPARENT != MDISC_RLL {
            return Err(Error::InvalidMessage("not a radio link layer message"));
        }
        let msg_type = MessageType::from_u8(buf.get_u8())
            .ok_or(Error::InvalidMessage("unknown RLL message type"))?;

        let mut chan_nr = None;
        let mut link_id = None;
        let mut l3_info = Bytes::new();
        let mut release_mode = ReleaseMode::Normal;
        let mut cause = None;

        while buf.has_remaining() {
            let iei = buf.get_u8();
            match iei {
                IE_CHAN_NR | IE_LINK_IDENT | IE_RELEASE_MODE => {
                    if !buf.has_remaining() {
                        return Err(Error::InvalidMessage("information element truncated"));
                    }
                    let value = buf.get_u8();
                    match iei {
                        IE_CHAN_NR => chan_nr = Some(value),
                        IE_LINK_IDENT => link_id = Some(LinkId::from_raw(value)),
                        _ => {
                            release_mode = if value & 0x01 != 0 {
                                ReleaseMode::Local
                            } else {
                                ReleaseMode::Normal
                            }
                        }
                    }
                }
                IE_RLM_CAUSE => {
                    if buf.remaining() < 2 {
                        return Err(Error::InvalidMessage("information element truncated"));
                    }
                    let len = buf.get_u8() as usize;
                    if len == 0 || buf.remaining() < len {
                        return Err(Error::InvalidMessage("information element truncated"));
                    }
                    cause = RlmCause::from_u8(buf[0]);
                    buf.advance(len);
                }
                IE_L3_INFO => {
                    if buf.remaining() < 2 {
                        return Err(Error::InvalidMessage("information element truncated"));
                    }
                    let len = buf.get_u16() as usize;
                    if buf.remaining() < len {
                        return Err(Error::InvalidMessage("L3 information truncated"));
                    }
                    l3_info = Bytes::copy_from_slice(&buf[..len]);
                    buf.advance(len);
                }
                _ => return Err(Error::InvalidMessage("unknown information element")),
            }
        }

        let chan_nr = chan_nr.ok_or(Error::InvalidMessage("missing channel number"))?;
        let link_id = link_id.ok_or(Error::InvalidMessage("missing link identifier"))?;

        let primitive = match msg_type {
            MessageType::EstablishRequest => RllPrimitive::EstablishRequest(l3_info),
            MessageType::EstablishIndication => RllPrimitive::EstablishIndication(l3_info),
            MessageType::EstablishConfirm => RllPrimitive::EstablishConfirm(l3_info),
            MessageType::DataRequest => RllPrimitive::DataRequest(l3_info),
            MessageType::DataIndication => RllPrimitive::DataIndication(l3_info),
            MessageType::UnitDataRequest => RllPrimitive::UnitDataRequest(l3_info),
            MessageType::UnitDataIndication => RllPrimitive::UnitDataIndication(l3_info),
            MessageType::ReleaseRequest => RllPrimitive::ReleaseRequest(release_mode),
            MessageType::ReleaseIndication => RllPrimitive::ReleaseIndication,
            MessageType::ReleaseConfirm => RllPrimitive::ReleaseConfirm,
            MessageType::ErrorIndication => RllPrimitive::ErrorIndication(
                cause.ok_or(Error::InvalidMessage("missing or unknown RLM cause"))?,
            ),
        };

        Ok(Self {
            chan_nr,
            link_id,
            primitive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::ChannelKind;

    const CM_SERVICE_REQUEST: [u8; 16] = [
        0x05, 0x24, 0x31, 0x03, 0x50, 0x18, 0x93, 0x08, 0x29, 0x47, 0x80, 0x00, 0x00, 0x00, 0x00,
        0x80,
    ];

    #[test]
    fn test_establish_request_wire_format() {
        let msg = RllMessage::new(
            0,
            LinkId::new(ChannelKind::Main, 0, 0),
            RllPrimitive::EstablishRequest(Bytes::from_static(&CM_SERVICE_REQUEST)),
        );
        let bytes = msg.to_bytes().unwrap();
        assert_eq!(&bytes[..9], &[0x02, 0x04, 0x01, 0x00, 0x02, 0x00, 0x0b, 0x00, 0x10]);
        assert_eq!(&bytes[9..], &CM_SERVICE_REQUEST);

        let decoded = RllMessage::decode(&bytes).expect("decodes");
        assert_eq!(decoded, msg);
    }

    #[test]
    fn test_release_and_error_messages() {
        let link_id = LinkId::new(ChannelKind::Secondary, 3, 0);
        let release = RllMessage::new(1, link_id, RllPrimitive::ReleaseRequest(ReleaseMode::Local));
        assert_eq!(RllMessage::decode(&release.to_bytes().unwrap()).unwrap(), release);

        let error = RllMessage::new(1, link_id, RllPrimitive::ErrorIndication(RlmCause::T200Expired));
        let bytes = error.to_bytes().unwrap();
        assert_eq!(&bytes[6..], &[0x16, 0x01, 0x01]);
        assert_eq!(RllMessage::decode(&bytes).unwrap(), error);
    }

    #[test]
    fn test_encode_rejects_l3_beyond_length_field() {
        let msg = RllMessage::new(
            0,
            LinkId::new(ChannelKind::Main, 0, 0),
            RllPrimitive::DataRequest(Bytes::from(vec![0u8; 65536])),
        );
        let mut buf = BytesMut::new();
        let err = msg.encode(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            Error::MessageTooLarge {
                len: 65536,
                max: 65535
            }
        ));
        assert!(buf.is_empty());

        let largest = RllMessage::new(
            0,
            LinkId::new(ChannelKind::Main, 0, 0),
            RllPrimitive::DataRequest(Bytes::from(vec![0u8; 65535])),
        );
        let bytes = largest.to_bytes().unwrap();
        assert_eq!(&bytes[7..9], &[0xff, 0xff]);
    }

    #[test]
    fn test_transparent_discriminator_accepted() {
        let bytes = [0x03, 0x01, 0x01, 0x00, 0x02, 0x00, 0x0b, 0x00, 0x01, 0xab];
        let msg = RllMessage::decode(&bytes).expect("transparent RLL message decodes");
        assert_eq!(msg.primitive, RllPrimitive::DataRequest(Bytes::from_static(&[0xab])));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert!(RllMessage::decode(&[0x02]).is_err());
        // Common channel management discriminator.
        assert!(RllMessage::decode(&[0x0c, 0x01, 0x01, 0x00, 0x02, 0x00]).is_err());
        // Unknown message type.
        assert!(RllMessage::decode(&[0x02, 0x7f, 0x01, 0x00, 0x02, 0x00]).is_err());
        // Missing link identifier.
        assert!(RllMessage::decode(&[0x02, 0x01, 0x01, 0x00]).is_err());
        // L3 info shorter than declared.
        assert!(RllMessage::decode(&[0x02, 0x01, 0x01, 0x00, 0x02, 0x00, 0x0b, 0x00, 0x05, 0x01]).is_err());
    }

    #[test]
    fn test_request_classification() {
        assert!(RllPrimitive::DataRequest(Bytes::new()).is_request());
        assert!(RllPrimitive::ReleaseRequest(ReleaseMode::Normal).is_request());
        assert!(!RllPrimitive::DataIndication(Bytes::new()).is_request());
        assert!(!RllPrimitive::ErrorIndication(RlmCause::SequenceError).is_request());
    }
}
