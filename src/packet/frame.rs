//! 定义了可以在无线接口上传输的完整 LAPDm 帧。
//! Defines the complete LAPDm frames that can be transmitted over the radio interface.

use super::control::{Control, FrameType};
use super::header::{Address, FILL_OCTET, HEADER_LEN, LengthIndicator, MAX_PAYLOAD_LEN};
use crate::error::DecodeError;
use bytes::{BufMut, Bytes, BytesMut};

/// A complete protocol frame that can be sent or received.
///
/// The length indicator is not stored; it is derived from `payload` on encode
/// and checked against the buffer on decode.
///
/// 一个可以被发送或接收的完整协议帧。
///
/// 长度指示不单独存储；编码时由 `payload` 推导，解码时与缓冲区校验。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub address: Address,
    pub control: Control,
    /// The M bit of the length indicator.
    /// 长度指示中的 M 位。
    pub more: bool,
    pub payload: Bytes,
}

impl Frame {
    // --- Smart Constructors ---

    /// Creates a new I frame.
    /// 创建一个新的 I 帧。
    pub fn new_i(
        sapi: u8,
        cr: bool,
        ns: u8,
        nr: u8,
        poll: bool,
        more: bool,
        payload: Bytes,
    ) -> Self {
        Frame {
            address: Address::new(sapi, cr),
            control: Control::I { ns, nr, pf: poll },
            more,
            payload,
        }
    }

    /// Creates a new RR frame.
    /// 创建一个新的 RR 帧。
    pub fn new_rr(sapi: u8, cr: bool, nr: u8, pf: bool) -> Self {
        Self::with_control(sapi, cr, Control::Rr { nr, pf }, Bytes::new())
    }

    /// Creates a new RNR frame.
    /// 创建一个新的 RNR 帧。
    pub fn new_rnr(sapi: u8, cr: bool, nr: u8, pf: bool) -> Self {
        Self::with_control(sapi, cr, Control::Rnr { nr, pf }, Bytes::new())
    }

    /// Creates a new REJ frame.
    /// 创建一个新的 REJ 帧。
    pub fn new_rej(sapi: u8, cr: bool, nr: u8, pf: bool) -> Self {
        Self::with_control(sapi, cr, Control::Rej { nr, pf }, Bytes::new())
    }

    /// Creates a new SABM frame, optionally carrying layer-3 information.
    /// 创建一个新的 SABM 帧，可携带第三层信息。
    pub fn new_sabm(sapi: u8, cr: bool, poll: bool, payload: Bytes) -> Self {
        Self::with_control(sapi, cr, Control::Sabm { pf: poll }, payload)
    }

    /// Creates a new UA frame, optionally echoing the SABM information.
    /// 创建一个新的 UA 帧，可回显 SABM 中的信息。
    pub fn new_ua(sapi: u8, cr: bool, final_bit: bool, payload: Bytes) -> Self {
        Self::with_control(sapi, cr, Control::Ua { pf: final_bit }, payload)
    }

    /// Creates a new DISC frame.
    /// 创建一个新的 DISC 帧。
    pub fn new_disc(sapi: u8, cr: bool, poll: bool) -> Self {
        Self::with_control(sapi, cr, Control::Disc { pf: poll }, Bytes::new())
    }

    /// Creates a new DM frame.
    /// 创建一个新的 DM 帧。
    pub fn new_dm(sapi: u8, cr: bool, final_bit: bool) -> Self {
        Self::with_control(sapi, cr, Control::Dm { pf: final_bit }, Bytes::new())
    }

    /// Creates a new UI frame.
    /// 创建一个新的 UI 帧。
    pub fn new_ui(sapi: u8, cr: bool, payload: Bytes) -> Self {
        Self::with_control(sapi, cr, Control::Ui { pf: false }, payload)
    }

    fn with_control(sapi: u8, cr: bool, control: Control, payload: Bytes) -> Self {
        Frame {
            address: Address::new(sapi, cr),
            control,
            more: false,
            payload,
        }
    }

    // --- End of Smart Constructors ---

    /// Decodes a frame from a PH-DATA block. Octets after the declared payload
    /// (fill octets) are ignored.
    ///
    /// 从 PH-DATA 块中解码一个帧。声明载荷之后的字节（填充字节）被忽略。
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::Truncated {
                expected: HEADER_LEN,
                actual: buf.len(),
            });
        }

        let address = Address::from_u8(buf[0])?;
        let control = Control::from_u8(buf[1])?;
        let length = LengthIndicator::from_u8(buf[2])?;

        let available = buf.len() - HEADER_LEN;
        if length.len > available {
            return Err(DecodeError::LengthMismatch {
                declared: length.len,
                available,
            });
        }

        let payload = Bytes::copy_from_slice(&buf[HEADER_LEN..HEADER_LEN + length.len]);
        Ok(Frame {
            address,
            control,
            more: length.more,
            payload,
        })
    }

    /// 将帧编码到缓冲区。
    /// Encodes the frame into a buffer.
    pub fn encode<B: BufMut>(&self, buf: &mut B) {
        debug_assert!(self.payload.len() <= MAX_PAYLOAD_LEN);
        buf.put_u8(self.address.to_u8());
        buf.put_u8(self.control.to_u8());
        buf.put_u8(
            LengthIndicator {
                len: self.payload.len(),
                more: self.more,
            }
            .to_u8(),
        );
        buf.put_slice(&self.payload);
    }

    /// Encodes the frame into a new buffer without padding.
    ///
    /// 将帧编码为新的缓冲区（不填充）。
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_size());
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Encodes the frame and pads it with fill octets up to `block_len`.
    ///
    /// 编码帧并用填充字节补齐到 `block_len`。
    pub fn encode_padded(&self, block_len: usize) -> Bytes {
        let mut buf = BytesMut::with_capacity(block_len.max(self.encoded_size()));
        self.encode(&mut buf);
        if buf.len() < block_len {
            buf.put_bytes(FILL_OCTET, block_len - buf.len());
        }
        buf.freeze()
    }

    /// Calculates the encoded size of the frame.
    ///
    /// 计算帧编码后的大小。
    pub fn encoded_size(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    pub fn frame_type(&self) -> FrameType {
        self.control.frame_type()
    }

    pub fn sapi(&self) -> u8 {
        self.address.sapi
    }
}
