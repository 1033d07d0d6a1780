//! Reassembles segmented layer-3 messages from in-sequence I-frame payloads.
//!
//! 将按序到达的 I 帧载荷重组为完整的第三层消息。

use crate::error::{Error, Result};
use bytes::{Bytes, BytesMut};

/// The per-entity reassembly context. Only one message is reassembled at a
/// time; segments arrive already ordered by the sequence check.
///
/// 每个实体的重组上下文。同一时间只重组一条消息；分段经过序列检查后已有序到达。
#[derive(Debug)]
pub struct ReceiveBuffer {
    buffer: BytesMut,
    in_progress: bool,
    /// Length every segment with the M bit must carry (N201).
    segment_len: usize,
    max_len: usize,
}

impl ReceiveBuffer {
    pub fn new(segment_len: usize, max_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(segment_len),
            in_progress: false,
            segment_len,
            max_len,
        }
    }

    /// Returns `true` while a segmented message is partially received.
    ///
    /// 当分段消息只接收了一部分时返回 `true`。
    pub fn in_progress(&self) -> bool {
        self.in_progress
    }

    /// Number of octets accumulated so far.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Adds one segment. Returns the complete message once a segment without
    /// the M bit arrives.
    ///
    /// A segment with the M bit must be exactly N201 octets long, and the
    /// total may not exceed the configured maximum. On violation the context
    /// is reset and nothing is delivered.
    ///
    /// 添加一个分段。当收到不带 M 位的分段时返回完整消息。
    /// 带 M 位的分段必须恰好为 N201 字节，总长度不得超过配置的最大值。
    /// 违反时上下文被重置，不交付任何内容。
    pub fn push(&mut self, data: &[u8], more: bool) -> Result<Option<Bytes>> {
        if more && data.len() != self.segment_len {
            let error = Error::Reassembly {
                expected: self.segment_len,
                actual: data.len(),
            };
            self.reset();
            return Err(error);
        }

        let total = self.buffer.len() + data.len();
        if total > self.max_len {
            self.reset();
            return Err(Error::Reassembly {
                expected: self.max_len,
                actual: total,
            });
        }

        self.buffer.extend_from_slice(data);
        if more {
            self.in_progress = true;
            return Ok(None);
        }

        self.in_progress = false;
        Ok(Some(self.buffer.split().freeze()))
    }

    /// Drops any partially reassembled message.
    ///
    /// 丢弃任何部分重组的消息。
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.in_progress = false;
    }
}
