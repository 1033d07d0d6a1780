//! The packetizer splits a layer-3 message into segments that fit one I frame.
//!
//! Packetizer 负责将第三层消息切分为可放入单个 I 帧的分段。

use bytes::Bytes;

/// One slice of a layer-3 message, destined for one I frame.
///
/// 第三层消息的一个切片，对应一个 I 帧。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub data: Bytes,
    /// Set on every segment except the last one of a message.
    /// 除消息的最后一个分段外，其余分段均置位。
    pub more: bool,
}

/// Splits `payload` into segments of at most `n201` octets.
///
/// A payload of up to `n201` octets yields exactly one segment with the M bit
/// clear. Longer payloads yield `ceil(len / n201)` segments where all but the
/// last are exactly `n201` octets long and carry the M bit.
///
/// 将 `payload` 切分为每段最多 `n201` 字节的分段。
pub(crate) fn segment(payload: Bytes, n201: usize) -> Vec<Segment> {
    debug_assert!(n201 > 0);
    let mut remaining = payload;
    let mut segments = Vec::with_capacity(remaining.len().div_ceil(n201).max(1));

    loop {
        if remaining.len() <= n201 {
            segments.push(Segment {
                data: remaining,
                more: false,
            });
            break;
        }
        let chunk = remaining.split_to(n201);
        segments.push(Segment {
            data: chunk,
            more: true,
        });
    }
    segments
}
