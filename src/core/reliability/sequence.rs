//! Modulo-8 sequence numbers for N(S), N(R) and the state variables.
//!
//! 用于 N(S)、N(R) 以及状态变量的模 8 序列号。

use std::fmt;

const MODULUS: u8 = 8;

/// A sequence number in `0..=7`.
///
/// 取值范围为 `0..=7` 的序列号。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeqNum(u8);

impl SeqNum {
    pub fn new(value: u8) -> Self {
        SeqNum(value % MODULUS)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// The following sequence number, wrapping after 7.
    ///
    /// 下一个序列号，在 7 之后回绕。
    pub fn next(self) -> Self {
        SeqNum((self.0 + 1) % MODULUS)
    }

    /// Number of steps from `self` forward to `other`.
    ///
    /// 从 `self` 向前到 `other` 的步数。
    pub fn distance_to(self, other: SeqNum) -> u8 {
        (other.0 + MODULUS - self.0) % MODULUS
    }
}

impl fmt::Display for SeqNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_after_seven() {
        let mut seq = SeqNum::new(6);
        seq = seq.next();
        assert_eq!(seq.value(), 7);
        seq = seq.next();
        assert_eq!(seq.value(), 0);
        assert_eq!(SeqNum::new(9).value(), 1);
    }

    #[test]
    fn test_distance_across_wrap() {
        assert_eq!(SeqNum::new(2).distance_to(SeqNum::new(5)), 3);
        assert_eq!(SeqNum::new(6).distance_to(SeqNum::new(1)), 3);
        assert_eq!(SeqNum::new(4).distance_to(SeqNum::new(4)), 0);
    }
}
