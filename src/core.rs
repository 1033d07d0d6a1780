//! The protocol core: the per-link state machine and its reliability layer.
//! 协议核心：每条链路的状态机及其可靠性层。

pub mod entity;
pub mod reliability;

#[cfg(test)]
pub mod test_utils;
