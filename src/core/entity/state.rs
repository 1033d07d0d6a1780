//! Defines the state machine of a data link entity.
//!
//! 定义数据链路实体的状态机。

use std::fmt;

/// The state of a data link.
/// 数据链路的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No link. Unacknowledged transfer (UI) is still possible.
    /// 无链路。仍可进行无确认传输（UI）。
    #[default]
    Idle,

    /// SABM sent, waiting for UA.
    /// 已发送 SABM，等待 UA。
    EstablishPending,

    /// Multiple frame operation: acknowledged transfer is active.
    /// 多帧操作：确认传输处于活动状态。
    Established,

    /// DISC sent, waiting for UA or DM.
    /// 已发送 DISC，等待 UA 或 DM。
    DisconnectPending,
}

impl LinkState {
    pub fn name(self) -> &'static str {
        match self {
            LinkState::Idle => "idle",
            LinkState::EstablishPending => "establish-pending",
            LinkState::Established => "established",
            LinkState::DisconnectPending => "disconnect-pending",
        }
    }

    /// Returns `true` if the T200 timer may legitimately run in this state.
    ///
    /// 如果在此状态下 T200 定时器可以运行，返回 `true`。
    pub fn uses_timer(self) -> bool {
        !matches!(self, LinkState::Idle)
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(LinkState::default(), LinkState::Idle);
        assert!(!LinkState::Idle.uses_timer());
        assert!(LinkState::Established.uses_timer());
    }

    #[test]
    fn test_display_names() {
        assert_eq!(LinkState::EstablishPending.to_string(), "establish-pending");
        assert_eq!(LinkState::DisconnectPending.name(), "disconnect-pending");
    }
}
