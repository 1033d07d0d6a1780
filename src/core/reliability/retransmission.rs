//! The T200 retransmission timer and its N200 retry counter.
//!
//! T200 重传定时器及其 N200 重试计数器。

use std::time::Duration;
use tokio::time::Instant;

/// What a T200 expiry asks the entity to do.
///
/// T200 超时后要求实体执行的动作。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Retry budget left: retransmit and keep waiting. Carries the retry count.
    /// 仍有重试预算：重传并继续等待。携带当前重试次数。
    Retry(u8),
    /// Retry budget exhausted: the link has failed.
    /// 重试预算已耗尽：链路失败。
    Exhausted,
}

/// A deadline-based timer. It never fires by itself; the owner polls it with
/// [`RetransmissionTimer::is_expired`] from its tick.
///
/// 基于截止时间的定时器。它不会自行触发；由所有者在 tick 中调用
/// [`RetransmissionTimer::is_expired`] 进行检查。
#[derive(Debug, Clone)]
pub struct RetransmissionTimer {
    interval: Duration,
    deadline: Option<Instant>,
    retries: u8,
}

impl RetransmissionTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
            retries: 0,
        }
    }

    /// Arms the timer for a fresh exchange and clears the retry counter.
    ///
    /// 为新的交互启动定时器并清零重试计数器。
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
        self.retries = 0;
    }

    /// Re-arms the timer, keeping the retry counter.
    ///
    /// 重新启动定时器，保留重试计数器。
    pub fn restart(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
        self.retries = 0;
    }

    pub fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn retries(&self) -> u8 {
        self.retries
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consumes one expiry. With budget left the counter is bumped and the
    /// timer re-armed; otherwise the timer is stopped.
    ///
    /// 处理一次超时。若仍有预算则计数加一并重新启动；否则停止定时器。
    pub fn on_expiry(&mut self, now: Instant, budget: u8) -> Expiry {
        if self.retries < budget {
            self.retries += 1;
            self.restart(now);
            Expiry::Retry(self.retries)
        } else {
            self.stop();
            Expiry::Exhausted
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timer_expires_after_interval() {
        let mut timer = RetransmissionTimer::new(Duration::from_millis(1000));
        assert!(!timer.is_expired(Instant::now()));

        timer.start(Instant::now());
        assert!(timer.is_running());
        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(!timer.is_expired(Instant::now()));
        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(timer.is_expired(Instant::now()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_budget_is_honoured() {
        let mut timer = RetransmissionTimer::new(Duration::from_millis(100));
        timer.start(Instant::now());

        for expected in 1..=3 {
            tokio::time::advance(Duration::from_millis(100)).await;
            let now = Instant::now();
            assert!(timer.is_expired(now));
            assert_eq!(timer.on_expiry(now, 3), Expiry::Retry(expected));
        }

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(timer.on_expiry(Instant::now(), 3), Expiry::Exhausted);
        assert!(!timer.is_running());
        assert_eq!(timer.retries(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_keeps_retry_count() {
        let mut timer = RetransmissionTimer::new(Duration::from_millis(100));
        timer.start(Instant::now());
        tokio::time::advance(Duration::from_millis(100)).await;
        timer.on_expiry(Instant::now(), 5);
        timer.restart(Instant::now());
        assert_eq!(timer.retries(), 1);

        timer.start(Instant::now());
        assert_eq!(timer.retries(), 0);
    }
}
