use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Fixed-interval, fixed-count polling budget.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub const fn new(interval_ms: u64, max_attempts: u32) -> Self {
        Self {
            interval_ms,
            max_attempts,
        }
    }

    /// Netlify site reachability: every 2 seconds, 10 tries.
    pub const fn accessibility() -> Self {
        Self::new(2_000, 10)
    }

    /// Vercel deployment state: every 5 seconds, 12 tries.
    pub const fn deployment_state() -> Self {
        Self::new(5_000, 12)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

pub enum PollStep<T> {
    Done(T),
    Pending,
}

/// Sleep, check, repeat until `check` reports `Done` or the budget runs out.
/// `check` receives the 1-based attempt number.
pub async fn poll_until<T, F, Fut>(policy: PollPolicy, mut check: F) -> Option<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = PollStep<T>>,
{
    for attempt in 1..=policy.max_attempts {
        tokio::time::sleep(policy.interval()).await;
        if let PollStep::Done(value) = check(attempt).await {
            return Some(value);
        }
    }
    None
}
