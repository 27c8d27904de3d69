//! Bounded retry with a fixed delay between attempts.
//!
//! The teams backend runs on a host that sleeps when idle, so the first few
//! requests after a cold start routinely fail. Every failure (transport error or
//! non-success status) consumes one attempt; there is no exponential backoff.

use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tracing::warn;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;
pub const DEFAULT_DELAY: Duration = Duration::from_millis(4000);

/// Progress text emitted before each wait.
pub const WAKING_UP_MESSAGE: &str = "Server waking up... please wait...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_DELAY,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Total time spent sleeping when every attempt fails.
    pub fn worst_case_wait(&self) -> Duration {
        self.delay * self.max_attempts.max(1).saturating_sub(1)
    }
}

/// Runs `attempt` until it succeeds or the policy's attempts are used up.
///
/// `attempt` receives the 1-based attempt number. `on_progress` is called once
/// per wait, never after the final failure.
pub async fn retry<T, F, Fut, P>(policy: RetryPolicy, mut attempt: F, mut on_progress: P) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
    P: FnMut(&str),
{
    let max_attempts = policy.max_attempts.max(1);
    let mut n = 1;
    loop {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(err) if n < max_attempts => {
                warn!(
                    attempt = n,
                    max_attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    "attempt failed, retrying: {err:#}"
                );
                on_progress(WAKING_UP_MESSAGE);
                tokio::time::sleep(policy.delay).await;
                n += 1;
            }
            Err(err) => return Err(err.context(format!("giving up after {max_attempts} attempts"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn policy() -> RetryPolicy {
        RetryPolicy::new(4, Duration::from_millis(4000))
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_on_last_allowed_attempt() {
        let calls = AtomicU32::new(0);
        let mut progress = Vec::new();
        let start = tokio::time::Instant::now();

        let value = retry(
            policy(),
            |n| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 4 {
                        bail!("cold start {n}");
                    }
                    Ok(n)
                }
            },
            |msg| progress.push(msg.to_string()),
        )
        .await
        .unwrap();

        assert_eq!(value, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(progress.len(), 3);
        assert!(progress.iter().all(|m| m == WAKING_UP_MESSAGE));
        assert!(start.elapsed() >= Duration::from_millis(12_000));
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_exactly_max_attempts() {
        let calls = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let err = retry(
            policy(),
            |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<(), _>(anyhow::anyhow!("503 Service Unavailable")) }
            },
            |_| {},
        )
        .await
        .unwrap_err();

        let elapsed = start.elapsed();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert!(elapsed >= policy().worst_case_wait());
        assert!(elapsed < policy().worst_case_wait() + policy().delay);
        assert!(format!("{err:#}").contains("503 Service Unavailable"));
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_does_not_wait() {
        let start = tokio::time::Instant::now();
        let mut progress = 0;
        let value = retry(policy(), |_| async { Ok("ok") }, |_| progress += 1)
            .await
            .unwrap();
        assert_eq!(value, "ok");
        assert_eq!(progress, 0);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn zero_attempts_is_clamped_to_one() {
        let p = RetryPolicy::new(0, Duration::from_millis(10));
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.worst_case_wait(), Duration::ZERO);
    }
}
