// SPDX-License-Identifier: MIT
//! Fixed-backoff retry for host lookups.
//!
//! The fetch contract is a small state machine: a bounded attempt counter, a
//! fixed sleep between attempts, and a terminal-vs-transient split decided by
//! the caller's predicate. Terminal errors (a reference that simply does not
//! exist) abort immediately without consuming the remaining budget.

use std::time::Duration;

use tracing::{debug, warn};

/// Attempt budget and inter-attempt delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first try.
    pub max_attempts: u32,
    /// Fixed sleep between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Policy suitable for unit tests — same budget, no real waiting.
    pub fn instant() -> Self {
        Self {
            max_attempts: 5,
            delay: Duration::from_millis(1),
        }
    }
}

/// Retry an async operation with a fixed delay between attempts.
///
/// Calls `f()` up to `policy.max_attempts` times. An error for which
/// `is_terminal` returns true is returned immediately — retrying a lookup
/// that answered "does not exist" only burns rate limit. Transient errors
/// sleep `policy.delay` and try again; the last error is returned once the
/// budget is exhausted.
///
/// # Panics
/// Panics if `policy.max_attempts` is 0 (would never attempt the operation).
pub async fn retry_fixed<F, Fut, T, E>(
    policy: &RetryPolicy,
    mut is_terminal: impl FnMut(&E) -> bool,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Debug,
{
    assert!(
        policy.max_attempts > 0,
        "RetryPolicy.max_attempts must be at least 1"
    );

    let mut last_err: Option<E> = None;

    for attempt in 1..=policy.max_attempts {
        match f().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "retry succeeded");
                }
                return Ok(value);
            }
            Err(e) if is_terminal(&e) => {
                debug!(attempt, err = ?e, "terminal error — not retrying");
                return Err(e);
            }
            Err(e) => {
                if attempt < policy.max_attempts {
                    warn!(
                        attempt,
                        max = policy.max_attempts,
                        delay_ms = policy.delay.as_millis(),
                        err = ?e,
                        "attempt failed — retrying"
                    );
                    tokio::time::sleep(policy.delay).await;
                } else {
                    warn!(
                        attempt,
                        max = policy.max_attempts,
                        err = ?e,
                        "all retry attempts exhausted"
                    );
                }
                last_err = Some(e);
            }
        }
    }

    // The loop always assigns last_err when all attempts fail.
    Err(last_err.expect("retry loop ended without setting last_err"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn never_terminal(_: &String) -> bool {
        false
    }

    #[tokio::test]
    async fn succeeds_on_first_attempt() {
        let policy = RetryPolicy::instant();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result: Result<u32, String> = retry_fixed(&policy, never_terminal, || {
            let c = calls2.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn transient_errors_consume_the_full_budget() {
        let policy = RetryPolicy::instant();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result: Result<u32, String> = retry_fixed(&policy, never_terminal, || {
            let c = calls2.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
                Err("flaky".to_string())
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "flaky");
        assert_eq!(calls.load(Ordering::Relaxed), 5);
    }

    #[tokio::test]
    async fn terminal_error_stops_after_one_attempt() {
        let policy = RetryPolicy::instant();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result: Result<u32, String> = retry_fixed(&policy, |e| e == "gone", || {
            let c = calls2.clone();
            async move {
                c.fetch_add(1, Ordering::Relaxed);
                Err("gone".to_string())
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "gone");
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn recovers_midway_through_the_budget() {
        let policy = RetryPolicy::instant();
        let calls = Arc::new(AtomicU32::new(0));
        let calls2 = calls.clone();

        let result: Result<u32, String> = retry_fixed(&policy, never_terminal, || {
            let c = calls2.clone();
            async move {
                let n = c.fetch_add(1, Ordering::Relaxed) + 1;
                if n < 4 {
                    Err(format!("attempt {n} failed"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 4);
        assert_eq!(calls.load(Ordering::Relaxed), 4);
    }
}
