//! # Retry with Jittered Exponential Backoff
//!
//! Transient transport failures are retried inside the adapter layer;
//! everything above it sees either a payload or a spent retry budget.
//! Delays grow geometrically and carry ±10% jitter so a fleet of workers
//! hammered by the same outage does not re-synchronize its retries.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::error::ProviderError;

/// Backoff policy for provider fetches.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub attempts: u32,
    /// Delay before the first retry.
    pub initial: Duration,
    /// Multiplier applied per retry.
    pub multiplier: f64,
    /// Delay ceiling.
    pub max: Duration,
    /// Jitter as a fraction of the delay (0.1 = ±10%).
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial: Duration::from_secs(1),
            multiplier: 2.0,
            max: Duration::from_secs(30),
            jitter_ratio: 0.1,
        }
    }
}

impl RetryPolicy {
    /// The jittered delay before retry number `retry` (0-based).
    fn delay(&self, retry: u32) -> Duration {
        let base = self.initial.as_secs_f64() * self.multiplier.powi(retry as i32);
        let capped = base.min(self.max.as_secs_f64());
        let jitter = if self.jitter_ratio > 0.0 {
            rand::thread_rng().gen_range(-self.jitter_ratio..=self.jitter_ratio)
        } else {
            0.0
        };
        Duration::from_secs_f64((capped * (1.0 + jitter)).max(0.0))
    }
}

/// Run `op` under the policy, sleeping between attempts.
///
/// The cancel flag is checked before every attempt; observing it yields
/// `ProviderError::Cancelled` immediately, without consuming the
/// remaining budget.
pub fn with_retry<T>(
    policy: &RetryPolicy,
    cancel: &Arc<AtomicBool>,
    mut op: impl FnMut() -> Result<T, ProviderError>,
) -> Result<T, ProviderError> {
    let attempts = policy.attempts.max(1);
    let mut last_err = None;
    for attempt in 0..attempts {
        if cancel.load(Ordering::Relaxed) {
            return Err(ProviderError::Cancelled);
        }
        if attempt > 0 {
            let delay = policy.delay(attempt - 1);
            tracing::warn!(
                attempt,
                total = attempts,
                ?delay,
                "upstream fetch failed, backing off"
            );
            std::thread::sleep(delay);
        }
        match op() {
            Ok(value) => return Ok(value),
            // Malformed payloads will not improve on retry.
            Err(e @ ProviderError::MalformedPayload { .. }) => return Err(e),
            Err(ProviderError::Cancelled) => return Err(ProviderError::Cancelled),
            Err(e) => last_err = Some(e),
        }
    }
    Err(last_err.unwrap_or(ProviderError::Cancelled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy {
            attempts,
            initial: Duration::from_millis(1),
            multiplier: 2.0,
            max: Duration::from_millis(4),
            jitter_ratio: 0.0,
        }
    }

    fn unreachable_err() -> ProviderError {
        ProviderError::Unreachable {
            source_name: "test".into(),
            attempts: 1,
            detail: "refused".into(),
        }
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut calls = 0;
        let result = with_retry(&fast_policy(3), &cancel, || {
            calls += 1;
            if calls < 3 {
                Err(unreachable_err())
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 3);
    }

    #[test]
    fn exhausts_budget_and_surfaces_last_error() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&fast_policy(3), &cancel, || {
            calls += 1;
            Err(unreachable_err())
        });
        assert_eq!(calls, 3);
        assert!(matches!(result, Err(ProviderError::Unreachable { .. })));
    }

    #[test]
    fn malformed_payloads_do_not_retry() {
        let cancel = Arc::new(AtomicBool::new(false));
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&fast_policy(5), &cancel, || {
            calls += 1;
            Err(ProviderError::MalformedPayload {
                source_name: "test".into(),
                detail: "not json".into(),
            })
        });
        assert_eq!(calls, 1);
        assert!(matches!(result, Err(ProviderError::MalformedPayload { .. })));
    }

    #[test]
    fn cancellation_preempts_attempts() {
        let cancel = Arc::new(AtomicBool::new(true));
        let mut calls = 0;
        let result: Result<(), _> = with_retry(&fast_policy(3), &cancel, || {
            calls += 1;
            Err(unreachable_err())
        });
        assert_eq!(calls, 0);
        assert!(matches!(result, Err(ProviderError::Cancelled)));
    }

    #[test]
    fn delays_grow_and_cap() {
        let policy = RetryPolicy {
            attempts: 10,
            initial: Duration::from_secs(1),
            multiplier: 2.0,
            max: Duration::from_secs(30),
            jitter_ratio: 0.0,
        };
        assert_eq!(policy.delay(0), Duration::from_secs(1));
        assert_eq!(policy.delay(1), Duration::from_secs(2));
        assert_eq!(policy.delay(4), Duration::from_secs(16));
        assert_eq!(policy.delay(6), Duration::from_secs(30));
    }

    #[test]
    fn jitter_stays_within_ratio() {
        let policy = RetryPolicy {
            attempts: 3,
            initial: Duration::from_secs(10),
            multiplier: 1.0,
            max: Duration::from_secs(10),
            jitter_ratio: 0.1,
        };
        for _ in 0..100 {
            let d = policy.delay(0).as_secs_f64();
            assert!((9.0..=11.0).contains(&d), "delay {d} outside jitter band");
        }
    }
}
