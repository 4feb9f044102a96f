//! Fixed-interval polling for remote state that converges eventually.
//!
//! Every wait in the controller has the same shape: ask the agent, and if the
//! answer is not there yet, sleep and ask again. [`poll_until`] is that loop;
//! [`PollPolicy`] says how long to sleep and whether to give up.
//!
//! Probe errors are never retried. Only absence of data is.

use credflow_types::config::PollingConfig;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Attempt budget of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempts {
    /// Give up after this many probes (including the first).
    Bounded(u32),
    /// Poll until the condition holds.
    Unbounded,
}

/// How a wait is polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Sleep between two probes. No back-off, no jitter.
    pub interval: Duration,
    pub attempts: Attempts,
}

impl PollPolicy {
    pub fn bounded(attempts: u32, interval: Duration) -> Self {
        Self {
            interval,
            attempts: Attempts::Bounded(attempts),
        }
    }

    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            attempts: Attempts::Unbounded,
        }
    }
}

/// Result of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome<T> {
    /// The probe produced a value.
    Ready {
        value: T,
        /// Probes made, 1 when the first one succeeded.
        attempts: u32,
    },
    /// The attempt budget ran out.
    Exhausted { attempts: u32 },
}

impl<T> PollOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::Exhausted { .. } => None,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            Self::Ready { attempts, .. } | Self::Exhausted { attempts } => *attempts,
        }
    }
}

// ---------------------------------------------------------------------------
// Core loop
// ---------------------------------------------------------------------------

/// Probe until it yields `Some`, sleeping `policy.interval` in between.
///
/// A bounded policy makes at most `n` probes and sleeps `n - 1` times: there
/// is no sleep after the last probe. An error from `probe` ends the poll
/// immediately and is returned as is.
pub async fn poll_until<F, Fut, T, E>(policy: &PollPolicy, mut probe: F) -> Result<PollOutcome<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let mut attempt: u32 = 0;
    loop {
        attempt = attempt.saturating_add(1);

        if let Some(value) = probe().await? {
            if attempt > 1 {
                debug!(attempt, "condition met after {} empty polls", attempt - 1);
            }
            return Ok(PollOutcome::Ready {
                value,
                attempts: attempt,
            });
        }

        if let Attempts::Bounded(max) = policy.attempts {
            if attempt >= max.max(1) {
                warn!(attempt, max_attempts = max, "poll budget exhausted");
                return Ok(PollOutcome::Exhausted { attempts: attempt });
            }
        }

        debug!(
            attempt,
            delay_ms = policy.interval.as_millis() as u64,
            "condition not met, polling again"
        );
        tokio::time::sleep(policy.interval).await;
    }
}

// ---------------------------------------------------------------------------
// Pre-built policies
// ---------------------------------------------------------------------------

fn units(config: &PollingConfig, units: f64) -> Duration {
    Duration::from_millis(config.units_to_ms(units))
}

/// Waiting for an endorsed schema or cred def to appear in its listing.
///
/// Defaults: 3 attempts, 1 time unit apart.
pub fn discovery_policy(config: &PollingConfig) -> PollPolicy {
    PollPolicy::bounded(
        config.discovery_attempts,
        units(config, config.discovery_interval_units),
    )
}

/// Waiting for a connection to become visible to the inviter.
///
/// Defaults: unbounded, 1 time unit apart.
pub fn connection_policy(config: &PollingConfig) -> PollPolicy {
    PollPolicy::unbounded(units(config, config.connection_interval_units))
}

/// Waiting for a credential exchange record to reach a party.
///
/// Defaults: unbounded, 0.1 time unit apart.
pub fn exchange_policy(config: &PollingConfig) -> PollPolicy {
    PollPolicy::unbounded(units(config, config.exchange_interval_units))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    #[test]
    fn test_policies_from_default_config() {
        let config = PollingConfig::default();
        assert_eq!(
            discovery_policy(&config),
            PollPolicy::bounded(3, Duration::from_secs(1))
        );
        assert_eq!(
            connection_policy(&config),
            PollPolicy::unbounded(Duration::from_secs(1))
        );
        assert_eq!(
            exchange_policy(&config),
            PollPolicy::unbounded(Duration::from_millis(100))
        );
    }

    #[tokio::test]
    async fn test_ready_on_first_probe_does_not_sleep() {
        let policy = PollPolicy::bounded(3, Duration::from_secs(60));
        let started = Instant::now();

        let outcome = poll_until(&policy, || async { Ok::<_, ()>(Some("id")) })
            .await
            .unwrap();

        assert_eq!(
            outcome,
            PollOutcome::Ready {
                value: "id",
                attempts: 1
            }
        );
        assert!(started.elapsed() < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_ready_on_third_probe_sleeps_twice() {
        let policy = PollPolicy::bounded(3, Duration::from_millis(20));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let started = Instant::now();

        let outcome = poll_until(&policy, move || {
            let c = counter_clone.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(if n < 2 { None } else { Some("Av1:2:demo:1.0") })
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome.attempts(), 3);
        assert_eq!(outcome.ready(), Some("Av1:2:demo:1.0"));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_bounded_exhausts_without_trailing_sleep() {
        let policy = PollPolicy::bounded(3, Duration::from_millis(1));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let outcome: PollOutcome<()> = poll_until(&policy, move || {
            let c = counter_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(None)
            }
        })
        .await
        .unwrap();

        assert_eq!(outcome, PollOutcome::Exhausted { attempts: 3 });
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_budget_still_probes_once() {
        let policy = PollPolicy::bounded(0, Duration::from_millis(1));
        let outcome: PollOutcome<()> = poll_until(&policy, || async { Ok::<_, ()>(None) })
            .await
            .unwrap();
        assert_eq!(outcome.attempts(), 1);
    }

    #[tokio::test]
    async fn test_probe_error_is_not_retried() {
        let policy = PollPolicy::unbounded(Duration::from_millis(1));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<PollOutcome<()>, &str> = poll_until(&policy, move || {
            let c = counter_clone.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err("agent returned 500")
            }
        })
        .await;

        assert_eq!(result.unwrap_err(), "agent returned 500");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unbounded_keeps_polling_until_ready() {
        let policy = PollPolicy::unbounded(Duration::from_millis(1));
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let outcome = poll_until(&policy, move || {
            let c = counter_clone.clone();
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>((n >= 24).then_some(n))
            }
        })
        .await
        .unwrap();

        assert_eq!(
            outcome,
            PollOutcome::Ready {
                value: 24,
                attempts: 25
            }
        );
    }
}
