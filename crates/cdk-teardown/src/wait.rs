//! Bounded polling for AWS resources.
//!
//! Provides a generic abstraction for waiting on a resource (or any async
//! condition) to reach a desired state, with backoff between checks and an
//! overall deadline.

use crate::defaults::{SERVICE_STABLE_POLL_INTERVAL, SERVICE_STABLE_TIMEOUT};
use anyhow::Result;
use backon::{BackoffBuilder, ExponentialBuilder};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Configuration for resource waiting.
///
/// Setting `initial_delay == max_delay` gives a fixed polling interval.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitConfig {
    /// Initial delay between checks
    pub initial_delay: Duration,
    /// Maximum delay between checks (cap for exponential growth)
    pub max_delay: Duration,
    /// Maximum total time to wait before timeout
    pub timeout: Duration,
}

impl WaitConfig {
    /// Fixed-interval polling used for ECS service stability (15s, 10 minutes max)
    pub fn services_stable() -> Self {
        Self {
            initial_delay: SERVICE_STABLE_POLL_INTERVAL,
            max_delay: SERVICE_STABLE_POLL_INTERVAL,
            timeout: SERVICE_STABLE_TIMEOUT,
        }
    }
}

/// Wait for a resource to become ready.
///
/// # Arguments
/// * `config` - Wait configuration
/// * `check` - Async function that returns `Ok(true)` when ready, `Ok(false)` to retry
/// * `resource_name` - Name for logging
///
/// # Returns
/// * `Ok(())` - Resource is ready
/// * `Err` - Timeout, or check returned an error
pub async fn wait_for_resource<F, Fut>(
    config: &WaitConfig,
    check: F,
    resource_name: &str,
) -> Result<()>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<bool>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    let mut delays = ExponentialBuilder::default()
        .with_min_delay(config.initial_delay)
        .with_max_delay(config.max_delay)
        .with_factor(2.0)
        .build();

    loop {
        attempts += 1;

        if start.elapsed() >= config.timeout {
            anyhow::bail!(
                "Timeout waiting for {} after {:?} ({} attempts)",
                resource_name,
                config.timeout,
                attempts - 1
            );
        }

        match check().await {
            Ok(true) => {
                debug!(resource = %resource_name, attempts, "Resource ready");
                return Ok(());
            }
            Ok(false) => {
                let remaining = config.timeout.saturating_sub(start.elapsed());
                let delay = delays.next().unwrap_or(config.max_delay).min(remaining);
                debug!(
                    resource = %resource_name,
                    attempt = attempts,
                    delay_ms = delay.as_millis(),
                    "Resource not ready, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                warn!(resource = %resource_name, error = ?e, "Resource check failed");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(timeout_ms: u64) -> WaitConfig {
        WaitConfig {
            initial_delay: Duration::from_millis(5),
            max_delay: Duration::from_millis(5),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    #[test]
    fn services_stable_polls_at_fixed_interval_for_ten_minutes() {
        let config = WaitConfig::services_stable();
        assert_eq!(config.initial_delay, config.max_delay);
        assert_eq!(config.timeout, Duration::from_secs(600));
    }

    #[tokio::test]
    async fn ready_after_a_few_checks() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let result = wait_for_resource(
            &fast_config(5_000),
            move || async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(n >= 3)
            },
            "svc",
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn times_out_when_never_ready() {
        let err = wait_for_resource(&fast_config(40), || async { Ok(false) }, "svc")
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Timeout waiting for svc"), "{err}");
    }

    #[tokio::test]
    async fn check_error_stops_waiting() {
        let counter = AtomicU32::new(0);
        let calls = &counter;
        let err = wait_for_resource(
            &fast_config(5_000),
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<bool, _>(anyhow::anyhow!("service is INACTIVE"))
            },
            "svc",
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "service is INACTIVE");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
