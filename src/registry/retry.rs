// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Bounded backoff for registry calls.

use crate::constants::retry as defaults;
use crate::error::{FleetSyncError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How often and how far apart a failing registry call is attempted
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first
    pub steps: u32,
    /// Wait before the second attempt
    pub duration: Duration,
    /// Multiplier applied to the wait after every attempt
    pub factor: f64,
    /// Maximum relative deviation applied to each wait
    pub jitter: f64,
}

impl Default for RetryPolicy {
    /// Twelve attempts roughly five seconds apart
    fn default() -> Self {
        Self {
            steps: defaults::STEPS,
            duration: Duration::from_secs(defaults::DURATION_SECS),
            factor: defaults::FACTOR,
            jitter: defaults::JITTER,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            steps: 1,
            duration: Duration::ZERO,
            factor: 1.0,
            jitter: 0.0,
        }
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if self.jitter <= 0.0 {
            return delay;
        }
        let deviation = rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        delay.mul_f64((1.0 + deviation).max(0.0))
    }
}

/// Run `operation` until it succeeds or the policy's attempts are used up.
///
/// The error of the last attempt is returned on exhaustion. Cancelling `cancel` while
/// waiting between attempts stops the sequence early with that same error.
/// `Configuration` errors are returned at once.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let steps = policy.steps.max(1);
    let mut delay = policy.duration;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let err = match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(operation = %operation_name, attempt, "Operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) => e,
        };

        // Configuration errors fail the same way on every attempt
        if let FleetSyncError::Configuration(_) = err {
            warn!(operation = %operation_name, error = %err, "Operation failed, not retrying");
            return Err(err);
        }

        if attempt >= steps {
            warn!(
                operation = %operation_name,
                attempt,
                error = %err,
                "Operation failed, retry budget exhausted"
            );
            return Err(err);
        }

        let wait = policy.jittered(delay);
        debug!(
            operation = %operation_name,
            attempt,
            error = %err,
            delay_ms = wait.as_millis() as u64,
            "Operation failed, retrying"
        );

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(match err {
                    FleetSyncError::RegistryUnavailable(msg) => {
                        FleetSyncError::RegistryUnavailable(format!("{} (retry cancelled)", msg))
                    }
                    other => other,
                });
            }
            _ = tokio::time::sleep(wait) => {}
        }

        delay = delay.mul_f64(policy.factor);
    }
}
