// libs/room-provisioning-cell/src/services/retry.rs
use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::models::ProvisioningError;

/// Retry budget for provider calls that may race propagation delay.
///
/// Backoff is linear without jitter: attempt `n` waits `n * base_delay`
/// before the next attempt. Provisioning runs once per booking, not on a
/// hot path, so fixed iteration counts are sufficient.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Policy for tests and callers that cannot afford to sleep.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Try an ordered list of candidates until one succeeds.
///
/// `advance_on` decides whether a failure moves on to the next candidate or
/// aborts the sweep; the last observed error is returned when every
/// candidate is exhausted. Shared by the role-fallback sweep (always
/// advance) and the endpoint-fallback pair (advance only on 404).
pub async fn resolve_ordered<C, T, F, Fut, P>(
    label: &str,
    candidates: &[C],
    mut attempt: F,
    advance_on: P,
) -> Result<T, ProvisioningError>
where
    C: Clone + std::fmt::Debug,
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, ProvisioningError>>,
    P: Fn(&ProvisioningError) -> bool,
{
    let mut last_error = ProvisioningError::Provider {
        status: None,
        message: format!("No candidates available for {}", label),
    };

    for candidate in candidates {
        match attempt(candidate.clone()).await {
            Ok(value) => return Ok(value),
            Err(err) if advance_on(&err) => {
                debug!("{} candidate {:?} failed, trying next: {}", label, candidate, err);
                last_error = err;
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_error)
}
