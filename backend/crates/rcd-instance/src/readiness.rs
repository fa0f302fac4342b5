use crate::{InstanceError, InstanceResult};

use rcd_config::ReadinessConfig;

use std::future::Future;
use std::panic::Location;
use std::time::{Duration, Instant};

use error_location::ErrorLocation;
use log::{debug, info};
use tokio_util::sync::CancellationToken;

/// Polls a predicate until it holds.
///
/// A wait never times out on its own: the caller's cancellation token is
/// the escape hatch, or [`ReadinessPoller::wait_for_within`] adds a deadline.
/// A predicate error ends the wait and is returned as is.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessPoller {
    interval: Duration,
    progress_every: u32,
}

impl ReadinessPoller {
    pub fn new(interval: Duration, progress_every: u32) -> Self {
        Self {
            interval,
            progress_every,
        }
    }

    pub fn from_config(config: &ReadinessConfig) -> Self {
        Self::new(
            Duration::from_millis(config.poll_interval_ms),
            config.progress_every,
        )
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait until `predicate` returns true. Returns the number of attempts.
    pub async fn wait_for<F, Fut>(
        &self,
        description: &str,
        cancel: &CancellationToken,
        mut predicate: F,
    ) -> InstanceResult<u64>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = InstanceResult<bool>>,
    {
        let started = Instant::now();
        let mut attempts: u64 = 0;

        loop {
            attempts += 1;

            let ready = tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled(description)),
                ready = predicate() => ready?,
            };

            if ready {
                debug!(
                    "Done waiting for {description} after {attempts} attempt(s), {:?}",
                    started.elapsed()
                );
                return Ok(attempts);
            }

            if self.progress_every > 0 && attempts % u64::from(self.progress_every) == 0 {
                info!(
                    "Still waiting for {description} ({attempts} attempts, {}s)",
                    started.elapsed().as_secs()
                );
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(cancelled(description)),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    /// [`ReadinessPoller::wait_for`] raced against a deadline.
    pub async fn wait_for_within<F, Fut>(
        &self,
        description: &str,
        deadline: Duration,
        cancel: &CancellationToken,
        predicate: F,
    ) -> InstanceResult<u64>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = InstanceResult<bool>>,
    {
        match tokio::time::timeout(deadline, self.wait_for(description, cancel, predicate)).await {
            Ok(result) => result,
            Err(_) => Err(InstanceError::ReadinessTimeout {
                description: description.to_string(),
                waited: deadline,
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

#[track_caller]
fn cancelled(description: &str) -> InstanceError {
    InstanceError::Cancelled {
        description: description.to_string(),
        location: ErrorLocation::from(Location::caller()),
    }
}
