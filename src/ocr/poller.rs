//! Job polling
//!
//! Waits for a submitted job to reach a terminal state. Polling is bounded by
//! both a total deadline and an attempt count; dropping the returned future
//! abandons the job.

use std::time::Duration;

use tokio::time::{sleep, timeout_at, Instant};

use super::backend::OcrBackend;
use super::types::{JobHandle, JobStatus, OcrError};

/// Timing bounds for polling a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Wait before every status query
    pub interval: Duration,
    /// Maximum number of status queries
    pub max_attempts: u32,
    /// Maximum total time spent polling
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 60,
            max_wait: Duration::from_secs(120),
        }
    }
}

/// Poll `handle` until the job succeeds, fails, or a bound is hit.
///
/// Returns the backend result payload of a succeeded job.
pub async fn poll_until_complete(
    backend: &dyn OcrBackend,
    handle: &JobHandle,
    policy: &PollPolicy,
) -> Result<serde_json::Value, OcrError> {
    let deadline = Instant::now() + policy.max_wait;

    for attempt in 1..=policy.max_attempts {
        let status = timeout_at(deadline, async {
            sleep(policy.interval).await;
            backend.poll(handle).await
        })
        .await
        .map_err(|_| OcrError::PollTimeout(policy.max_wait))??;

        let state = match status {
            JobStatus::Running => "running",
            JobStatus::Succeeded(_) => "succeeded",
            JobStatus::Failed => "failed",
        };
        tracing::debug!(backend = backend.name(), attempt, state, "Polled OCR job");

        match status {
            JobStatus::Running => continue,
            JobStatus::Succeeded(payload) => return Ok(payload),
            JobStatus::Failed => return Err(OcrError::ProcessingFailed),
        }
    }

    Err(OcrError::PollAttemptsExhausted(policy.max_attempts))
}
