//! Engine status polling
//!
//! Lifecycle commands return before the engine has actually changed state.
//! [`Client::wait_engine_status`] turns that into a wait: it re-describes the
//! engine at a fixed interval until the reported status equals the target or
//! the attempt budget runs out.
//!
//! The only decision made is equality against the target. A status that
//! looks like a failure is retried exactly like one that is merely slow.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::client::Client;
use crate::engine::{Engine, EngineStatus};
use crate::error::{FireboltError, Result};

/// Total status observations before giving up, the first one included
pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;

/// Fixed delay between two status observations
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Attempt budget and interval for status polling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total observations, including the first. Values below 1 act as 1.
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Source of the delay between observations.
///
/// Swapped out in tests so a full budget runs without wall-clock waits.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Progress events emitted while waiting on an engine
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// A fresh descriptor was fetched
    Observed {
        engine_id: String,
        attempt: u32,
        status: EngineStatus,
    },
    /// The status did not match; sleeping before the next observation
    Waiting {
        engine_id: String,
        attempt: u32,
        interval: Duration,
    },
    /// The engine reached the desired status
    Reached { engine_id: String, attempts: u32 },
    /// The attempt budget ran out
    Exhausted {
        engine_id: String,
        attempts: u32,
        status: EngineStatus,
    },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

impl Client {
    /// Wait until an engine reports `desired`.
    ///
    /// Returns the first descriptor whose status equals `desired`. If the very
    /// first observation already matches, no sleep happens at all.
    ///
    /// # Errors
    ///
    /// - [`FireboltError::EngineWrongStatus`] with the last descriptor once
    ///   the attempt budget is used up
    /// - any error from the underlying describe call, immediately
    pub async fn wait_engine_status(&self, engine_id: &str, desired: &EngineStatus) -> Result<Engine> {
        self.wait_engine_status_with_progress(engine_id, desired, None)
            .await
    }

    /// [`Client::wait_engine_status`] with an optional progress callback
    pub async fn wait_engine_status_with_progress(
        &self,
        engine_id: &str,
        desired: &EngineStatus,
        on_progress: Option<ProgressCallback>,
    ) -> Result<Engine> {
        let policy = self.poll_policy();
        let max_attempts = policy.max_attempts.max(1);

        let mut attempt = 1;
        let mut engine = self.describe_engine(engine_id).await?;

        loop {
            emit(
                &on_progress,
                ProgressEvent::Observed {
                    engine_id: engine_id.to_string(),
                    attempt,
                    status: engine.current_status.clone(),
                },
            );

            if engine.current_status == *desired {
                debug!(
                    "Engine {} reached {} after {} observation(s)",
                    engine_id, desired, attempt
                );
                emit(
                    &on_progress,
                    ProgressEvent::Reached {
                        engine_id: engine_id.to_string(),
                        attempts: attempt,
                    },
                );
                return Ok(engine);
            }

            if attempt >= max_attempts {
                break;
            }

            debug!(
                "Engine {} is {} (attempt {}/{}), waiting {:?}",
                engine_id, engine.current_status, attempt, max_attempts, policy.interval
            );
            emit(
                &on_progress,
                ProgressEvent::Waiting {
                    engine_id: engine_id.to_string(),
                    attempt,
                    interval: policy.interval,
                },
            );

            self.sleeper().sleep(policy.interval).await;
            engine = self.describe_engine(engine_id).await?;
            attempt += 1;
        }

        warn!(
            "Engine {} still {} after {} observations, wanted {}",
            engine_id, engine.current_status, attempt, desired
        );
        emit(
            &on_progress,
            ProgressEvent::Exhausted {
                engine_id: engine_id.to_string(),
                attempts: attempt,
                status: engine.current_status.clone(),
            },
        );

        Err(FireboltError::EngineWrongStatus {
            engine: Box::new(engine),
            desired_status: desired.clone(),
        })
    }
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_default_policy_matches_documented_budget() {
        let policy = PollPolicy::default();
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.interval, Duration::from_secs(60));
    }

    #[test]
    fn test_emit_without_callback_is_a_no_op() {
        emit(
            &None,
            ProgressEvent::Reached {
                engine_id: "e1".to_string(),
                attempts: 1,
            },
        );
    }

    #[test]
    fn test_emit_forwards_events() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: Option<ProgressCallback> = Some(Box::new(move |event: ProgressEvent| {
            if let ProgressEvent::Waiting { attempt, .. } = event {
                sink.lock().unwrap().push(attempt);
            }
        }));

        for attempt in 1..=3 {
            emit(
                &callback,
                ProgressEvent::Waiting {
                    engine_id: "e1".to_string(),
                    attempt,
                    interval: Duration::from_secs(60),
                },
            );
        }

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_sleeper_waits_for_interval() {
        let start = tokio::time::Instant::now();
        TokioSleeper.sleep(Duration::from_secs(60)).await;
        assert!(start.elapsed() >= Duration::from_secs(60));
    }
}
