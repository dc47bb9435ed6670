//! Progress-simulated task runner
//!
//! Wraps one real asynchronous operation with a synthetic progress
//! indicator and a minimum perceived duration:
//! - validation failure: the operation never starts, `None` is returned
//! - success: ticker stopped, remaining floor waited out, progress set to
//!   100 and held briefly, then the result is returned
//! - failure: ticker stopped, progress reset to 0, the error code mapped to
//!   user-facing copy, `None` is returned
//!
//! One run at a time per runner. A run requested while another is in
//! flight is rejected: it returns `None` at once and leaves the in-flight
//! run's state untouched.

use crate::config::RunnerConfig;
use crate::error::{OperationError, ValidationError};
use crate::progress::ProgressTicker;
use crate::task::{GenerationTask, TaskStatus};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Runs generation requests one at a time with synthetic progress
#[derive(Debug)]
pub struct TaskRunner {
    config: RunnerConfig,
    state: Arc<watch::Sender<GenerationTask>>,
    active: AtomicBool,
    next_run: AtomicU64,
    rng: Mutex<StdRng>,
}

/// Clears the in-flight flag; resets state if the run was abandoned midway
struct RunGuard<'a> {
    runner: &'a TaskRunner,
    run: u64,
    settled: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            let run = self.run;
            let reset = self.runner.state.send_if_modified(|task| {
                if task.run == run && task.is_running() {
                    task.status = TaskStatus::Idle;
                    task.progress = 0.0;
                    true
                } else {
                    false
                }
            });
            if reset {
                tracing::debug!(run, "generation abandoned before settling");
            }
        }
        self.runner.active.store(false, Ordering::Release);
    }
}

impl TaskRunner {
    /// Create a runner
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let (state, _) = watch::channel(GenerationTask::default());
        Self {
            config,
            state: Arc::new(state),
            active: AtomicBool::new(false),
            next_run: AtomicU64::new(1),
            rng: Mutex::new(rng),
        }
    }

    /// Run `operation` with no precondition.
    pub async fn run<F, Fut, T>(&self, operation: F, min_duration: Duration) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, OperationError>>,
    {
        self.run_validated(Ok(()), operation, min_duration).await
    }

    /// Run `operation` if `validation` passed.
    ///
    /// A failed validation is published as a `Failed` snapshot carrying the
    /// validation copy; the operation is never invoked.
    pub async fn run_validated<F, Fut, T>(
        &self,
        validation: Result<(), ValidationError>,
        operation: F,
        min_duration: Duration,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, OperationError>>,
    {
        if self
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("generation already in flight, rejecting new run");
            return None;
        }

        let run = self.next_run.fetch_add(1, Ordering::Relaxed);
        let mut guard = RunGuard {
            runner: self,
            run,
            settled: false,
        };

        if let Err(err) = validation {
            tracing::debug!(run, error = %err, "setup validation failed");
            self.publish(GenerationTask {
                run,
                status: TaskStatus::Failed,
                progress: 0.0,
                error: Some(err.to_string()),
            });
            guard.settled = true;
            return None;
        }

        self.publish(GenerationTask {
            run,
            status: TaskStatus::Running,
            progress: 0.0,
            error: None,
        });
        tracing::info!(run, min_duration_ms = min_duration.as_millis(), "generation started");

        let started = Instant::now();
        let ticker = ProgressTicker::start(
            Arc::clone(&self.state),
            run,
            &self.config,
            self.ticker_rng(),
        );
        let outcome = operation().await;
        ticker.cancel();

        match outcome {
            Ok(value) => {
                let remaining = min_duration.saturating_sub(started.elapsed());
                if !remaining.is_zero() {
                    tokio::time::sleep(remaining).await;
                }
                self.state.send_modify(|task| task.progress = 100.0);
                tokio::time::sleep(self.config.success_hold()).await;
                self.state.send_modify(|task| task.status = TaskStatus::Succeeded);
                guard.settled = true;

                tracing::info!(
                    run,
                    elapsed_ms = started.elapsed().as_millis(),
                    "generation succeeded"
                );
                Some(value)
            }
            Err(err) => {
                let kind = err.kind();
                tracing::warn!(run, code = %err.code, %kind, detail = %err.detail, "generation failed");
                self.publish(GenerationTask {
                    run,
                    status: TaskStatus::Failed,
                    progress: 0.0,
                    error: Some(kind.user_message().to_string()),
                });
                guard.settled = true;
                None
            }
        }
    }

    /// Current snapshot
    #[must_use]
    pub fn snapshot(&self) -> GenerationTask {
        self.state.borrow().clone()
    }

    /// Watch snapshots
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GenerationTask> {
        self.state.subscribe()
    }

    /// Whether a run is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Runner configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Drop a stale error once the user edits the form. No-op while busy.
    pub fn clear_error(&self) {
        if self.is_busy() {
            return;
        }
        self.state.send_if_modified(|task| {
            if task.status == TaskStatus::Failed {
                task.status = TaskStatus::Idle;
                task.error = None;
                true
            } else {
                false
            }
        });
    }

    fn publish(&self, task: GenerationTask) {
        self.state.send_replace(task);
    }

    fn ticker_rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.rng.lock().random())
    }
}

impl Default for TaskRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GENERIC_FAILURE_MESSAGE;

    fn runner() -> TaskRunner {
        TaskRunner::new(RunnerConfig::new().with_seed(42))
    }

    #[tokio::test(start_paused = true)]
    async fn failure_maps_code_and_resets() {
        let runner = runner();
        let result: Option<()> = runner
            .run(
                || async { Err(OperationError::new("unavailable", "503")) },
                Duration::from_secs(5),
            )
            .await;

        assert!(result.is_none());
        let task = runner.snapshot();
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.progress.abs() < f64::EPSILON);
        assert_ne!(task.error.as_deref(), Some(GENERIC_FAILURE_MESSAGE));
        assert!(!runner.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_error_returns_to_idle() {
        let runner = runner();
        let _: Option<()> = runner
            .run(
                || async { Err(OperationError::new("x", "y")) },
                Duration::ZERO,
            )
            .await;
        runner.clear_error();
        let task = runner.snapshot();
        assert_eq!(task.status, TaskStatus::Idle);
        assert!(task.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_run_resets_state() {
        let runner = runner();
        {
            let fut = runner.run(
                || async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, OperationError>(())
                },
                Duration::from_secs(5),
            );
            let _ = tokio::time::timeout(Duration::from_secs(1), fut).await;
        }

        assert!(!runner.is_busy());
        let task = runner.snapshot();
        assert_eq!(task.status, TaskStatus::Idle);
        assert!(task.progress.abs() < f64::EPSILON);
    }
}
