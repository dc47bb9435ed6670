//! Synthetic progress ticker
//!
//! Cosmetic only: advances the published progress by a small random step
//! every tick, never past the ceiling, and has no influence on the real
//! operation. Stopped the moment the operation settles.

use crate::config::RunnerConfig;
use crate::task::GenerationTask;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// One synthetic step: `current + delta`, capped at `ceiling`.
///
/// Values already at or above the ceiling are returned unchanged, so the
/// result is never below `current`.
#[inline]
#[must_use]
pub fn advance(current: f64, delta: f64, ceiling: f64) -> f64 {
    if current >= ceiling {
        current
    } else {
        (current + delta.max(0.0)).min(ceiling)
    }
}

/// Draw a step size in `[min, max)`, or `min` when the range is empty or
/// not finite. A non-finite `min` draws `0.0`.
pub fn draw_step<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    if !min.is_finite() {
        return 0.0;
    }
    if max > min && (max - min).is_finite() {
        rng.random_range(min..max)
    } else {
        min
    }
}

/// Running ticker. Dropping it stops further increments.
#[derive(Debug)]
pub struct ProgressTicker {
    handle: JoinHandle<()>,
    stopped: Arc<AtomicBool>,
}

impl ProgressTicker {
    /// Start ticking progress for run `run`.
    ///
    /// Must be called inside a tokio runtime.
    #[must_use]
    pub fn start(
        state: Arc<watch::Sender<GenerationTask>>,
        run: u64,
        config: &RunnerConfig,
        mut rng: StdRng,
    ) -> Self {
        let stopped = Arc::new(AtomicBool::new(false));
        let period = config.tick_interval();
        let (min_step, max_step) = config.step_range();
        let ceiling = config.effective_ceiling();

        let flag = Arc::clone(&stopped);
        let handle = tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                let delta = draw_step(&mut rng, min_step, max_step);
                let mut capped = false;
                state.send_if_modified(|task| {
                    // checked under the channel lock so no step lands after stop
                    if flag.load(Ordering::Acquire) || task.run != run || !task.is_running() {
                        return false;
                    }
                    let next = advance(task.progress, delta, ceiling);
                    capped = next >= ceiling;
                    if next > task.progress {
                        task.progress = next;
                        true
                    } else {
                        false
                    }
                });
                if flag.load(Ordering::Acquire) {
                    break;
                }
                if capped {
                    tracing::trace!(run, ceiling, "synthetic progress at ceiling");
                }
            }
        });

        Self { handle, stopped }
    }

    /// Stop ticking
    pub fn cancel(self) {
        drop(self);
    }

    /// Whether the ticker has been stopped
    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::Release);
        self.handle.abort();
    }
}
