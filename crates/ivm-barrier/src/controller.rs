//! Readiness barrier controller
//!
//! Gates a one-time phase transition on a fixed set of independent gates
//! plus a duration floor:
//! - `satisfy` marks a gate and re-evaluates the barrier
//! - the first evaluation that passes sets the one-shot latch and enters
//!   `Exiting`
//! - after the exit animation the phase becomes `Finished` and the
//!   completion callback runs exactly once
//!
//! Gate sources may resolve in any order and may notify more than once.

use crate::config::BarrierConfig;
use crate::error::BarrierError;
use crate::gate::ReadinessSet;
use crate::latch::OneShotLatch;
use crate::optional::always_ready;
use crate::phase::{validate_transition, PhaseState};
use crate::timers::TimerSet;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

type Callback = Box<dyn FnOnce() + Send + 'static>;

enum CallbackSlot {
    Empty,
    Registered(Callback),
    Invoked,
}

struct Shared {
    gates: Mutex<ReadinessSet>,
    phase: watch::Sender<PhaseState>,
    latch: OneShotLatch,
    callback: Mutex<CallbackSlot>,
    timers: TimerSet,
    started_at: Instant,
    config: BarrierConfig,
}

impl Shared {
    fn evaluate(&self) -> bool {
        self.gates.lock().all_satisfied() && self.started_at.elapsed() >= self.config.min_duration()
    }

    fn phase(&self) -> PhaseState {
        *self.phase.borrow()
    }

    fn advance(&self, to: PhaseState) -> bool {
        let mut from = None;
        let moved = self.phase.send_if_modified(|current| {
            if validate_transition(*current, to).is_ok() {
                from = Some(*current);
                *current = to;
                true
            } else {
                false
            }
        });
        if let Some(from) = from {
            tracing::info!(%from, %to, elapsed_ms = self.elapsed_ms(), "phase transition");
        }
        moved
    }

    fn satisfy(self: &Arc<Self>, gate: &str) -> Result<(), BarrierError> {
        let newly = {
            let mut gates = self.gates.lock();
            if !gates.contains(gate) {
                return Err(BarrierError::invalid_gate(gate));
            }
            if self.timers.is_released() || self.phase().is_terminal() {
                return Ok(());
            }
            gates.mark(gate)?
        };

        if newly {
            tracing::debug!(gate, pending = ?self.gates.lock().pending(), "gate satisfied");
        }
        self.try_trigger();
        Ok(())
    }

    fn try_trigger(self: &Arc<Self>) {
        if self.timers.is_released() || !self.evaluate() {
            return;
        }
        if !self.latch.try_fire() {
            return;
        }

        tracing::info!(elapsed_ms = self.elapsed_ms(), "readiness barrier satisfied");
        self.advance(PhaseState::Exiting);

        let weak = Arc::downgrade(self);
        let exit = self.config.exit_duration();
        self.timers.spawn(async move {
            tokio::time::sleep(exit).await;
            if let Some(shared) = weak.upgrade() {
                shared.finish();
            }
        });
    }

    fn finish(&self) {
        if !self.advance(PhaseState::Finished) {
            return;
        }
        let callback = {
            let mut slot = self.callback.lock();
            if matches!(*slot, CallbackSlot::Registered(_)) {
                match std::mem::replace(&mut *slot, CallbackSlot::Invoked) {
                    CallbackSlot::Registered(cb) => Some(cb),
                    _ => None,
                }
            } else {
                None
            }
        };
        if let Some(cb) = callback {
            cb();
        }
    }

    fn register(&self, cb: Callback) -> Result<(), BarrierError> {
        let run_now = {
            let mut slot = self.callback.lock();
            if !matches!(*slot, CallbackSlot::Empty) {
                return Err(BarrierError::CallbackAlreadyRegistered);
            }
            if self.phase().is_terminal() {
                *slot = CallbackSlot::Invoked;
                Some(cb)
            } else {
                *slot = CallbackSlot::Registered(cb);
                None
            }
        };
        if let Some(cb) = run_now {
            cb();
        }
        Ok(())
    }

    fn elapsed_ms(&self) -> u128 {
        self.started_at.elapsed().as_millis()
    }
}

/// Owner of one readiness barrier.
///
/// Dropping the controller releases every timer and gate listener it
/// spawned; a barrier that has not finished by then never fires.
pub struct BarrierController {
    shared: Arc<Shared>,
}

impl BarrierController {
    /// Configure a barrier with default exit and entrance timing.
    ///
    /// # Errors
    /// - `BarrierError::NoRuntime` outside a tokio runtime
    pub fn configure<I, S>(gates: I, min_duration: Duration) -> Result<Self, BarrierError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::configure_with(gates, BarrierConfig::new().with_min_duration(min_duration))
    }

    /// Configure a barrier with explicit timing.
    ///
    /// Records the construction instant, starts the entrance timer and
    /// schedules a re-evaluation at the duration floor so that a barrier
    /// whose gates all resolved early still fires.
    ///
    /// # Errors
    /// - `BarrierError::NoRuntime` outside a tokio runtime
    pub fn configure_with<I, S>(gates: I, config: BarrierConfig) -> Result<Self, BarrierError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let timers = TimerSet::current().ok_or(BarrierError::NoRuntime)?;
        let gates = ReadinessSet::new(gates);
        let (phase, _) = watch::channel(PhaseState::Entering);

        tracing::debug!(
            gates = gates.len(),
            min_duration_ms = config.min_duration_ms,
            "barrier configured"
        );

        let shared = Arc::new(Shared {
            gates: Mutex::new(gates),
            phase,
            latch: OneShotLatch::new(),
            callback: Mutex::new(CallbackSlot::Empty),
            timers,
            started_at: Instant::now(),
            config,
        });

        let weak = Arc::downgrade(&shared);
        let settle = config.settle_delay();
        shared.timers.spawn(async move {
            tokio::time::sleep(settle).await;
            if let Some(shared) = weak.upgrade() {
                shared.advance(PhaseState::Settled);
            }
        });

        let weak = Arc::downgrade(&shared);
        let floor = shared.started_at + config.min_duration();
        shared.timers.spawn(async move {
            tokio::time::sleep_until(floor).await;
            if let Some(shared) = weak.upgrade() {
                shared.try_trigger();
            }
        });

        Ok(Self { shared })
    }

    /// Mark a gate satisfied and re-evaluate.
    ///
    /// Idempotent. A no-op once the barrier has finished.
    ///
    /// # Errors
    /// - `BarrierError::InvalidGate` if `gate` was not configured
    pub fn satisfy(&self, gate: &str) -> Result<(), BarrierError> {
        self.shared.satisfy(gate)
    }

    /// All gates satisfied and the duration floor elapsed. No side effects.
    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.shared.evaluate()
    }

    /// Register the completion callback.
    ///
    /// Runs once, when the phase reaches `Finished`. Registering after the
    /// barrier already finished runs it immediately.
    ///
    /// # Errors
    /// - `BarrierError::CallbackAlreadyRegistered` on a second registration
    pub fn on_all_ready<F>(&self, callback: F) -> Result<(), BarrierError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.register(Box::new(callback))
    }

    /// Satisfy `gate` when `source` completes.
    ///
    /// The listener is owned by this controller and aborted on drop.
    ///
    /// # Errors
    /// - `BarrierError::InvalidGate` if `gate` was not configured
    pub fn attach<F>(&self, gate: impl Into<String>, source: F) -> Result<(), BarrierError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let gate = gate.into();
        if !self.shared.gates.lock().contains(&gate) {
            return Err(BarrierError::InvalidGate(gate));
        }

        let weak = Arc::downgrade(&self.shared);
        self.shared.timers.spawn(async move {
            source.await;
            if let Some(shared) = weak.upgrade() {
                // name checked above
                let _ = shared.satisfy(&gate);
            }
        });
        Ok(())
    }

    /// Satisfy `gate` when `source` settles, whether it succeeds or fails.
    ///
    /// For nice-to-have resources; a failure is logged and counts as ready.
    ///
    /// # Errors
    /// - `BarrierError::InvalidGate` if `gate` was not configured
    pub fn attach_optional<F, T, E>(
        &self,
        gate: impl Into<String>,
        source: F,
    ) -> Result<(), BarrierError>
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        let gate = gate.into();
        let source = always_ready(gate.clone(), source);
        self.attach(gate, source)
    }

    /// Weak handle for gate producers
    #[must_use]
    pub fn notifier(&self) -> BarrierNotifier {
        BarrierNotifier {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> PhaseState {
        self.shared.phase()
    }

    /// Watch phase changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PhaseState> {
        self.shared.phase.subscribe()
    }

    /// Wait until the phase reaches `Finished`
    pub async fn finished(&self) {
        let mut rx = self.subscribe();
        // the sender lives as long as `self`
        let _ = rx.wait_for(|p| p.is_terminal()).await;
    }

    /// Whether the one-shot latch has been set
    #[inline]
    #[must_use]
    pub fn has_fired(&self) -> bool {
        self.shared.latch.is_fired()
    }

    /// Gates still waiting
    #[must_use]
    pub fn pending_gates(&self) -> Vec<String> {
        self.shared.gates.lock().pending()
    }

    /// Time since construction
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.shared.started_at.elapsed()
    }

    /// Owned timers and listeners still running
    #[must_use]
    pub fn active_timers(&self) -> usize {
        self.shared.timers.active()
    }

    /// Tear the barrier down, releasing every owned timer
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for BarrierController {
    fn drop(&mut self) {
        let aborted = self.shared.timers.release();
        let phase = self.shared.phase();
        if !phase.is_terminal() {
            tracing::debug!(%phase, aborted, "barrier torn down before finishing");
        }
    }
}

impl fmt::Debug for BarrierController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarrierController")
            .field("phase", &self.phase())
            .field("pending", &self.pending_gates())
            .field("fired", &self.has_fired())
            .finish()
    }
}

/// Cheap, cloneable handle gate producers use to report readiness.
///
/// Does not keep the barrier alive; once the controller is dropped every
/// call is a no-op.
#[derive(Clone)]
pub struct BarrierNotifier {
    shared: Weak<Shared>,
}

impl BarrierNotifier {
    /// Mark a gate satisfied.
    ///
    /// # Errors
    /// - `BarrierError::InvalidGate` if `gate` was not configured
    pub fn satisfy(&self, gate: &str) -> Result<(), BarrierError> {
        match self.shared.upgrade() {
            Some(shared) => shared.satisfy(gate),
            None => Ok(()),
        }
    }

    /// Whether the controller is still alive
    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.shared.strong_count() > 0
    }
}

impl fmt::Debug for BarrierNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BarrierNotifier")
            .field("attached", &self.is_attached())
            .finish()
    }
}
