//! Owned timer and listener tasks
//!
//! Every timer a component schedules is spawned through its `TimerSet` and
//! aborted when the set is released or dropped, whether or not the
//! component ever reached its terminal phase.

use parking_lot::Mutex;
use std::future::Future;
use tokio::runtime::Handle;
use tokio::task::{AbortHandle, JoinHandle};

#[derive(Debug, Default)]
struct Slots {
    handles: Vec<JoinHandle<()>>,
    released: bool,
}

/// Set of spawned tasks owned by one component instance
#[derive(Debug)]
pub struct TimerSet {
    runtime: Handle,
    slots: Mutex<Slots>,
}

impl TimerSet {
    /// Create a set bound to an explicit runtime
    #[inline]
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            slots: Mutex::new(Slots::default()),
        }
    }

    /// Create a set bound to the current runtime, if any
    #[inline]
    #[must_use]
    pub fn current() -> Option<Self> {
        Handle::try_current().ok().map(Self::new)
    }

    /// Spawn an owned task.
    ///
    /// Returns `false` without spawning once the set has been released.
    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.spawn_abortable(task).is_some()
    }

    /// Spawn an owned task that can also be cancelled on its own.
    ///
    /// Returns `None` without spawning once the set has been released.
    pub fn spawn_abortable<F>(&self, task: F) -> Option<AbortHandle>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut slots = self.slots.lock();
        if slots.released {
            return None;
        }
        slots.handles.retain(|h| !h.is_finished());
        let handle = self.runtime.spawn(task);
        let abort = handle.abort_handle();
        slots.handles.push(handle);
        Some(abort)
    }

    /// Abort every outstanding task and refuse new ones.
    ///
    /// Returns how many tasks were still running. Idempotent.
    pub fn release(&self) -> usize {
        let mut slots = self.slots.lock();
        slots.released = true;
        let mut aborted = 0;
        for handle in slots.handles.drain(..) {
            if !handle.is_finished() {
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }

    /// Number of tasks that have not completed yet
    #[must_use]
    pub fn active(&self) -> usize {
        self.slots
            .lock()
            .handles
            .iter()
            .filter(|h| !h.is_finished())
            .count()
    }

    /// Whether `release` has been called
    #[inline]
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.slots.lock().released
    }
}

impl Drop for TimerSet {
    fn drop(&mut self) {
        self.release();
    }
}
