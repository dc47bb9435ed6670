//! Landing page state
//!
//! Shows local history immediately, swaps in the signed-in user's history
//! once auth resolves, and nudges guests towards signing in with a prompt
//! that opens on a delay.

use crate::auth::AuthState;
use crate::config::AppConfig;
use crate::error::Result;
use ivm_barrier::{BarrierError, TimerSet};
use ivm_history::{HistoryRouter, Identity, SessionRecord};
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::AbortHandle;

/// Flags that live for one browsing session, shared across page mounts
#[derive(Debug, Clone, Default)]
pub struct SessionFlags {
    auth_dismissed: Arc<AtomicBool>,
}

impl SessionFlags {
    /// Fresh session
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The user closed the auth prompt this session
    #[inline]
    #[must_use]
    pub fn auth_dismissed(&self) -> bool {
        self.auth_dismissed.load(Ordering::Acquire)
    }

    fn dismiss_auth(&self) {
        self.auth_dismissed.store(true, Ordering::Release);
    }
}

struct Inner {
    router: Arc<HistoryRouter>,
    auth: AuthState,
    session: SessionFlags,
    history: watch::Sender<Vec<SessionRecord>>,
    prompt_open: watch::Sender<bool>,
    auto_shown: AtomicBool,
    prompt_timer: Mutex<Option<AbortHandle>>,
    prompt_delay: Duration,
    timers: TimerSet,
}

impl Inner {
    async fn reload(&self, identity: Option<&Identity>) {
        let records = self.router.load(identity).await;
        tracing::debug!(
            count = records.len(),
            signed_in = identity.is_some(),
            "history reloaded"
        );
        self.history.send_replace(records);
    }

    fn schedule_prompt(self: &Arc<Self>) {
        if self.auth.is_signed_in()
            || self.auto_shown.load(Ordering::Acquire)
            || self.session.auth_dismissed()
        {
            return;
        }

        let mut slot = self.prompt_timer.lock();
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return;
        }
        let weak: Weak<Self> = Arc::downgrade(self);
        let delay = self.prompt_delay;
        *slot = self.timers.spawn_abortable(async move {
            tokio::time::sleep(delay).await;
            if let Some(inner) = weak.upgrade() {
                inner.auto_open_prompt();
            }
        });
        tracing::debug!(delay_ms = delay.as_millis(), "auth prompt scheduled");
    }

    fn cancel_prompt_timer(&self) {
        if let Some(handle) = self.prompt_timer.lock().take() {
            if !handle.is_finished() {
                handle.abort();
                tracing::debug!("auth prompt timer cancelled");
            }
        }
    }

    fn auto_open_prompt(&self) {
        if self.auth.is_signed_in() || self.session.auth_dismissed() {
            return;
        }
        if self.auto_shown.swap(true, Ordering::AcqRel) {
            return;
        }
        tracing::info!("auth prompt opened");
        self.prompt_open.send_replace(true);
    }
}

/// Mounted landing page
pub struct LandingPage {
    inner: Arc<Inner>,
}

impl LandingPage {
    /// Mount with the prompt delay from `config`
    ///
    /// # Errors
    /// - `AppError::Barrier` outside a tokio runtime
    pub fn from_config(
        config: &AppConfig,
        router: Arc<HistoryRouter>,
        auth: AuthState,
        session: SessionFlags,
    ) -> Result<Self> {
        Self::mount(router, auth, session, config.auth_prompt_delay())
    }

    /// Mount the page.
    ///
    /// History starts as the local records and is reloaded for the resolved
    /// identity as soon as auth resolves, then again on every sign-in or
    /// sign-out.
    ///
    /// # Errors
    /// - `AppError::Barrier` outside a tokio runtime
    pub fn mount(
        router: Arc<HistoryRouter>,
        auth: AuthState,
        session: SessionFlags,
        prompt_delay: Duration,
    ) -> Result<Self> {
        let timers = TimerSet::current().ok_or(BarrierError::NoRuntime)?;
        let (history, _) = watch::channel(router.load_local());
        let (prompt_open, _) = watch::channel(false);
        let mut rx = auth.subscribe();

        let inner = Arc::new(Inner {
            router,
            auth,
            session,
            history,
            prompt_open,
            auto_shown: AtomicBool::new(false),
            prompt_timer: Mutex::new(None),
            prompt_delay,
            timers,
        });

        let weak = Arc::downgrade(&inner);
        inner.timers.spawn(async move {
            loop {
                let identity = match rx.wait_for(|snap| snap.resolved).await {
                    Ok(snap) => snap.identity.clone(),
                    Err(_) => return,
                };
                let Some(inner) = weak.upgrade() else { return };
                if identity.is_some() {
                    inner.cancel_prompt_timer();
                } else {
                    inner.schedule_prompt();
                }
                inner.reload(identity.as_ref()).await;
                drop(inner);

                if rx.changed().await.is_err() {
                    return;
                }
            }
        });

        Ok(Self { inner })
    }

    /// History currently shown
    #[must_use]
    pub fn history(&self) -> Vec<SessionRecord> {
        self.inner.history.borrow().clone()
    }

    /// Watch history
    #[must_use]
    pub fn subscribe_history(&self) -> watch::Receiver<Vec<SessionRecord>> {
        self.inner.history.subscribe()
    }

    /// Whether the auth prompt is open
    #[inline]
    #[must_use]
    pub fn auth_prompt_open(&self) -> bool {
        *self.inner.prompt_open.borrow()
    }

    /// Watch the auth prompt
    #[must_use]
    pub fn subscribe_auth_prompt(&self) -> watch::Receiver<bool> {
        self.inner.prompt_open.subscribe()
    }

    /// Open the auth prompt on request
    pub fn open_auth_prompt(&self) {
        self.inner.prompt_open.send_replace(true);
    }

    /// Close the auth prompt. It will not auto-open again this session.
    pub fn dismiss_auth_prompt(&self) {
        self.inner.session.dismiss_auth();
        self.inner.cancel_prompt_timer();
        self.inner.prompt_open.send_replace(false);
    }

    /// Save a finished session for the current user and refresh history
    pub async fn record_session(&self, record: SessionRecord) {
        let identity = self.inner.auth.current_identity();
        self.inner.router.save(identity.as_ref(), record).await;
        self.inner.reload(identity.as_ref()).await;
    }

    /// Unmount, cancelling the prompt timer and the auth watcher
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for LandingPage {
    fn drop(&mut self) {
        let aborted = self.inner.timers.release();
        tracing::debug!(aborted, "landing page unmounted");
    }
}

impl fmt::Debug for LandingPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LandingPage")
            .field("history", &self.inner.history.borrow().len())
            .field("auth_prompt_open", &self.auth_prompt_open())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ivm_history::{InMemoryRemoteStore, MemoryStore, DEFAULT_CAPACITY};

    fn router() -> Arc<HistoryRouter> {
        Arc::new(HistoryRouter::new(
            MemoryStore::new(),
            Arc::new(InMemoryRemoteStore::new()),
            DEFAULT_CAPACITY,
        ))
    }

    const DELAY: Duration = Duration::from_millis(2_000);

    #[tokio::test(start_paused = true)]
    async fn guest_prompt_opens_after_delay() {
        let auth = AuthState::new();
        let page = LandingPage::mount(router(), auth.clone(), SessionFlags::new(), DELAY).unwrap();

        tokio::time::sleep(Duration::from_millis(500)).await;
        auth.resolve(None);

        tokio::time::sleep(Duration::from_millis(1_999)).await;
        assert!(!page.auth_prompt_open());
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(page.auth_prompt_open());
    }

    #[tokio::test(start_paused = true)]
    async fn dismissed_session_never_prompts() {
        let session = SessionFlags::new();
        let auth = AuthState::resolved_with(None);

        let page = LandingPage::mount(router(), auth.clone(), session.clone(), DELAY).unwrap();
        page.open_auth_prompt();
        page.dismiss_auth_prompt();
        assert!(session.auth_dismissed());
        page.unmount();

        let page = LandingPage::mount(router(), auth, session, DELAY).unwrap();
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert!(!page.auth_prompt_open());
    }

    #[tokio::test(start_paused = true)]
    async fn unmount_cancels_prompt_timer() {
        let auth = AuthState::resolved_with(None);
        let page = LandingPage::mount(router(), auth, SessionFlags::new(), DELAY).unwrap();
        let prompt = page.subscribe_auth_prompt();
        tokio::time::sleep(Duration::from_millis(100)).await;

        page.unmount();
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert!(!*prompt.borrow());
    }
}
