//! Startup splash screen
//!
//! A readiness barrier over four gates. The screen stays up until fonts
//! are loaded, auth has resolved, the minimum display time has passed and
//! the logo has either loaded or failed, then plays its exit and hands off.

use crate::auth::AuthState;
use crate::error::Result;
use crate::resource::ResourceProbe;
use ivm_barrier::{BarrierConfig, BarrierController, PhaseState};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// Web fonts loaded
pub const GATE_FONTS: &str = "fonts";
/// Initial auth check completed
pub const GATE_AUTH: &str = "auth";
/// Minimum display time elapsed
pub const GATE_MIN_TIME: &str = "min_time";
/// Logo preloaded or failed
pub const GATE_LOGO: &str = "logo";

/// Every splash gate
pub const SPLASH_GATES: [&str; 4] = [GATE_FONTS, GATE_AUTH, GATE_MIN_TIME, GATE_LOGO];

/// Collaborators the splash screen waits on
#[derive(Clone)]
pub struct SplashResources {
    /// Font set
    pub fonts: Arc<dyn ResourceProbe>,
    /// Logo image
    pub logo: Arc<dyn ResourceProbe>,
    /// Auth state
    pub auth: AuthState,
}

/// Mounted splash screen
#[derive(Debug)]
pub struct SplashScreen {
    barrier: BarrierController,
}

impl SplashScreen {
    /// Mount the splash screen and start every gate listener.
    ///
    /// `on_complete` runs once, after the exit animation.
    ///
    /// # Errors
    /// - `AppError::Barrier` outside a tokio runtime
    pub fn mount<F>(config: BarrierConfig, resources: SplashResources, on_complete: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let barrier = BarrierController::configure_with(SPLASH_GATES, config)?;
        barrier.on_all_ready(on_complete)?;

        // a font face that fails to load falls back to a system font
        let fonts = resources.fonts;
        barrier.attach_optional(GATE_FONTS, async move { fonts.ready().await })?;

        let logo = resources.logo;
        barrier.attach_optional(GATE_LOGO, async move { logo.ready().await })?;

        let auth = resources.auth;
        barrier.attach(GATE_AUTH, async move {
            auth.wait_resolved().await;
        })?;

        let min = config.min_duration();
        barrier.attach(GATE_MIN_TIME, tokio::time::sleep(min))?;

        tracing::debug!(min_duration_ms = config.min_duration_ms, "splash mounted");
        Ok(Self { barrier })
    }

    /// Current phase
    #[inline]
    #[must_use]
    pub fn phase(&self) -> PhaseState {
        self.barrier.phase()
    }

    /// Whether the screen should still be drawn
    #[inline]
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !self.phase().is_terminal()
    }

    /// Watch phase changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<PhaseState> {
        self.barrier.subscribe()
    }

    /// Gates still waiting
    #[must_use]
    pub fn pending_gates(&self) -> Vec<String> {
        self.barrier.pending_gates()
    }

    /// Time since mount
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.barrier.elapsed()
    }

    /// Wait until the exit animation finished
    pub async fn finished(&self) {
        self.barrier.finished().await;
    }

    /// Unmount, cancelling every pending gate and timer
    pub fn unmount(self) {
        self.barrier.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::DelayedProbe;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn resources(fonts_ms: u64, logo: DelayedProbe, auth: AuthState) -> SplashResources {
        SplashResources {
            fonts: Arc::new(DelayedProbe::ready_after("fonts", Duration::from_millis(fonts_ms))),
            logo: Arc::new(logo),
            auth,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn already_resolved_auth_counts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let splash = SplashScreen::mount(
            BarrierConfig::new().with_exit_duration(Duration::ZERO),
            resources(
                10,
                DelayedProbe::ready_after("logo", Duration::from_millis(10)),
                AuthState::resolved_with(None),
            ),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap();

        splash.finished().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(splash.elapsed(), Duration::from_millis(2_500));
        assert!(!splash.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn pending_auth_holds_the_screen() {
        let auth = AuthState::new();
        let splash = SplashScreen::mount(
            BarrierConfig::new(),
            resources(0, DelayedProbe::ready_after("logo", Duration::ZERO), auth.clone()),
            || {},
        )
        .unwrap();

        tokio::time::sleep(Duration::from_millis(4_000)).await;
        assert_eq!(splash.pending_gates(), vec![GATE_AUTH.to_string()]);
        assert!(splash.is_visible());

        auth.resolve(None);
        splash.finished().await;
        assert_eq!(splash.elapsed(), Duration::from_millis(4_700));
    }
}
