//! Authentication state and sign-in error copy
//!
//! `AuthState` is the process-wide view of who is signed in. It starts
//! unresolved; the auth provider resolves it exactly once, after which
//! sign-in and sign-out only change the identity.

use ivm_history::Identity;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Fallback copy for unmapped auth failures
pub const GENERIC_AUTH_MESSAGE: &str = "Something went wrong. Try again.";

/// Fallback copy when a popup sign-in fails
pub const POPUP_FAILURE_MESSAGE: &str = "Google sign-in failed. Try again.";

/// Shown when sign-up is attempted without a name
pub const NAME_REQUIRED_MESSAGE: &str = "Please enter your name.";

/// Point-in-time auth state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSnapshot {
    /// Initial identity check completed
    pub resolved: bool,
    /// Signed-in user, `None` for guests
    pub identity: Option<Identity>,
}

/// Shared auth state
#[derive(Debug, Clone)]
pub struct AuthState {
    tx: Arc<watch::Sender<AuthSnapshot>>,
}

impl AuthState {
    /// Unresolved state
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(AuthSnapshot::default());
        Self { tx: Arc::new(tx) }
    }

    /// Already-resolved state
    #[must_use]
    pub fn resolved_with(identity: Option<Identity>) -> Self {
        let state = Self::new();
        state.resolve(identity);
        state
    }

    /// Complete the initial identity check.
    ///
    /// Returns `false`, changing nothing, if already resolved.
    pub fn resolve(&self, identity: Option<Identity>) -> bool {
        let resolved = self.tx.send_if_modified(|snap| {
            if snap.resolved {
                return false;
            }
            snap.resolved = true;
            snap.identity = identity;
            true
        });
        if resolved {
            tracing::info!(signed_in = self.is_signed_in(), "auth resolved");
        }
        resolved
    }

    /// Sign `identity` in. Also resolves a pending check.
    pub fn sign_in(&self, identity: Identity) {
        tracing::info!(uid = %identity.uid, "signed in");
        self.tx.send_modify(|snap| {
            snap.resolved = true;
            snap.identity = Some(identity);
        });
    }

    /// Sign the current user out
    pub fn sign_out(&self) {
        let changed = self.tx.send_if_modified(|snap| snap.identity.take().is_some());
        if changed {
            tracing::info!("signed out");
        }
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> AuthSnapshot {
        self.tx.borrow().clone()
    }

    /// Whether the initial check completed
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.tx.borrow().resolved
    }

    /// Whether a user is signed in
    #[inline]
    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.tx.borrow().identity.is_some()
    }

    /// Signed-in user
    #[must_use]
    pub fn current_identity(&self) -> Option<Identity> {
        self.tx.borrow().identity.clone()
    }

    /// Watch changes
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.tx.subscribe()
    }

    /// Wait for the initial check, returning immediately if it already
    /// completed
    pub async fn wait_resolved(&self) -> Option<Identity> {
        let mut rx = self.subscribe();
        let identity = match rx.wait_for(|snap| snap.resolved).await {
            Ok(snap) => snap.identity.clone(),
            // sender is owned by self
            Err(_) => None,
        };
        identity
    }
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

/// Sign-in method, for picking fallback copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignInMethod {
    /// Email and password form
    Email,
    /// Third-party popup
    Popup,
}

/// Auth provider failure codes with dedicated copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthErrorKind {
    /// Sign-up with an email that has an account
    EmailAlreadyInUse,
    /// Malformed email address
    InvalidEmail,
    /// Password below provider strength rules
    WeakPassword,
    /// Email and password do not match
    InvalidCredential,
    /// No account for this email
    UserNotFound,
    /// Wrong password for an existing account
    WrongPassword,
    /// User closed the popup; not an error worth showing
    PopupClosedByUser,
    /// Anything else
    Unknown,
}

impl AuthErrorKind {
    /// Classify a provider code. Accepts both `auth/<code>` and `<code>`.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.strip_prefix("auth/").unwrap_or(code) {
            "email-already-in-use" => Self::EmailAlreadyInUse,
            "invalid-email" => Self::InvalidEmail,
            "weak-password" => Self::WeakPassword,
            "invalid-credential" => Self::InvalidCredential,
            "user-not-found" => Self::UserNotFound,
            "wrong-password" => Self::WrongPassword,
            "popup-closed-by-user" => Self::PopupClosedByUser,
            _ => Self::Unknown,
        }
    }

    /// Copy for the email form, `None` when nothing should be shown
    #[must_use]
    pub fn user_message(self) -> Option<&'static str> {
        match self {
            Self::EmailAlreadyInUse => Some("Email already in use. Try signing in."),
            Self::InvalidEmail => Some("Invalid email address."),
            Self::WeakPassword => Some("Password must be at least 6 characters."),
            Self::InvalidCredential => Some("Invalid email or password."),
            Self::UserNotFound => Some("No account with that email."),
            Self::WrongPassword => Some("Incorrect password."),
            Self::PopupClosedByUser => None,
            Self::Unknown => Some(GENERIC_AUTH_MESSAGE),
        }
    }
}

/// Copy to show for a failed sign-in attempt, `None` to stay silent
#[must_use]
pub fn auth_error_message(method: SignInMethod, code: &str) -> Option<&'static str> {
    let kind = AuthErrorKind::from_code(code);
    match (method, kind) {
        (_, AuthErrorKind::PopupClosedByUser) => None,
        (SignInMethod::Popup, _) => Some(POPUP_FAILURE_MESSAGE),
        (SignInMethod::Email, kind) => kind.user_message(),
    }
}

/// Check a sign-up display name
///
/// # Errors
/// Returns the copy to show when the trimmed name is empty
pub fn check_display_name(name: &str) -> Result<&str, &'static str> {
    match name.trim() {
        "" => Err(NAME_REQUIRED_MESSAGE),
        trimmed => Ok(trimmed),
    }
}
