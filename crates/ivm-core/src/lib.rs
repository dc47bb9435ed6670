//! InterviewMe screens
//!
//! Wires the readiness barrier, the generation runner and the history
//! router into the three stateful screens of the product:
//! - `SplashScreen`: holds startup until fonts, auth, logo and a minimum
//!   display time are ready
//! - `InterviewSetup`: validates the setup form and runs generation
//! - `LandingPage`: identity-routed history and the delayed auth prompt
//!
//! # Example
//!
//! ```rust,ignore
//! use ivm_core::prelude::*;
//!
//! # async fn example(fonts: Arc<dyn ResourceProbe>, logo: Arc<dyn ResourceProbe>) -> ivm_core::Result<()> {
//! let config = AppConfig::new();
//! let auth = AuthState::new();
//! let splash = SplashScreen::mount(
//!     config.splash,
//!     SplashResources { fonts, logo, auth: auth.clone() },
//!     || println!("ready"),
//! )?;
//!
//! auth.resolve(None);
//! splash.finished().await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod auth;
pub mod config;
pub mod error;
pub mod landing;
pub mod resource;
pub mod setup;
pub mod splash;

pub use auth::{
    auth_error_message, check_display_name, AuthErrorKind, AuthSnapshot, AuthState, SignInMethod,
};
pub use config::AppConfig;
pub use error::{AppError, Result};
pub use landing::{LandingPage, SessionFlags};
pub use resource::{DelayedProbe, FileProbe, ResourceError, ResourceProbe};
pub use setup::InterviewSetup;
pub use splash::{SplashResources, SplashScreen, SPLASH_GATES};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for wiring the screens
    pub use crate::{
        AppConfig, AppError, AuthState, InterviewSetup, LandingPage, ResourceProbe, SessionFlags,
        SplashResources, SplashScreen,
    };
    pub use ivm_barrier::PhaseState;
    pub use ivm_generation::{GenerationService, TaskStatus};
    pub use ivm_history::{HistoryRouter, Identity, SessionRecord};
    pub use std::sync::Arc;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
