//! Readiness barrier
//!
//! Gates a one-time phase transition on several independent, asynchronously
//! resolving conditions:
//! - a fixed set of named gates, satisfied in any order, any number of times
//! - a minimum display duration measured from construction
//! - a one-shot latch so the completion callback runs exactly once
//! - owned timers, released when the controller is dropped
//!
//! # Example
//!
//! ```rust,ignore
//! use ivm_barrier::BarrierController;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), ivm_barrier::BarrierError> {
//! let barrier = BarrierController::configure(["fonts", "auth"], Duration::from_millis(2500))?;
//! barrier.on_all_ready(|| println!("splash done"))?;
//!
//! barrier.satisfy("auth")?;
//! barrier.satisfy("fonts")?;
//! barrier.finished().await;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod controller;
pub mod error;
pub mod gate;
pub mod latch;
pub mod optional;
pub mod phase;
pub mod timers;

pub use config::BarrierConfig;
pub use controller::{BarrierController, BarrierNotifier};
pub use error::BarrierError;
pub use gate::ReadinessSet;
pub use latch::OneShotLatch;
pub use optional::always_ready;
pub use phase::{allowed_transitions, validate_transition, PhaseState};
pub use timers::TimerSet;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
