//! Interview generation
//!
//! Runs one remote generation call at a time behind a synthetic progress
//! indicator:
//! - `SetupRules` gate the request on form input
//! - `TaskRunner` enforces a minimum perceived duration and publishes
//!   `GenerationTask` snapshots over a watch channel
//! - `OperationErrorKind` maps service codes to user-facing copy
//!
//! # Example
//!
//! ```rust,ignore
//! use ivm_generation::{RunnerConfig, SetupRules, TaskRunner};
//!
//! # async fn example(service: &dyn ivm_generation::GenerationService) {
//! let runner = TaskRunner::new(RunnerConfig::new());
//! let rules = SetupRules::default();
//!
//! let check = rules.check("Acme Corp", JOB_DESCRIPTION);
//! let interview = runner
//!     .run_validated(check, || service.generate(JOB_DESCRIPTION, "Acme Corp"), runner.config().min_duration())
//!     .await;
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod progress;
pub mod runner;
pub mod service;
pub mod task;
pub mod validation;

pub use config::RunnerConfig;
pub use error::{OperationError, OperationErrorKind, ValidationError, GENERIC_FAILURE_MESSAGE};
pub use progress::ProgressTicker;
pub use runner::TaskRunner;
pub use service::{GeneratedInterview, GenerationService, Question, ScriptedGenerationService};
pub use task::{GenerationTask, TaskStatus};
pub use validation::{word_count, SetupRules};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
