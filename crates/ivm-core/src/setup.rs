//! Interview setup flow
//!
//! Form state for the setup page plus the generate action: validate,
//! run the remote generation behind the progress runner, then record the
//! session in history for whoever is signed in.

use crate::auth::AuthState;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use ivm_generation::{
    word_count, GeneratedInterview, GenerationService, GenerationTask, RunnerConfig, SetupRules,
    TaskRunner,
};
use ivm_history::{HistoryRouter, SessionRecord};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Setup page state and actions
pub struct InterviewSetup {
    job_description: String,
    company_name: String,
    rules: SetupRules,
    runner: TaskRunner,
    service: Arc<dyn GenerationService>,
    history: Arc<HistoryRouter>,
    auth: AuthState,
}

impl InterviewSetup {
    /// Create with default rules and timing
    pub fn new(
        service: Arc<dyn GenerationService>,
        history: Arc<HistoryRouter>,
        auth: AuthState,
    ) -> Self {
        Self::with_config(service, history, auth, SetupRules::default(), RunnerConfig::default())
    }

    /// Create with rules and timing from `config`
    pub fn from_config(
        config: &AppConfig,
        service: Arc<dyn GenerationService>,
        history: Arc<HistoryRouter>,
        auth: AuthState,
    ) -> Self {
        Self::with_config(service, history, auth, config.setup, config.runner)
    }

    fn with_config(
        service: Arc<dyn GenerationService>,
        history: Arc<HistoryRouter>,
        auth: AuthState,
        rules: SetupRules,
        runner: RunnerConfig,
    ) -> Self {
        Self {
            job_description: String::new(),
            company_name: String::new(),
            rules,
            runner: TaskRunner::new(runner),
            service,
            history,
            auth,
        }
    }

    /// Replace the job description
    pub fn set_job_description(&mut self, text: impl Into<String>) {
        self.job_description = text.into();
        self.runner.clear_error();
    }

    /// Replace the company name
    pub fn set_company_name(&mut self, name: impl Into<String>) {
        self.company_name = name.into();
        self.runner.clear_error();
    }

    /// Job description as typed
    #[inline]
    #[must_use]
    pub fn job_description(&self) -> &str {
        &self.job_description
    }

    /// Company name as typed
    #[inline]
    #[must_use]
    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    /// Words in the job description
    #[inline]
    #[must_use]
    pub fn word_count(&self) -> usize {
        word_count(&self.job_description)
    }

    /// Whether the generate action is enabled
    #[inline]
    #[must_use]
    pub fn can_generate(&self) -> bool {
        self.rules.can_generate(&self.company_name, &self.job_description)
    }

    /// Current progress snapshot
    #[must_use]
    pub fn progress(&self) -> GenerationTask {
        self.runner.snapshot()
    }

    /// Watch progress
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GenerationTask> {
        self.runner.subscribe()
    }

    /// Whether a generation is in flight
    #[inline]
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.runner.is_busy()
    }

    /// Inline error copy, if the last attempt failed
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.runner.snapshot().error
    }

    /// Generate an interview for the current form.
    ///
    /// Returns `None` if validation failed, the call failed, or a
    /// generation is already running; `error()` then carries the copy to
    /// show. On success the session is saved to history before returning.
    pub async fn generate(&self) -> Option<GeneratedInterview> {
        self.try_generate().await.ok()
    }

    /// Like [`generate`](Self::generate), keeping the cause of a failure.
    ///
    /// # Errors
    /// - `AppError::Validation` when the form is rejected
    /// - `AppError::Operation` when the service call fails
    /// - `AppError::Busy` when a generation is already running
    pub async fn try_generate(&self) -> Result<GeneratedInterview> {
        let company = self.company_name.trim().to_string();
        let description = self.job_description.clone();
        let check = self.rules.check(&company, &description);
        let rejected = check.clone().err();

        let failure = Arc::new(Mutex::new(None));
        let service = Arc::clone(&self.service);
        let request_company = company.clone();
        let slot = Arc::clone(&failure);
        let outcome = self
            .runner
            .run_validated(
                check,
                move || async move {
                    let result = service.generate(&description, &request_company).await;
                    if let Err(err) = &result {
                        *slot.lock() = Some(err.clone());
                    }
                    result
                },
                self.runner.config().min_duration(),
            )
            .await;

        let Some(interview) = outcome else {
            if let Some(err) = failure.lock().take() {
                return Err(AppError::Operation(err));
            }
            // the runner only reports validation when it started this run
            if let (Some(err), false) = (rejected, self.is_generating()) {
                return Err(AppError::Validation(err));
            }
            return Err(AppError::Busy);
        };

        let identity = self.auth.current_identity();
        let questions = interview.questions.iter().map(|q| q.text.clone()).collect();
        self.history
            .save(identity.as_ref(), SessionRecord::new(company, questions))
            .await;
        Ok(interview)
    }
}

impl fmt::Debug for InterviewSetup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterviewSetup")
            .field("company_name", &self.company_name)
            .field("words", &self.word_count())
            .field("runner", &self.runner)
            .finish_non_exhaustive()
    }
}
