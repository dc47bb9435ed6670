//! Remote generation service seam

use crate::error::OperationError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One generated interview question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question text
    pub text: String,
    /// Optional grouping, e.g. "behavioral" or "technical"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Question {
    /// Create an uncategorized question
    #[inline]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            category: None,
        }
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// Successful generation response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeneratedInterview {
    /// Tailored questions
    pub questions: Vec<Question>,
}

impl GeneratedInterview {
    /// Parse a service response body
    ///
    /// # Errors
    /// - `OperationError` with code `invalid-response` if the body is not a
    ///   `{ "questions": [...] }` document
    pub fn from_json(body: &str) -> Result<Self, OperationError> {
        serde_json::from_str(body)
            .map_err(|e| OperationError::new("invalid-response", e.to_string()))
    }
}

/// Turns a job description into interview questions
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Generate questions for `description` at `company`
    async fn generate(
        &self,
        description: &str,
        company: &str,
    ) -> Result<GeneratedInterview, OperationError>;
}

/// Offline service replaying one fixed outcome after a fixed latency
#[derive(Debug, Clone)]
pub struct ScriptedGenerationService {
    latency: Duration,
    outcome: Result<GeneratedInterview, OperationError>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGenerationService {
    /// Resolve with `interview` after `latency`
    #[must_use]
    pub fn succeeding(latency: Duration, interview: GeneratedInterview) -> Self {
        Self {
            latency,
            outcome: Ok(interview),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Fail with `code` after `latency`
    pub fn failing(latency: Duration, code: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            latency,
            outcome: Err(OperationError::new(code.clone(), format!("scripted {code}"))),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Times `generate` has been called
    #[inline]
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerationService for ScriptedGenerationService {
    async fn generate(
        &self,
        description: &str,
        company: &str,
    ) -> Result<GeneratedInterview, OperationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(
            company,
            words = crate::validation::word_count(description),
            latency_ms = self.latency.as_millis(),
            "scripted generation"
        );
        tokio::time::sleep(self.latency).await;
        self.outcome.clone()
    }
}
