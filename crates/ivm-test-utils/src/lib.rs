//! Testing utilities for the InterviewMe workspace
//!
//! Fixtures, scripted services and stores that fail on purpose.

#![allow(missing_docs)]

use ivm_generation::{GeneratedInterview, Question, ScriptedGenerationService};
use ivm_history::{
    HistoryRouter, InMemoryRemoteStore, LocalStore, MemoryStore, PersistenceError, SessionRecord,
    DEFAULT_CAPACITY,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// A realistic job description comfortably over the 50-word minimum
pub const SAMPLE_JOB_DESCRIPTION: &str = "We are looking for a Senior Software Engineer \
to join our platform team. You will design, build and operate backend services in Rust \
and TypeScript that serve millions of requests per day. Responsibilities include owning \
features end to end, reviewing code, mentoring junior engineers, improving observability \
and reliability, and collaborating with product and design on roadmap decisions. \
Requirements: five or more years of professional experience, strong knowledge of \
distributed systems, relational databases and cloud infrastructure, excellent written \
communication, and a track record of shipping high quality software in small autonomous \
teams. Experience with event driven architectures, Kubernetes and incident response is a plus.";

pub const SAMPLE_COMPANY: &str = "Acme Corp";

/// `n` filler words
pub fn words(n: usize) -> String {
    vec!["word"; n].join(" ")
}

pub fn sample_interview() -> GeneratedInterview {
    GeneratedInterview {
        questions: vec![
            Question::new("Walk me through a service you owned end to end.").with_category("technical"),
            Question::new("How do you approach mentoring a junior engineer?").with_category("behavioral"),
            Question::new("Describe an incident you led and what changed afterwards."),
        ],
    }
}

pub fn succeeding_service(latency: Duration) -> Arc<ScriptedGenerationService> {
    Arc::new(ScriptedGenerationService::succeeding(latency, sample_interview()))
}

pub fn failing_service(latency: Duration, code: &str) -> Arc<ScriptedGenerationService> {
    Arc::new(ScriptedGenerationService::failing(latency, code))
}

/// `n` records named `Company 0..n`, oldest first
pub fn numbered_records(n: usize) -> Vec<SessionRecord> {
    (0..n)
        .map(|i| SessionRecord::new(format!("Company {i}"), vec![format!("Question {i}")]))
        .collect()
}

/// Router over an in-memory local slot and an in-memory remote
pub fn memory_router() -> (Arc<HistoryRouter>, Arc<InMemoryRemoteStore>) {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let router = HistoryRouter::new(MemoryStore::new(), remote.clone(), DEFAULT_CAPACITY);
    (Arc::new(router), remote)
}

/// Local slot that refuses every read and write
#[derive(Debug, Default)]
pub struct FailingLocalStore {
    attempts: Mutex<usize>,
}

impl FailingLocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock()
    }
}

impl LocalStore for FailingLocalStore {
    fn read(&self) -> Result<Vec<SessionRecord>, PersistenceError> {
        *self.attempts.lock() += 1;
        Err(PersistenceError::Unavailable("storage disabled".into()))
    }

    fn write(&self, records: &[SessionRecord]) -> Result<(), PersistenceError> {
        *self.attempts.lock() += 1;
        Err(PersistenceError::QuotaExceeded {
            needed: records.len(),
            limit: 0,
        })
    }
}
