//! Startup resources the splash screen waits on

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// A resource failed to load
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{resource} failed to load: {reason}")]
pub struct ResourceError {
    /// Probe name
    pub resource: String,
    /// What went wrong
    pub reason: String,
}

impl ResourceError {
    /// Create resource error
    #[inline]
    pub fn new(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

/// Something that becomes ready at some point after startup
#[async_trait]
pub trait ResourceProbe: Send + Sync {
    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Resolve once the resource is usable
    async fn ready(&self) -> Result<(), ResourceError>;
}

/// Resolves after a fixed delay with a fixed outcome
#[derive(Debug, Clone)]
pub struct DelayedProbe {
    name: String,
    delay: Duration,
    failure: Option<String>,
}

impl DelayedProbe {
    /// Ready after `delay`
    pub fn ready_after(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            failure: None,
        }
    }

    /// Fail with `reason` after `delay`
    pub fn failing_after(name: impl Into<String>, delay: Duration, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delay,
            failure: Some(reason.into()),
        }
    }
}

#[async_trait]
impl ResourceProbe for DelayedProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ready(&self) -> Result<(), ResourceError> {
        tokio::time::sleep(self.delay).await;
        match &self.failure {
            None => Ok(()),
            Some(reason) => Err(ResourceError::new(&self.name, reason.clone())),
        }
    }
}

/// Ready once a file on disk can be read
#[derive(Debug, Clone)]
pub struct FileProbe {
    name: String,
    path: PathBuf,
}

impl FileProbe {
    /// Probe `path`
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[async_trait]
impl ResourceProbe for FileProbe {
    fn name(&self) -> &str {
        &self.name
    }

    async fn ready(&self) -> Result<(), ResourceError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| ResourceError::new(&self.name, format!("{}: {e}", self.path.display())))?;
        if bytes.is_empty() {
            return Err(ResourceError::new(&self.name, "empty file"));
        }
        tracing::debug!(resource = %self.name, bytes = bytes.len(), "resource loaded");
        Ok(())
    }
}
