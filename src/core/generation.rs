//! Content generation with bounded retry.
//!
//! Each attempt is classified into an [`Attempt`] tag and the retry loop acts
//! on the tag:
//! - `Success`: return the text
//! - `Retryable`: sleep (exponential + jitter for rate limits, 1s otherwise)
//!   and try again, unless this was the last attempt
//! - `Fatal`: fail immediately

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

use crate::adapters::{BackendError, TextBackend};
use crate::domain::{word_limit, Platform};

/// Attempts per generate call (including the first)
pub const MAX_RETRIES: u32 = 3;

/// Pause after a generic backend failure
pub const BACKEND_ERROR_DELAY: Duration = Duration::from_secs(1);

/// Errors returned once generation gives up
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GenerationError {
    #[error("Rate limit exceeded after max retries")]
    RateLimited { attempts: u32 },

    #[error("API error after {attempts} attempts: {message}")]
    Backend { attempts: u32, message: String },

    #[error("Unretryable generation failure: {0}")]
    Unretryable(String),
}

/// Retryable failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryKind {
    RateLimit,
    Backend,
}

/// Classified result of a single backend call
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    Success(String),
    Retryable { kind: RetryKind, reason: String },
    Fatal(String),
}

impl From<Result<String, BackendError>> for Attempt {
    fn from(result: Result<String, BackendError>) -> Self {
        match result {
            Ok(text) => Self::Success(text),
            Err(BackendError::RateLimited(reason)) => Self::Retryable {
                kind: RetryKind::RateLimit,
                reason,
            },
            Err(BackendError::Request(reason)) => Self::Retryable {
                kind: RetryKind::Backend,
                reason,
            },
            Err(BackendError::InvalidResponse(reason)) => Self::Fatal(reason),
        }
    }
}

/// Delay before retrying after a failure on `attempt` (0-indexed).
///
/// `jitter` is expected in `[0, 1)` and only applies to rate limits.
pub fn backoff_delay(kind: RetryKind, attempt: u32, jitter: f64) -> Duration {
    match kind {
        RetryKind::RateLimit => Duration::from_secs_f64(2f64.powi(attempt as i32) + jitter),
        RetryKind::Backend => BACKEND_ERROR_DELAY,
    }
}

/// The shared system preamble, loaded once and never mutated
#[derive(Debug, Clone)]
pub struct SystemPrompt(Arc<str>);

impl SystemPrompt {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    /// Read the preamble from disk
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read system prompt: {}", path.display()))?;
        if text.trim().is_empty() {
            anyhow::bail!("System prompt is empty: {}", path.display());
        }
        Ok(Self::new(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A single generate call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub pillar: String,
    pub platform: String,
    pub word_limit: u32,
}

impl GenerationRequest {
    pub fn new(pillar: impl Into<String>, platform: impl Into<String>) -> Self {
        let platform = platform.into();
        Self {
            pillar: pillar.into(),
            word_limit: word_limit(&platform),
            platform,
        }
    }

    /// User-facing instruction for the backend
    pub fn instruction(&self) -> String {
        format!(
            "Write a {} post for the '{}' content pillar. \
             Target length: {} words. \
             Use only verified facts from the profile. No fabrication.",
            self.platform, self.pillar, self.word_limit
        )
    }
}

/// Backend wrapper with retry and backoff
pub struct GenerationClient {
    backend: Arc<dyn TextBackend>,
    system_prompt: SystemPrompt,
    max_retries: u32,
}

impl GenerationClient {
    pub fn new(backend: Arc<dyn TextBackend>, system_prompt: SystemPrompt) -> Self {
        Self {
            backend,
            system_prompt,
            max_retries: MAX_RETRIES,
        }
    }

    /// Override the attempt budget (at least one attempt is always made)
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn system_prompt(&self) -> &SystemPrompt {
        &self.system_prompt
    }

    /// Generate content for a pillar on a platform
    pub async fn generate(&self, pillar: &str, platform: Platform) -> Result<String, GenerationError> {
        self.generate_request(&GenerationRequest::new(pillar, platform.as_str()))
            .await
    }

    /// Generate content for an explicit request
    #[instrument(skip(self, request), fields(pillar = %request.pillar, platform = %request.platform))]
    pub async fn generate_request(
        &self,
        request: &GenerationRequest,
    ) -> Result<String, GenerationError> {
        let instruction = request.instruction();
        let mut attempt = 0u32;

        loop {
            let result = self
                .backend
                .complete(self.system_prompt.as_str(), &instruction)
                .await;

            match Attempt::from(result) {
                Attempt::Success(text) => {
                    debug!(attempt, chars = text.chars().count(), "Generation succeeded");
                    return Ok(text);
                }
                Attempt::Fatal(reason) => {
                    error!(attempt, %reason, "Generation failed with unretryable error");
                    return Err(GenerationError::Unretryable(reason));
                }
                Attempt::Retryable { kind, reason } => {
                    let attempts = attempt + 1;
                    if attempts >= self.max_retries {
                        error!(attempts, ?kind, %reason, "Generation retries exhausted");
                        return Err(match kind {
                            RetryKind::RateLimit => GenerationError::RateLimited { attempts },
                            RetryKind::Backend => GenerationError::Backend {
                                attempts,
                                message: reason,
                            },
                        });
                    }

                    let jitter: f64 = rand::thread_rng().gen_range(0.0..1.0);
                    let delay = backoff_delay(kind, attempt, jitter);
                    warn!(
                        attempt,
                        ?kind,
                        delay_ms = delay.as_millis() as u64,
                        %reason,
                        "Generation failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_text() {
        let request = GenerationRequest::new("career_mentorship", "linkedin");
        assert_eq!(request.word_limit, 750);
        assert_eq!(
            request.instruction(),
            "Write a linkedin post for the 'career_mentorship' content pillar. \
             Target length: 750 words. Use only verified facts from the profile. No fabrication."
        );
    }

    #[test]
    fn test_unknown_platform_gets_default_word_limit() {
        let request = GenerationRequest::new("ios_swift", "threads");
        assert_eq!(request.word_limit, 500);
    }

    #[test]
    fn test_rate_limit_backoff_is_exponential() {
        assert_eq!(backoff_delay(RetryKind::RateLimit, 0, 0.0), Duration::from_secs(1));
        assert_eq!(backoff_delay(RetryKind::RateLimit, 1, 0.5), Duration::from_millis(2500));
        assert_eq!(backoff_delay(RetryKind::RateLimit, 2, 0.25), Duration::from_millis(4250));
    }

    #[test]
    fn test_backend_error_backoff_is_fixed() {
        assert_eq!(backoff_delay(RetryKind::Backend, 0, 0.9), Duration::from_secs(1));
        assert_eq!(backoff_delay(RetryKind::Backend, 5, 0.9), Duration::from_secs(1));
    }

    #[test]
    fn test_attempt_classification() {
        assert_eq!(
            Attempt::from(Ok("text".to_string())),
            Attempt::Success("text".to_string())
        );
        assert_eq!(
            Attempt::from(Err(BackendError::RateLimited("429".to_string()))),
            Attempt::Retryable {
                kind: RetryKind::RateLimit,
                reason: "429".to_string()
            }
        );
        assert_eq!(
            Attempt::from(Err(BackendError::InvalidResponse("bad".to_string()))),
            Attempt::Fatal("bad".to_string())
        );
    }

    #[test]
    fn test_load_system_prompt() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("system_prompt.txt");
        std::fs::write(&path, "You write about verified experience only.").unwrap();

        let prompt = SystemPrompt::load(&path).unwrap();
        assert_eq!(prompt.as_str(), "You write about verified experience only.");

        std::fs::write(&path, "  \n").unwrap();
        assert!(SystemPrompt::load(&path).is_err());
        assert!(SystemPrompt::load(&dir.path().join("missing.txt")).is_err());
    }
}
