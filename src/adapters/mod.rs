//! Adapter interfaces for external systems.
//!
//! Two collaborator seams live here:
//! - [`TextBackend`]: the generative text API (Anthropic Messages)
//! - [`Publisher`]: one destination-specific publishing capability
//!
//! Concrete adapters take explicit config structs and never read the
//! process environment.

pub mod anthropic;
pub mod linkedin;
pub mod medium;
pub mod oauth;
pub mod twitter;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Platform;

pub use anthropic::{AnthropicBackend, AnthropicConfig};
pub use linkedin::{LinkedInConfig, LinkedInPublisher};
pub use medium::{MediumConfig, MediumPublisher};
pub use oauth::{OAuth1Credentials, OAuthSigner};
pub use twitter::TwitterPublisher;

/// Failure classes a text backend can report
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Provider-side rate limit (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Generic request failure (transport error or non-success status)
    #[error("Request failed: {0}")]
    Request(String),

    /// Anything the retry engine does not know how to recover from
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Trait for generative text backends
#[async_trait]
pub trait TextBackend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Generate text for a user instruction under a system preamble
    async fn complete(&self, system: &str, user: &str) -> Result<String, BackendError>;
}

/// A destination-specific publish failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{} publish failed: {message}", .platform.display_name())]
pub struct PublishError {
    pub platform: Platform,
    pub message: String,
}

impl PublishError {
    pub fn new(platform: Platform, message: impl Into<String>) -> Self {
        Self {
            platform,
            message: message.into(),
        }
    }
}

/// Trait for publishing adapters
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Publish content, returning a status line on success.
    ///
    /// Single-shot: callers never retry a failed publish.
    async fn publish(&self, content: &str) -> Result<String, PublishError>;
}
