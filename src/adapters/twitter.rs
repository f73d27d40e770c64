//! X (Twitter) v2 publisher.
//!
//! Posts tweets in OAuth 1.0a user context. Content longer than a tweet is
//! truncated with an ellipsis rather than rejected.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::oauth::{OAuth1Credentials, OAuthSigner};
use super::{PublishError, Publisher};
use crate::domain::Platform;

const TWEET_ENDPOINT: &str = "https://api.x.com/2/tweets";
const MAX_TWEET_LENGTH: usize = 280;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// X v2 API publisher
pub struct TwitterPublisher {
    signer: OAuthSigner,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TweetResponse {
    data: TweetData,
}

#[derive(Debug, Deserialize)]
struct TweetData {
    id: String,
}

impl TwitterPublisher {
    pub fn new(credentials: OAuth1Credentials) -> Self {
        Self {
            signer: OAuthSigner::new(credentials),
            endpoint: TWEET_ENDPOINT.to_string(),
            timeout: REQUEST_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Point the publisher at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the 15s request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn post_tweet(&self, text: &str) -> Result<String, PublishError> {
        let auth = self
            .signer
            .authorization_header("POST", &self.endpoint)
            .map_err(|e| fail(format!("failed to sign request: {}", e)))?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", auth)
            .timeout(self.timeout)
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| fail(format!("request error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(fail(format!("HTTP {}: {}", status, body.trim())));
        }

        let parsed: TweetResponse = response
            .json()
            .await
            .map_err(|e| fail(format!("unexpected response: {}", e)))?;

        Ok(parsed.data.id)
    }
}

fn fail(message: String) -> PublishError {
    PublishError::new(Platform::X, message)
}

/// Cut content to tweet length, replacing the last kept char with `…`
pub fn truncate_tweet(content: &str) -> String {
    if content.chars().count() <= MAX_TWEET_LENGTH {
        return content.to_string();
    }
    let mut truncated: String = content.chars().take(MAX_TWEET_LENGTH - 1).collect();
    truncated.push('…');
    truncated
}

#[async_trait]
impl Publisher for TwitterPublisher {
    fn name(&self) -> &str {
        "x"
    }

    async fn publish(&self, content: &str) -> Result<String, PublishError> {
        let text = truncate_tweet(content);
        debug!(chars = text.chars().count(), "Posting tweet");

        let tweet_id = self.post_tweet(&text).await?;
        Ok(format!("X: published successfully → tweet ID {}", tweet_id))
    }
}
