//! LinkedIn member share publisher.
//!
//! Posts a public text share through the UGC Posts endpoint on behalf of the
//! member identified by `author_urn` (e.g. `urn:li:person:abc123`).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{PublishError, Publisher};
use crate::domain::Platform;

const UGC_POSTS_URL: &str = "https://api.linkedin.com/v2/ugcPosts";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// LinkedIn member credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInConfig {
    /// OAuth 2.0 bearer token with `w_member_social`
    pub access_token: String,

    pub author_urn: String,
}

/// LinkedIn REST publisher
pub struct LinkedInPublisher {
    config: LinkedInConfig,
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl LinkedInPublisher {
    pub fn new(config: LinkedInConfig) -> Self {
        Self {
            config,
            endpoint: UGC_POSTS_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            client: reqwest::Client::new(),
        }
    }

    /// Point the publisher at a different endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn share_payload(&self, content: &str) -> serde_json::Value {
        serde_json::json!({
            "author": self.config.author_urn,
            "lifecycleState": "PUBLISHED",
            "specificContent": {
                "com.linkedin.ugc.ShareContent": {
                    "shareCommentary": { "text": content },
                    "shareMediaCategory": "NONE"
                }
            },
            "visibility": {
                "com.linkedin.ugc.MemberNetworkVisibility": "PUBLIC"
            }
        })
    }
}

fn fail(message: String) -> PublishError {
    PublishError::new(Platform::LinkedIn, message)
}

#[async_trait]
impl Publisher for LinkedInPublisher {
    fn name(&self) -> &str {
        "linkedin"
    }

    async fn publish(&self, content: &str) -> Result<String, PublishError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.access_token)
            .header("X-Restli-Protocol-Version", "2.0.0")
            .timeout(self.timeout)
            .json(&self.share_payload(content))
            .send()
            .await
            .map_err(|e| fail(format!("request error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(fail(format!("HTTP {}: {}", status, body.trim())));
        }

        let post_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(match post_id {
            Some(id) => format!("LinkedIn: published successfully → {}", id),
            None => "LinkedIn: published successfully".to_string(),
        })
    }
}
