//! Medium REST API publisher.
//!
//! Uses an integration token. Posts default to `draft` so a human can review
//! them before they go public.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use super::{PublishError, Publisher};
use crate::domain::Platform;

const BASE_URL: &str = "https://api.medium.com/v1";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);
const POST_TIMEOUT: Duration = Duration::from_secs(30);

/// Medium integration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediumConfig {
    pub integration_token: String,

    /// `draft`, `public` or `unlisted`
    #[serde(default = "default_publish_status")]
    pub publish_status: String,
}

pub fn default_publish_status() -> String {
    "draft".to_string()
}

/// Medium API publisher
pub struct MediumPublisher {
    config: MediumConfig,
    base_url: String,
    lookup_timeout: Duration,
    post_timeout: Duration,
    client: reqwest::Client,
    /// Resolved once per publisher
    user_id: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct User {
    id: String,
}

#[derive(Debug, Deserialize)]
struct Post {
    url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatePost<'a> {
    title: &'a str,
    content_format: &'static str,
    content: &'a str,
    publish_status: &'a str,
}

impl MediumPublisher {
    pub fn new(config: MediumConfig) -> Self {
        Self {
            config,
            base_url: BASE_URL.to_string(),
            lookup_timeout: LOOKUP_TIMEOUT,
            post_timeout: POST_TIMEOUT,
            client: reqwest::Client::new(),
            user_id: OnceCell::new(),
        }
    }

    /// Point the publisher at a different API root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use one timeout for both the user lookup (10s) and post creation (30s)
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self.post_timeout = timeout;
        self
    }

    async fn user_id(&self) -> Result<&str, PublishError> {
        self.user_id
            .get_or_try_init(|| async {
                let response = self
                    .client
                    .get(format!("{}/me", self.base_url))
                    .bearer_auth(&self.config.integration_token)
                    .header("Accept", "application/json")
                    .timeout(self.lookup_timeout)
                    .send()
                    .await
                    .map_err(|e| fail(format!("request error: {}", e)))?;

                let user: Envelope<User> = read_json(response).await?;
                Ok::<_, PublishError>(user.data.id)
            })
            .await
            .map(String::as_str)
    }

    async fn create_post(&self, user_id: &str, content: &str) -> Result<String, PublishError> {
        let title = extract_title(content);
        let payload = CreatePost {
            title: &title,
            content_format: "markdown",
            content,
            publish_status: &self.config.publish_status,
        };

        let response = self
            .client
            .post(format!("{}/users/{}/posts", self.base_url, user_id))
            .bearer_auth(&self.config.integration_token)
            .header("Accept", "application/json")
            .timeout(self.post_timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| fail(format!("request error: {}", e)))?;

        let post: Envelope<Post> = read_json(response).await?;
        Ok(post.data.url)
    }
}

fn fail(message: String) -> PublishError {
    PublishError::new(Platform::Medium, message)
}

async fn read_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
) -> Result<T, PublishError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(fail(format!("HTTP {}: {}", status, body.trim())));
    }
    response
        .json()
        .await
        .map_err(|e| fail(format!("unexpected response: {}", e)))
}

/// Title is the first line with any markdown heading marks removed
pub fn extract_title(content: &str) -> String {
    content
        .trim()
        .lines()
        .next()
        .map(|line| line.trim().trim_start_matches('#').trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| "Untitled".to_string())
}

#[async_trait]
impl Publisher for MediumPublisher {
    fn name(&self) -> &str {
        "medium"
    }

    async fn publish(&self, content: &str) -> Result<String, PublishError> {
        let user_id = self.user_id().await?;
        let url = self.create_post(user_id, content).await?;
        Ok(format!("Medium: published successfully → {}", url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title_from_heading() {
        assert_eq!(
            extract_title("# Shipping SwiftUI at scale\n\nBody text"),
            "Shipping SwiftUI at scale"
        );
        assert_eq!(extract_title("## Nested\nmore"), "Nested");
    }

    #[test]
    fn test_extract_title_plain_line() {
        assert_eq!(extract_title("  First line\nSecond"), "First line");
    }

    #[test]
    fn test_extract_title_empty() {
        assert_eq!(extract_title("   "), "Untitled");
        assert_eq!(extract_title("#"), "Untitled");
    }

    #[test]
    fn test_create_post_payload_shape() {
        let payload = CreatePost {
            title: "T",
            content_format: "markdown",
            content: "body",
            publish_status: "draft",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["contentFormat"], "markdown");
        assert_eq!(value["publishStatus"], "draft");
    }
}
