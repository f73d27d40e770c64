//! Per-platform outcomes produced by a pipeline task.

use serde::{Deserialize, Serialize};

use super::platform::Platform;

/// Which stage a platform task ended in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PlatformOutcome {
    /// Publisher accepted the content
    Published { status: String },

    /// Dry run: generation and validation passed, publishing skipped
    DryRunSkipped { status: String },

    /// Generated content failed one or more checks
    ValidationRejected { reasons: Vec<String> },

    /// The generator gave up
    GenerationFailed { reason: String },

    /// The publisher adapter returned an error
    PublishFailed { reason: String },
}

impl PlatformOutcome {
    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Published { .. } => "published",
            Self::DryRunSkipped { .. } => "dry-run",
            Self::ValidationRejected { .. } => "rejected",
            Self::GenerationFailed { .. } => "generation-failed",
            Self::PublishFailed { .. } => "publish-failed",
        }
    }

    /// True for outcomes a caller may want to re-run
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::ValidationRejected { .. } | Self::GenerationFailed { .. } | Self::PublishFailed { .. }
        )
    }

    /// Status text, reason, or joined rejection reasons
    pub fn detail(&self) -> String {
        match self {
            Self::Published { status } | Self::DryRunSkipped { status } => status.clone(),
            Self::ValidationRejected { reasons } => reasons.join("; "),
            Self::GenerationFailed { reason } | Self::PublishFailed { reason } => reason.clone(),
        }
    }
}

/// Final outcome of one platform task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformResult {
    pub platform: Platform,

    #[serde(flatten)]
    pub outcome: PlatformOutcome,
}

impl PlatformResult {
    pub fn new(platform: Platform, outcome: PlatformOutcome) -> Self {
        Self { platform, outcome }
    }

    pub fn published(platform: Platform, status: impl Into<String>) -> Self {
        Self::new(platform, PlatformOutcome::Published { status: status.into() })
    }

    pub fn dry_run(platform: Platform) -> Self {
        Self::new(
            platform,
            PlatformOutcome::DryRunSkipped {
                status: format!("[DRY RUN] Would publish to {}", platform),
            },
        )
    }

    pub fn rejected(platform: Platform, reasons: Vec<String>) -> Self {
        Self::new(platform, PlatformOutcome::ValidationRejected { reasons })
    }

    pub fn generation_failed(platform: Platform, reason: impl Into<String>) -> Self {
        Self::new(platform, PlatformOutcome::GenerationFailed { reason: reason.into() })
    }

    pub fn publish_failed(platform: Platform, reason: impl Into<String>) -> Self {
        Self::new(platform, PlatformOutcome::PublishFailed { reason: reason.into() })
    }
}
