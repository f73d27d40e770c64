//! Run requests and aggregated run reports.
//!
//! A run takes one pillar to a set of platforms. Each platform task
//! contributes exactly one [`PlatformResult`] to the report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::outcome::{PlatformOutcome, PlatformResult};
use super::platform::Platform;

/// One orchestration request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Requested platform identifiers (unsupported ones are ignored)
    pub platforms: Vec<String>,

    /// Content pillar to write about
    pub pillar: String,

    /// Generate and validate, but never publish
    #[serde(default)]
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn new(
        platforms: impl IntoIterator<Item = impl Into<String>>,
        pillar: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        Self {
            platforms: platforms.into_iter().map(Into::into).collect(),
            pillar: pillar.into(),
            dry_run,
        }
    }

    /// Distinct supported platforms, in request order
    pub fn supported_platforms(&self) -> Vec<Platform> {
        let mut selected = Vec::new();
        for id in &self.platforms {
            if let Some(platform) = Platform::from_id(id) {
                if !selected.contains(&platform) {
                    selected.push(platform);
                }
            }
        }
        selected
    }

    /// Requested ids outside the supported set
    pub fn unsupported_platforms(&self) -> Vec<&str> {
        self.platforms
            .iter()
            .map(String::as_str)
            .filter(|id| Platform::from_id(id).is_none())
            .collect()
    }

    /// Reject configurations no task set can be built from
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.pillar.trim().is_empty() {
            anyhow::bail!("Pillar cannot be empty");
        }
        Ok(())
    }
}

/// Aggregated outcome of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run
    pub run_id: Uuid,

    pub pillar: String,

    pub dry_run: bool,

    pub started_at: DateTime<Utc>,

    pub completed_at: DateTime<Utc>,

    /// Set when the run was interrupted before every task finished
    #[serde(default)]
    pub cancelled: bool,

    /// One entry per completed platform task
    pub results: BTreeMap<Platform, PlatformResult>,
}

impl RunReport {
    /// Platforms whose content went out
    pub fn published(&self) -> Vec<Platform> {
        self.results
            .values()
            .filter(|r| matches!(r.outcome, PlatformOutcome::Published { .. }))
            .map(|r| r.platform)
            .collect()
    }

    /// Platforms a caller may want to re-run
    pub fn failed(&self) -> Vec<Platform> {
        self.results
            .values()
            .filter(|r| r.outcome.is_failure())
            .map(|r| r.platform)
            .collect()
    }

    /// True when the run finished and no platform failed
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failed().is_empty()
    }

    pub fn get(&self, platform: Platform) -> Option<&PlatformResult> {
        self.results.get(&platform)
    }
}
