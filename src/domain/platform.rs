//! Publishing destinations and their static limits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Word target used when a platform has no entry in the word-limit table
pub const DEFAULT_WORD_LIMIT: u32 = 500;

/// A supported publishing destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// LinkedIn member feed
    LinkedIn,

    /// Medium articles
    Medium,

    /// X (formerly Twitter)
    X,
}

impl Platform {
    /// Every supported platform, in identifier order
    pub const ALL: [Platform; 3] = [Platform::LinkedIn, Platform::Medium, Platform::X];

    /// Wire identifier (`"linkedin"`, `"medium"`, `"x"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LinkedIn => "linkedin",
            Self::Medium => "medium",
            Self::X => "x",
        }
    }

    /// Human-facing name used in status and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LinkedIn => "LinkedIn",
            Self::Medium => "Medium",
            Self::X => "X",
        }
    }

    /// Look up a platform by its exact identifier.
    ///
    /// Returns `None` for anything outside the supported set; matching is
    /// case-sensitive.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == id)
    }

    /// Default maximum character count enforced by the validator
    pub fn default_max_chars(&self) -> usize {
        match self {
            Self::X => 280,
            Self::LinkedIn => 3000,
            Self::Medium => 50_000,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_id(s).ok_or_else(|| anyhow::anyhow!("Unsupported platform: '{}'", s))
    }
}

/// Target word count handed to the generator for a platform id.
///
/// Unknown ids fall back to [`DEFAULT_WORD_LIMIT`].
pub fn word_limit(platform_id: &str) -> u32 {
    match platform_id {
        "linkedin" => 750,
        "medium" => 1500,
        "x" => 280,
        _ => DEFAULT_WORD_LIMIT,
    }
}
