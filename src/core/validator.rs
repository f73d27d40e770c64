//! Content validation before publishing.
//!
//! Three independent checks run in a fixed order and every failure is
//! collected:
//! 1. Fabrication markers (invented personal anecdotes)
//! 2. Platform character limits
//! 3. Minimum non-whitespace length

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::domain::Platform;

/// Phrases implying an anecdote the generator cannot have verified
pub const FABRICATION_MARKERS: &[&str] = &[
    r"\bonce told me\b",
    r"\ba mentee of mine\b",
    r"\bI remember when\b",
    r"\btrue story\b",
    r"\bfun fact about me\b",
];

/// Default minimum trimmed length, in characters
pub const DEFAULT_MIN_CHARS: usize = 50;

static MARKERS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn compiled_markers() -> &'static [(&'static str, Regex)] {
    MARKERS.get_or_init(|| {
        FABRICATION_MARKERS
            .iter()
            .filter_map(|pattern| {
                Regex::new(&format!("(?i){}", pattern))
                    .ok()
                    .map(|re| (*pattern, re))
            })
            .collect()
    })
}

/// Result of validating one piece of content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// True iff `failures` is empty
    pub passed: bool,

    /// Failure reasons in check order
    pub failures: Vec<String>,
}

impl ValidationOutcome {
    fn from_failures(failures: Vec<String>) -> Self {
        Self {
            passed: failures.is_empty(),
            failures,
        }
    }
}

/// Stateless rule-based validator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentValidator {
    /// Maximum characters per platform; platforms missing here are unchecked
    #[serde(default = "default_max_chars")]
    pub max_chars: BTreeMap<Platform, usize>,

    /// Minimum trimmed length (default: 50)
    #[serde(default = "default_min_chars")]
    pub min_chars: usize,
}

fn default_max_chars() -> BTreeMap<Platform, usize> {
    Platform::ALL
        .into_iter()
        .map(|p| (p, p.default_max_chars()))
        .collect()
}

fn default_min_chars() -> usize {
    DEFAULT_MIN_CHARS
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            min_chars: default_min_chars(),
        }
    }
}

impl ContentValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every check and collect all failures
    pub fn validate(&self, content: &str, platform: Platform) -> ValidationOutcome {
        let mut failures = Vec::new();

        failures.extend(self.check_fabrication(content));
        failures.extend(self.check_platform_limit(content, platform));
        failures.extend(self.check_not_empty(content));

        ValidationOutcome::from_failures(failures)
    }

    fn check_fabrication(&self, content: &str) -> Vec<String> {
        compiled_markers()
            .iter()
            .filter(|(_, re)| re.is_match(content))
            .map(|(pattern, _)| format!("Fabrication marker detected: '{}'", pattern))
            .collect()
    }

    fn check_platform_limit(&self, content: &str, platform: Platform) -> Option<String> {
        let limit = *self.max_chars.get(&platform)?;
        let actual = content.chars().count();
        if actual > limit {
            return Some(format!(
                "Content exceeds {} limit: {} > {} chars",
                platform, actual, limit
            ));
        }
        None
    }

    fn check_not_empty(&self, content: &str) -> Option<String> {
        if content.trim().chars().count() < self.min_chars {
            return Some("Content is empty or too short".to_string());
        }
        None
    }
}
