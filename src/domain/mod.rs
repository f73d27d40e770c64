//! Domain models for content runs.
//!
//! This module contains the core data structures:
//! - Platform: Supported publishing destinations and their limits
//! - PlatformResult: Outcome of one platform task
//! - PipelineConfig / RunReport: A run request and its aggregated result

pub mod outcome;
pub mod platform;
pub mod run;

pub use outcome::{PlatformOutcome, PlatformResult};
pub use platform::{word_limit, Platform, DEFAULT_WORD_LIMIT};
pub use run::{PipelineConfig, RunReport};
