//! pillarpost - Concurrent content pipeline for short-form posts
//!
//! Turns one request ("publish this pillar to these platforms") into an
//! independent generate → validate → publish task per platform and reports
//! one outcome per platform.
//!
//! # Architecture
//!
//! - Generation runs through a retrying client (exponential backoff with
//!   jitter on rate limits)
//! - Validation is pure and collects every failing rule
//! - Publishing goes through a registry of platform adapters
//! - A failure in one platform's task never affects another's
//!
//! # Modules
//!
//! - `adapters`: External integrations (Anthropic, X, Medium, LinkedIn)
//! - `core`: Orchestration logic (Validator, GenerationClient, Registry, Orchestrator)
//! - `domain`: Data structures (Platform, PipelineConfig, PlatformResult, RunReport)
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Generate and validate without publishing
//! pillarpost run --pillar career_mentorship --platforms x,linkedin --dry-run
//!
//! # Check a draft against platform rules
//! pillarpost validate --platform x --input draft.md
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use adapters::{BackendError, PublishError, Publisher, TextBackend};
pub use core::{
    ContentValidator, GenerationClient, GenerationError, Orchestrator, PublisherRegistry,
    SystemPrompt, ValidationOutcome,
};
pub use domain::{PipelineConfig, Platform, PlatformOutcome, PlatformResult, RunReport};
