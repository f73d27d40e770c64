//! Core orchestration logic.
//!
//! This module contains:
//! - Validator: Rule-based content checks
//! - Generation: Backend wrapper with retry/backoff
//! - Registry: Platform → publisher lookup
//! - Orchestrator: Concurrent per-platform fan-out

pub mod generation;
pub mod orchestrator;
pub mod registry;
pub mod validator;

// Re-export commonly used types
pub use generation::{
    backoff_delay, Attempt, GenerationClient, GenerationError, GenerationRequest, RetryKind,
    SystemPrompt, MAX_RETRIES,
};
pub use orchestrator::{Orchestrator, TASK_ABORTED};
pub use registry::PublisherRegistry;
pub use validator::{ContentValidator, ValidationOutcome, FABRICATION_MARKERS};
