//! copycat - Variant Exam Question Generator
//!
//! Generates "clone" variants of multiple-choice math questions: each
//! source question is sent to a configured LLM backend with a structured
//! prompt, the free-text reply is parsed into discrete fields, validated,
//! and written back to the record store. A secondary pass normalizes
//! stored LaTeX/Markdown markup with deterministic text transforms.
//!
//! ## Core Pipeline
//!
//! Driver → Prompt Builder → Model Gateway → Response Extractor →
//! Validator → store write. Records are processed strictly one at a time;
//! any per-record failure is recorded as an outcome and never aborts the
//! batch.
//!
//! ## Modules
//!
//! - [`ai`]: prompt construction, backend gateway with retry, response
//!   extraction, field validation
//! - [`store`]: record store adapter (Airtable REST)
//! - [`pipeline`]: sequential driver and per-record outcomes
//! - [`cleanup`]: deterministic LaTeX markup normalization
//! - [`config`]: layered configuration (defaults, files, environment)

pub mod ai;
pub mod cleanup;
pub mod cli;
pub mod config;
pub mod constants;
pub mod pipeline;
pub mod store;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, LlmConfig, PipelineConfig, StoreConfig};

// Error Types
pub use types::error::{CopycatError, Result, ValidationError};

// Domain Records
pub use types::{CloneRecord, ExtractedFields, SectionValue, SourceQuestion};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use pipeline::{Driver, DriverOptions, Outcome, PassSummary, SkipReason};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{
    CompletionProvider,
    ModelGateway,
    ResponseSchema,
    RetryPolicy,
    SharedProvider,
    build_clone_prompt,
    create_provider,
    extract,
    validate,
};

// =============================================================================
// Store Re-exports
// =============================================================================

pub use store::{AirtableStore, RecordStore, StoreRecord};
