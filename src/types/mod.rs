//! Core Types
//!
//! Error taxonomy and domain records shared across the crate.

pub mod error;
pub mod question;

pub use error::{CopycatError, Result, ValidationError};
pub use question::{CloneRecord, ExtractedFields, SectionValue, SourceQuestion};
