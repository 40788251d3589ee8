//! AI Integration Layer
//!
//! Prompt construction, backend gateway with retry, response extraction,
//! and field validation.

pub mod extract;
pub mod gateway;
pub mod prompt;
pub mod provider;
pub mod schema;
pub mod validate;

pub use extract::extract;
pub use gateway::{ModelGateway, RetryPolicy};
pub use prompt::build_clone_prompt;
pub use provider::{
    AnthropicProvider, CompletionProvider, OllamaProvider, OpenAiProvider, SharedProvider,
    create_provider,
};
pub use schema::{Requirement, ResponseSchema, SectionRole, SectionSpec};
pub use validate::validate;
