//! Response Schema
//!
//! Declares the sections a backend is instructed to emit, in order, with
//! their marker labels and whether the extractor may substitute a
//! placeholder when they are absent.

/// Whether a section must be present for extraction to succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Required,
    Optional,
}

/// The pipeline field a section maps onto
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRole {
    Analysis,
    Question,
    Answer,
    Explanation,
}

/// One declared section of the expected response
#[derive(Debug, Clone)]
pub struct SectionSpec {
    /// Literal marker label the backend must echo (without framing)
    pub label: String,
    pub role: SectionRole,
    pub requirement: Requirement,
}

impl SectionSpec {
    pub fn new(label: &str, role: SectionRole, requirement: Requirement) -> Self {
        Self {
            label: label.to_string(),
            role,
            requirement,
        }
    }
}

/// Ordered response schema
#[derive(Debug, Clone)]
pub struct ResponseSchema {
    pub sections: Vec<SectionSpec>,
}

impl ResponseSchema {
    /// The clone-question response: Analysis, New Question, Answer,
    /// Explanation, in that order. Analysis and Explanation are optional
    /// with placeholder fallback; the question and answer are not.
    pub fn clone_response() -> Self {
        Self {
            sections: vec![
                SectionSpec::new("Analysis", SectionRole::Analysis, Requirement::Optional),
                SectionSpec::new("New Question", SectionRole::Question, Requirement::Required),
                SectionSpec::new("Answer", SectionRole::Answer, Requirement::Required),
                SectionSpec::new(
                    "Explanation",
                    SectionRole::Explanation,
                    Requirement::Optional,
                ),
            ],
        }
    }
}
