//! Field Validator
//!
//! Enforces field-level contracts on extracted fields before anything is
//! written back: the answer is a single letter from the closed alphabet and
//! the question is non-empty. Analysis and explanation are not validated
//! beyond the extractor's placeholder substitution.

use crate::types::{ExtractedFields, ValidationError};

/// Validate extracted fields against the closed answer alphabet.
///
/// Returns the fields unchanged on success so the caller can hand them
/// straight to the store adapter.
pub fn validate(
    fields: ExtractedFields,
    alphabet: &str,
) -> Result<ExtractedFields, ValidationError> {
    if fields.question.trim().is_empty() {
        return Err(ValidationError::new(
            "question",
            "must be non-empty",
            fields.question.clone(),
        ));
    }

    let answer = fields.answer.as_str();
    let mut chars = answer.chars();
    let letter = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        (None, _) => {
            return Err(ValidationError::new("answer", "is empty", answer));
        }
        _ => {
            return Err(ValidationError::new(
                "answer",
                format!("must be exactly one letter, got {} characters", answer.chars().count()),
                answer,
            ));
        }
    };

    if !letter.is_ascii_alphabetic() {
        return Err(ValidationError::new(
            "answer",
            "must be an ASCII letter",
            answer,
        ));
    }

    if !alphabet.contains(letter) {
        return Err(ValidationError::new(
            "answer",
            format!("must be one of {}", alphabet),
            answer,
        ));
    }

    Ok(fields)
}
