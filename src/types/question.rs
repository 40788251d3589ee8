//! Domain Records
//!
//! Types flowing through the clone pipeline: the source question read from
//! the store, the fields extracted from a model response, and the clone
//! record written back.

use serde_json::{Map, Value, json};

use crate::constants::pipeline as pipeline_constants;

/// A source question as read from the record store. Immutable input.
#[derive(Debug, Clone)]
pub struct SourceQuestion {
    /// Store record identifier
    pub id: String,
    /// LaTeX/Markdown body containing the question to clone
    pub body: String,
}

/// A section the extractor may or may not have located.
///
/// Optional sections resolve to a fixed placeholder at write time instead of
/// carrying sentinel strings through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionValue {
    Present(String),
    Missing,
}

impl SectionValue {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Resolve to the captured text or the given placeholder.
    pub fn or_placeholder(&self, placeholder: &str) -> String {
        match self {
            Self::Present(text) => text.clone(),
            Self::Missing => placeholder.to_string(),
        }
    }
}

/// Fields parsed out of a raw model response.
///
/// `question` and `answer` are required for the record to be usable;
/// `analysis` and `explanation` may be absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    pub analysis: SectionValue,
    pub question: String,
    pub answer: String,
    pub explanation: SectionValue,
}

/// The clone written back to the store after validation.
#[derive(Debug, Clone)]
pub struct CloneRecord {
    /// Identifier of the source question this clone was derived from
    pub source_id: String,
    /// Label of the generating model, stored for provenance
    pub model_label: String,
    pub fields: ExtractedFields,
}

impl CloneRecord {
    /// Render as the store field map.
    pub fn into_fields(self) -> Map<String, Value> {
        let explanation = self
            .fields
            .explanation
            .or_placeholder(pipeline_constants::MISSING_EXPLANATION);

        let mut map = Map::new();
        map.insert("Clone Question LM".into(), json!(self.fields.question));
        map.insert("Answer".into(), json!(self.fields.answer));
        map.insert("Original Question".into(), json!([self.source_id]));
        map.insert("AI Model".into(), json!(self.model_label));
        map.insert("Explanation".into(), json!(explanation));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_value_placeholder() {
        let present = SectionValue::Present("found".into());
        assert_eq!(present.or_placeholder("fallback"), "found");

        let missing = SectionValue::Missing;
        assert_eq!(missing.or_placeholder("fallback"), "fallback");
        assert!(!missing.is_present());
    }

    #[test]
    fn test_clone_record_field_map() {
        let record = CloneRecord {
            source_id: "rec123".into(),
            model_label: "DeepSeek R1".into(),
            fields: ExtractedFields {
                analysis: SectionValue::Present("why students miss it".into()),
                question: "What is \\(2+2\\)?".into(),
                answer: "B".into(),
                explanation: SectionValue::Missing,
            },
        };

        let map = record.into_fields();
        assert_eq!(map["Clone Question LM"], "What is \\(2+2\\)?");
        assert_eq!(map["Answer"], "B");
        assert_eq!(map["Original Question"], json!(["rec123"]));
        assert_eq!(map["AI Model"], "DeepSeek R1");
        assert_eq!(
            map["Explanation"],
            crate::constants::pipeline::MISSING_EXPLANATION
        );
    }
}
