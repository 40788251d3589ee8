//! Response Extractor
//!
//! Parses raw model text into typed fields using the declared section order.
//! Backends are inconsistent about emphasis markup, so each section marker is
//! matched in both framings — `**Label:**` and `Label:` — as alternatives in
//! one pattern, with the engine's leftmost-match rule deciding. A section's
//! content runs to the earliest later-declared marker after it, or end of
//! text. Sections are searched independently over the whole text.

use regex::Regex;

use super::schema::{Requirement, ResponseSchema, SectionRole};
use crate::types::{CopycatError, ExtractedFields, Result, SectionValue};

/// Extract the declared sections from a raw response.
///
/// Optional sections that cannot be located become `SectionValue::Missing`;
/// a missing required section is a parse failure naming the section. The
/// answer capture is reduced to its first non-empty line and stripped of
/// surrounding punctuation; the alphabet itself is the validator's concern.
pub fn extract(raw: &str, schema: &ResponseSchema) -> Result<ExtractedFields> {
    let markers: Vec<Regex> = schema
        .sections
        .iter()
        .map(|s| marker_pattern(&s.label))
        .collect();

    let mut analysis = SectionValue::Missing;
    let mut question: Option<String> = None;
    let mut answer: Option<String> = None;
    let mut explanation = SectionValue::Missing;

    for (idx, section) in schema.sections.iter().enumerate() {
        let captured = capture_section(raw, idx, &markers);

        let captured = match (captured, section.requirement) {
            (Some(text), _) => Some(text),
            (None, Requirement::Optional) => None,
            (None, Requirement::Required) => {
                return Err(CopycatError::Parse(format!(
                    "Required section '{}' not found in response",
                    section.label
                )));
            }
        };

        match section.role {
            SectionRole::Analysis => {
                analysis = captured.map_or(SectionValue::Missing, SectionValue::Present);
            }
            SectionRole::Question => question = captured,
            SectionRole::Answer => answer = captured.map(|text| normalize_answer(&text)),
            SectionRole::Explanation => {
                explanation = captured.map_or(SectionValue::Missing, SectionValue::Present);
            }
        }
    }

    // Required roles are Some here or we bailed above; a schema without them
    // is a caller bug surfaced as a parse error rather than a panic.
    let question = question
        .ok_or_else(|| CopycatError::Parse("Schema declares no question section".into()))?;
    let answer =
        answer.ok_or_else(|| CopycatError::Parse("Schema declares no answer section".into()))?;

    Ok(ExtractedFields {
        analysis,
        question,
        answer,
        explanation,
    })
}

/// Both marker framings as alternatives in one pattern. The emphasized form
/// is listed first but leftmost position, not alternative order, decides.
fn marker_pattern(label: &str) -> Regex {
    let escaped = regex::escape(label);
    // The label is escaped, so the pattern cannot fail to parse
    Regex::new(&format!(r"\*\*{escaped}:\*\*|{escaped}:")).expect("section marker pattern")
}

/// Locate section `idx` and capture its content up to the earliest
/// later-declared marker, whitespace-trimmed.
fn capture_section(raw: &str, idx: usize, markers: &[Regex]) -> Option<String> {
    let marker = markers[idx].find(raw)?;
    let content_start = marker.end();

    let content_end = markers[idx + 1..]
        .iter()
        .filter_map(|later| later.find_at(raw, content_start))
        .map(|m| m.start())
        .min()
        .unwrap_or(raw.len());

    Some(raw[content_start..content_end].trim().to_string())
}

/// First non-empty line, stripped of surrounding punctuation and emphasis.
fn normalize_answer(captured: &str) -> String {
    let line = captured
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    line.trim_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn schema() -> ResponseSchema {
        ResponseSchema::clone_response()
    }

    #[test]
    fn test_full_emphasized_response() {
        let raw = "**Analysis:**\nfoo\n**New Question:**\nWhat is 2+2?\n**Answer:**\nB\n**Explanation:**\nbar";
        let fields = extract(raw, &schema()).unwrap();
        assert_eq!(fields.analysis, SectionValue::Present("foo".into()));
        assert_eq!(fields.question, "What is 2+2?");
        assert_eq!(fields.answer, "B");
        assert_eq!(fields.explanation, SectionValue::Present("bar".into()));
    }

    #[test]
    fn test_plain_markers_accepted() {
        let raw = "Analysis:\nfoo\nNew Question:\nWhat is 3+3?\nAnswer:\nC\nExplanation:\nbar";
        let fields = extract(raw, &schema()).unwrap();
        assert_eq!(fields.question, "What is 3+3?");
        assert_eq!(fields.answer, "C");
    }

    #[test]
    fn test_mixed_marker_styles() {
        let raw = "**Analysis:**\nfoo\nNew Question:\nmixed\n**Answer:**\nA\nExplanation:\nbar";
        let fields = extract(raw, &schema()).unwrap();
        assert_eq!(fields.question, "mixed");
        assert_eq!(fields.answer, "A");
    }

    #[test]
    fn test_missing_answer_is_parse_failure() {
        let raw = "**Analysis:**\nfoo\n**New Question:**\nWhat is 2+2?\n**Explanation:**\nbar";
        let err = extract(raw, &schema()).unwrap_err();
        assert!(matches!(err, CopycatError::Parse(_)));
        assert!(err.to_string().contains("Answer"));
    }

    #[test]
    fn test_missing_optional_sections_fall_back() {
        let raw = "**New Question:**\nWhat is 2+2?\n**Answer:**\nD";
        let fields = extract(raw, &schema()).unwrap();
        assert_eq!(fields.analysis, SectionValue::Missing);
        assert_eq!(fields.explanation, SectionValue::Missing);
        assert_eq!(fields.answer, "D");
    }

    #[test]
    fn test_answer_first_line_and_punctuation_stripped() {
        let raw = "**New Question:**\nq\n**Answer:**\n\n  (B).  \nbecause reasons\n**Explanation:**\ne";
        let fields = extract(raw, &schema()).unwrap();
        assert_eq!(fields.answer, "B");
    }

    #[test]
    fn test_answer_emphasis_stripped() {
        let raw = "**New Question:**\nq\n**Answer:**\n**E**\n**Explanation:**\ne";
        let fields = extract(raw, &schema()).unwrap();
        assert_eq!(fields.answer, "E");
    }

    #[test]
    fn test_multicharacter_answer_survives_extraction() {
        // Validation, not extraction, rejects this
        let raw = "**New Question:**\nq\n**Answer:**\nAB\n**Explanation:**\ne";
        let fields = extract(raw, &schema()).unwrap();
        assert_eq!(fields.answer, "AB");
    }

    #[test]
    fn test_leftmost_marker_wins() {
        // A plain marker before the emphasized one is taken first; the
        // capture is bounded only by later-declared sections, so the
        // duplicate marker stays inside the content
        let raw = "New Question:\nfirst\n**New Question:**\nsecond\n**Answer:**\nA";
        let fields = extract(raw, &schema()).unwrap();
        assert_eq!(fields.question, "first\n**New Question:**\nsecond");
    }

    #[test]
    fn test_question_round_trip() {
        let raw = "**New Question:**\nIf \\( x = 5 \\), what is \\( x^2 \\)?\n(A) \\(10\\)\n(B) \\(25\\)\n**Answer:**\nB";
        let first = extract(raw, &schema()).unwrap();

        let rebuilt = format!(
            "**New Question:**\n{}\n**Answer:**\n{}",
            first.question, first.answer
        );
        let second = extract(&rebuilt, &schema()).unwrap();
        assert_eq!(second.question, first.question);
        assert_eq!(second.answer, first.answer);
    }

    proptest! {
        #[test]
        fn prop_extraction_is_deterministic(body in "[a-zA-Z0-9 \\n]{0,80}", ans in "[A-E]") {
            let raw = format!("**New Question:**\n{}\n**Answer:**\n{}", body, ans);
            let a = extract(&raw, &schema()).unwrap();
            let b = extract(&raw, &schema()).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_clean_question_round_trips(body in "[a-zA-Z0-9?+= ]{1,60}", ans in "[A-E]") {
            let body = body.trim().to_string();
            prop_assume!(!body.is_empty());
            let raw = format!("**New Question:**\n{}\n**Answer:**\n{}", body, ans);
            let first = extract(&raw, &schema()).unwrap();
            let rebuilt = format!("**New Question:**\n{}\n**Answer:**\n{}", first.question, first.answer);
            let second = extract(&rebuilt, &schema()).unwrap();
            prop_assert_eq!(first.question, second.question);
        }
    }
}
