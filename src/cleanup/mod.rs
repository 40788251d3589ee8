//! LaTeX Markup Cleanup
//!
//! Deterministic text transforms that normalize stored mathematical markup
//! for MathJax rendering, plus a pass that patches changed records. No
//! model calls are involved; the same input always yields the same output.

use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::store::{RecordStore, filters};
use crate::types::Result;

/// Normalize LaTeX/Markdown markup for MathJax display.
///
/// - `$$…$$` becomes `\[…\]`, unescaped `$…$` becomes `\(…\)`
/// - spacing is fixed around delimiters and collapsed just inside them
/// - doubled backslashes and stray escapes are removed
///
/// Unbalanced delimiters are logged but the text is still returned.
pub fn clean_latex(text: &str) -> String {
    if text.is_empty() {
        return text.to_string();
    }

    // Display math first so its dollars are gone before the inline pass
    let display = Regex::new(r"(?s)\$\$(.*?)\$\$").expect("display math pattern");
    let mut out = display.replace_all(text, r"\[${1}\]").into_owned();

    out = replace_inline_dollars(&out);

    // Space before an opening delimiter and after a closing one
    let before_open = Regex::new(r"([^\s])(\\[\(\[])").expect("pre-delimiter pattern");
    out = before_open.replace_all(&out, "${1} ${2}").into_owned();
    let after_close = Regex::new(r"(\\[\)\]])(\w)").expect("post-delimiter pattern");
    out = after_close.replace_all(&out, "${1} ${2}").into_owned();

    // Collapse whitespace just inside delimiters, keeping the delimiter kind
    let open_pad = Regex::new(r"(\\[\(\[])\s+").expect("open padding pattern");
    out = open_pad.replace_all(&out, "${1}").into_owned();
    let close_pad = Regex::new(r"\s+(\\[\)\]])").expect("close padding pattern");
    out = close_pad.replace_all(&out, "${1}").into_owned();

    // Doubled backslashes and escapes of plain symbols
    out = out.replace("\\\\", "\\");
    let stray_escape = Regex::new(r"\\([^a-zA-Z\s\(\)\[\]])").expect("stray escape pattern");
    out = stray_escape.replace_all(&out, "${1}").into_owned();

    check_balance(&out);

    out
}

/// Pair unescaped `$…$` spans into `\(…\)`. `\$` is a literal dollar and
/// never opens or closes a span; an unpaired dollar is left untouched.
fn replace_inline_dollars(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            out.push(c);
            out.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if c == '$' {
            if let Some(close) = find_closing_dollar(&chars, i + 1) {
                out.push_str("\\(");
                out.extend(&chars[i + 1..close]);
                out.push_str("\\)");
                i = close + 1;
                continue;
            }
        }
        out.push(c);
        i += 1;
    }

    out
}

fn find_closing_dollar(chars: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '$' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

fn check_balance(text: &str) {
    let open_inline = text.matches("\\(").count();
    let close_inline = text.matches("\\)").count();
    let open_display = text.matches("\\[").count();
    let close_display = text.matches("\\]").count();

    if open_inline != close_inline || open_display != close_display {
        warn!(
            open_inline,
            close_inline, open_display, close_display, "Mismatched math delimiters after cleanup"
        );
    }
}

// =============================================================================
// Cleanup Pass
// =============================================================================

/// Options for a cleanup pass
#[derive(Debug, Clone, Default)]
pub struct CleanupOptions {
    pub limit: Option<usize>,
    pub dry_run: bool,
}

/// Counts reported at the end of a cleanup pass
#[derive(Debug, Default, Clone)]
pub struct CleanupSummary {
    pub processed: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

/// Rewrites one text field across a table, patching only changed records.
pub struct CleanupPass {
    store: Arc<dyn RecordStore>,
    table: String,
    field: String,
    patch_delay: Duration,
}

impl CleanupPass {
    pub fn new(store: Arc<dyn RecordStore>, table: &str, field: &str) -> Self {
        Self {
            store,
            table: table.to_string(),
            field: field.to_string(),
            patch_delay: Duration::from_millis(crate::constants::pipeline::CLEANUP_DELAY_MS),
        }
    }

    pub async fn run(&self, options: &CleanupOptions) -> Result<CleanupSummary> {
        let records = self
            .store
            .query_by_filter(&self.table, &filters::non_empty(&self.field), &[&self.field])
            .await?;

        info!(count = records.len(), field = %self.field, "Fetched records for cleanup");

        let mut summary = CleanupSummary::default();
        let limit = options.limit.unwrap_or(usize::MAX);

        for record in records.into_iter().take(limit) {
            summary.processed += 1;

            let Some(original) = record.text_field(&self.field) else {
                summary.unchanged += 1;
                continue;
            };

            let cleaned = clean_latex(original);
            if cleaned == original {
                summary.unchanged += 1;
                continue;
            }

            if options.dry_run {
                info!(record = %record.id, "Dry run: would patch cleaned markup");
                summary.updated += 1;
                continue;
            }

            let mut fields = serde_json::Map::new();
            fields.insert(self.field.clone(), serde_json::json!(cleaned));

            match self
                .store
                .update_record(&self.table, &record.id, fields)
                .await
            {
                Ok(()) => {
                    info!(record = %record.id, "Patched cleaned markup");
                    summary.updated += 1;
                }
                Err(err) => {
                    warn!(record = %record.id, error = %err, "Patch failed");
                    summary.failed += 1;
                }
            }

            // Store rate limiting
            sleep(self.patch_delay).await;
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_math_converted() {
        assert_eq!(clean_latex("$$x^2$$"), "\\[x^2\\]");
    }

    #[test]
    fn test_inline_math_converted() {
        assert_eq!(clean_latex("so $x = 5$ here"), "so \\(x = 5\\) here");
    }

    #[test]
    fn test_spacing_added_around_delimiters() {
        assert_eq!(clean_latex("If$x$then"), "If \\(x\\) then");
    }

    #[test]
    fn test_inner_padding_collapsed_keeps_delimiter_kind() {
        assert_eq!(clean_latex("\\[ x \\]"), "\\[x\\]");
        assert_eq!(clean_latex("\\( x \\)"), "\\(x\\)");
    }

    #[test]
    fn test_doubled_backslash_collapsed() {
        assert_eq!(clean_latex("uses \\\\times here"), "uses \\times here");
    }

    #[test]
    fn test_unpaired_dollar_left_alone() {
        assert_eq!(clean_latex("costs 5 dollars: $"), "costs 5 dollars: $");
    }

    #[test]
    fn test_idempotent_on_clean_input() {
        let clean = "If \\(x = 5\\), then \\[x^2 = 25\\]";
        assert_eq!(clean_latex(clean), clean);
        assert_eq!(clean_latex(&clean_latex(clean)), clean_latex(clean));
    }

    #[test]
    fn test_empty_input_unchanged() {
        assert_eq!(clean_latex(""), "");
    }

    mod pass {
        use super::super::*;
        use crate::store::StoreRecord;
        use crate::types::{CopycatError, Result};
        use async_trait::async_trait;
        use serde_json::{Map, Value, json};
        use std::sync::Mutex;

        struct SeededStore {
            records: Vec<StoreRecord>,
            patched: Mutex<Vec<(String, Map<String, Value>)>>,
        }

        impl SeededStore {
            fn new(values: &[(&str, &str)], field: &str) -> Arc<Self> {
                let records = values
                    .iter()
                    .map(|(id, text)| {
                        let mut fields = Map::new();
                        fields.insert(field.to_string(), json!(text));
                        StoreRecord {
                            id: id.to_string(),
                            fields,
                        }
                    })
                    .collect();
                Arc::new(Self {
                    records,
                    patched: Mutex::new(Vec::new()),
                })
            }
        }

        #[async_trait]
        impl RecordStore for SeededStore {
            async fn query_by_filter(
                &self,
                _table: &str,
                _formula: &str,
                _fields: &[&str],
            ) -> Result<Vec<StoreRecord>> {
                Ok(self.records.clone())
            }

            async fn create_record(
                &self,
                _table: &str,
                _fields: Map<String, Value>,
            ) -> Result<String> {
                Err(CopycatError::Store("not used".into()))
            }

            async fn update_record(
                &self,
                _table: &str,
                id: &str,
                fields: Map<String, Value>,
            ) -> Result<()> {
                self.patched
                    .lock()
                    .expect("lock")
                    .push((id.to_string(), fields));
                Ok(())
            }

            async fn health_check(&self, _table: &str) -> Result<()> {
                Ok(())
            }
        }

        #[tokio::test]
        async fn test_pass_patches_only_changed_records() {
            let field = "Explanation 4o";
            let store = SeededStore::new(
                &[("rec1", "$x$"), ("rec2", "already \\(clean\\)")],
                field,
            );
            let mut pass = CleanupPass::new(store.clone(), "tblQ", field);
            pass.patch_delay = Duration::ZERO;

            let summary = pass.run(&CleanupOptions::default()).await.unwrap();
            assert_eq!(summary.processed, 2);
            assert_eq!(summary.updated, 1);
            assert_eq!(summary.unchanged, 1);

            let patched = store.patched.lock().unwrap();
            assert_eq!(patched.len(), 1);
            assert_eq!(patched[0].0, "rec1");
            assert_eq!(patched[0].1[field], "\\(x\\)");
        }

        #[tokio::test]
        async fn test_dry_run_patches_nothing() {
            let field = "Explanation 4o";
            let store = SeededStore::new(&[("rec1", "$x$")], field);
            let mut pass = CleanupPass::new(store.clone(), "tblQ", field);
            pass.patch_delay = Duration::ZERO;

            let summary = pass
                .run(&CleanupOptions {
                    dry_run: true,
                    ..Default::default()
                })
                .await
                .unwrap();
            assert_eq!(summary.updated, 1);
            assert!(store.patched.lock().unwrap().is_empty());
        }
    }
}
