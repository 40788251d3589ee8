//! Pipeline Driver
//!
//! Iterates source questions strictly one at a time:
//! prompt → gateway → extract → validate → store write. Each record moves
//! through `Pending → Generating → Extracting → Validating → {Committed |
//! Skipped}`; no transition re-enters an earlier state, and any failure
//! lands the record in Skipped with a logged reason while the driver moves
//! on. A fixed delay follows every processed record regardless of outcome.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::outcome::{Outcome, PassSummary, SkipReason};
use crate::ai::{ModelGateway, ResponseSchema, build_clone_prompt, extract, validate};
use crate::config::Config;
use crate::store::RecordStore;
use crate::types::{CloneRecord, SourceQuestion};

/// Options for one pipeline pass
#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    /// Cap on records processed
    pub limit: Option<usize>,
    /// Log intended writes without touching the store
    pub dry_run: bool,
}

/// Sequential clone-generation driver
pub struct Driver {
    store: Arc<dyn RecordStore>,
    gateway: ModelGateway,
    schema: ResponseSchema,
    alphabet: String,
    model_label: String,
    clones_table: String,
    record_delay: Duration,
}

impl Driver {
    pub fn new(store: Arc<dyn RecordStore>, gateway: ModelGateway, config: &Config) -> Self {
        Self {
            store,
            gateway,
            schema: ResponseSchema::clone_response(),
            alphabet: config.pipeline.answer_alphabet.clone(),
            model_label: config.llm.display_label(),
            clones_table: config.store.clones_table.clone(),
            record_delay: Duration::from_millis(config.pipeline.record_delay_ms),
        }
    }

    /// Run one pass over the given sources. Records already handled upstream
    /// are expected to have been excluded by the store query, not here.
    pub async fn run(&self, sources: Vec<SourceQuestion>, options: &DriverOptions) -> PassSummary {
        let mut summary = PassSummary::default();
        let limit = options.limit.unwrap_or(usize::MAX);

        for source in sources.into_iter().take(limit) {
            let outcome = self.process(&source, options.dry_run).await;

            match &outcome {
                Outcome::Committed { clone_id } => {
                    info!(
                        source = %source.id,
                        clone = clone_id.as_deref().unwrap_or("(dry run)"),
                        "Clone committed"
                    );
                }
                Outcome::Skipped(reason) => {
                    warn!(
                        source = %source.id,
                        stage = reason.kind(),
                        reason = reason.message(),
                        "Record skipped"
                    );
                }
            }

            summary.record(&outcome);

            // Inter-record delay regardless of outcome, for backend rate limits
            sleep(self.record_delay).await;
        }

        info!(
            processed = summary.processed,
            committed = summary.committed,
            skipped = summary.skipped(),
            "Pass complete"
        );
        summary
    }

    /// Drive one record to its terminal state. Every failure is captured as
    /// a `SkipReason`; nothing propagates.
    async fn process(&self, source: &SourceQuestion, dry_run: bool) -> Outcome {
        // Generating
        let prompt = build_clone_prompt(&source.body, &self.schema, &self.alphabet);
        let raw = match self.gateway.generate(&prompt).await {
            Ok(raw) => raw,
            Err(err) => return Outcome::Skipped(SkipReason::Transport(err.to_string())),
        };

        // Extracting
        let fields = match extract(&raw, &self.schema) {
            Ok(fields) => fields,
            Err(err) => {
                debug!(source = %source.id, raw = %raw, "Unparseable model response");
                return Outcome::Skipped(SkipReason::Parse(err.to_string()));
            }
        };

        // Validating
        let fields = match validate(fields, &self.alphabet) {
            Ok(fields) => fields,
            Err(err) => return Outcome::Skipped(SkipReason::Validation(err.to_string())),
        };

        let clone = CloneRecord {
            source_id: source.id.clone(),
            model_label: self.model_label.clone(),
            fields,
        };

        if dry_run {
            info!(
                source = %source.id,
                table = %self.clones_table,
                "Dry run: would insert clone"
            );
            return Outcome::Committed { clone_id: None };
        }

        match self
            .store
            .create_record(&self.clones_table, clone.into_fields())
            .await
        {
            Ok(id) => Outcome::Committed { clone_id: Some(id) },
            Err(err) => Outcome::Skipped(SkipReason::Store(err.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::CompletionProvider;
    use crate::ai::{ModelGateway, RetryPolicy};
    use crate::store::StoreRecord;
    use crate::types::{CopycatError, Result};
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Provider returning a scripted response per call
    struct ScriptedProvider {
        responses: Mutex<VecDeque<Result<String>>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<Result<String>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, _prompt: &str) -> Result<String> {
            self.responses
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_else(|| Err(CopycatError::transport("script exhausted")))
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    /// In-memory store capturing writes
    #[derive(Default)]
    struct MemoryStore {
        created: Mutex<Vec<(String, Map<String, Value>)>>,
    }

    #[async_trait]
    impl RecordStore for MemoryStore {
        async fn query_by_filter(
            &self,
            _table: &str,
            _formula: &str,
            _fields: &[&str],
        ) -> Result<Vec<StoreRecord>> {
            Ok(Vec::new())
        }

        async fn create_record(&self, table: &str, fields: Map<String, Value>) -> Result<String> {
            let mut created = self.created.lock().expect("lock");
            created.push((table.to_string(), fields));
            Ok(format!("rec{}", created.len()))
        }

        async fn update_record(
            &self,
            _table: &str,
            _id: &str,
            _fields: Map<String, Value>,
        ) -> Result<()> {
            Ok(())
        }

        async fn health_check(&self, _table: &str) -> Result<()> {
            Ok(())
        }
    }

    fn fast_config() -> Config {
        let mut config = Config::default();
        config.pipeline.record_delay_ms = 0;
        config.pipeline.base_delay_ms = 1;
        config.pipeline.max_attempts = 1;
        config
    }

    fn driver_with(
        provider: Arc<ScriptedProvider>,
        store: Arc<MemoryStore>,
        config: &Config,
    ) -> Driver {
        let policy = RetryPolicy::from_config(&config.pipeline, &config.llm);
        Driver::new(store, ModelGateway::new(provider, policy), config)
    }

    fn source(id: &str) -> SourceQuestion {
        SourceQuestion {
            id: id.to_string(),
            body: "What is \\(2+2\\)?".to_string(),
        }
    }

    const GOOD_RESPONSE: &str =
        "**Analysis:**\nfoo\n**New Question:**\nWhat is 3+3?\n**Answer:**\nB\n**Explanation:**\nbar";

    #[tokio::test]
    async fn test_batch_survives_per_record_failures() {
        let provider = ScriptedProvider::new(vec![
            Ok(GOOD_RESPONSE.to_string()),
            Ok("no markers at all".to_string()),
            Ok("**New Question:**\nq\n**Answer:**\nAB".to_string()),
            Err(CopycatError::transport("backend down")),
            Ok(GOOD_RESPONSE.to_string()),
        ]);
        let store = Arc::new(MemoryStore::default());
        let config = fast_config();
        let driver = driver_with(provider, store.clone(), &config);

        let sources = (1..=5).map(|i| source(&format!("rec{}", i))).collect();
        let summary = driver.run(sources, &DriverOptions::default()).await;

        assert_eq!(summary.processed, 5);
        assert_eq!(summary.committed, 2);
        assert_eq!(summary.skipped_parse, 1);
        assert_eq!(summary.skipped_validation, 1);
        assert_eq!(summary.skipped_transport, 1);
        assert_eq!(store.created.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_committed_record_field_map() {
        let provider = ScriptedProvider::new(vec![Ok(GOOD_RESPONSE.to_string())]);
        let store = Arc::new(MemoryStore::default());
        let config = fast_config();
        let driver = driver_with(provider, store.clone(), &config);

        driver
            .run(vec![source("recSrc")], &DriverOptions::default())
            .await;

        let created = store.created.lock().unwrap();
        let (table, fields) = &created[0];
        assert_eq!(table, &config.store.clones_table);
        assert_eq!(fields["Clone Question LM"], "What is 3+3?");
        assert_eq!(fields["Answer"], "B");
        assert_eq!(fields["Original Question"], serde_json::json!(["recSrc"]));
        assert_eq!(fields["Explanation"], "bar");
    }

    #[tokio::test]
    async fn test_dry_run_writes_nothing() {
        let provider = ScriptedProvider::new(vec![Ok(GOOD_RESPONSE.to_string())]);
        let store = Arc::new(MemoryStore::default());
        let config = fast_config();
        let driver = driver_with(provider, store.clone(), &config);

        let summary = driver
            .run(
                vec![source("rec1")],
                &DriverOptions {
                    dry_run: true,
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(summary.committed, 1);
        assert!(store.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_limit_caps_processing() {
        let provider = ScriptedProvider::new(vec![
            Ok(GOOD_RESPONSE.to_string()),
            Ok(GOOD_RESPONSE.to_string()),
        ]);
        let store = Arc::new(MemoryStore::default());
        let config = fast_config();
        let driver = driver_with(provider, store.clone(), &config);

        let sources = (1..=4).map(|i| source(&format!("rec{}", i))).collect();
        let summary = driver
            .run(
                sources,
                &DriverOptions {
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await;

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.committed, 2);
    }
}
