//! Generate Command
//!
//! Runs one clone-generation pass: fetch source questions for a test
//! number (or a single record), drive each through the pipeline, report
//! the pass summary.

use std::io::{self, Write};
use std::sync::Arc;

use tracing::warn;

use crate::ai::{ModelGateway, RetryPolicy, create_provider};
use crate::cli::ui::output::Output;
use crate::config::{Config, ConfigLoader};
use crate::constants::store as store_constants;
use crate::pipeline::{Driver, DriverOptions};
use crate::store::{AirtableStore, RecordStore, filters};
use crate::types::{CopycatError, Result, SourceQuestion};

/// Options collected from the command line
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Test number selecting the source batch; prompted for when absent
    pub test_number: Option<String>,
    /// Cap on records processed
    pub limit: Option<usize>,
    /// Log intended writes without writing
    pub dry_run: bool,
    /// Process a single source record by identifier
    pub record: Option<String>,
    /// Backend override
    pub provider: Option<String>,
    /// Model override
    pub model: Option<String>,
}

pub async fn run(options: GenerateOptions) -> Result<()> {
    let output = Output::new();

    let mut config = ConfigLoader::load()?;
    apply_overrides(&mut config, &options);

    let store: Arc<dyn RecordStore> = Arc::new(AirtableStore::new(&config.store)?);
    let provider = create_provider(&config.llm)?;
    let gateway = ModelGateway::new(
        provider,
        RetryPolicy::from_config(&config.pipeline, &config.llm),
    );

    // Fail before any record is touched if the store is unreachable
    store.health_check(&config.store.questions_table).await?;

    let formula = match &options.record {
        Some(id) => filters::record_id(id),
        None => {
            let test_number = match &options.test_number {
                Some(value) => value.clone(),
                None => prompt_test_number()?,
            };
            filters::sources_for_test(&test_number)
        }
    };

    let records = store
        .query_by_filter(
            &config.store.questions_table,
            &formula,
            &[store_constants::SOURCE_BODY_FIELD],
        )
        .await?;

    let sources: Vec<SourceQuestion> = records
        .iter()
        .filter_map(|record| match record.text_field(store_constants::SOURCE_BODY_FIELD) {
            Some(body) => Some(SourceQuestion {
                id: record.id.clone(),
                body: body.to_string(),
            }),
            None => {
                warn!(record = %record.id, "Source record has no question body, skipping");
                None
            }
        })
        .collect();

    if sources.is_empty() {
        output.warning("No source questions matched the filter");
        return Ok(());
    }

    output.info(&format!(
        "Processing {} source question(s) with {}{}",
        sources.len(),
        gateway.backend_name(),
        if options.dry_run { " (dry run)" } else { "" }
    ));

    let driver = Driver::new(store, gateway, &config);
    let summary = driver
        .run(
            sources,
            &DriverOptions {
                limit: options.limit,
                dry_run: options.dry_run,
            },
        )
        .await;

    output.section("Pass summary");
    output.success(&format!("Committed: {}", summary.committed));
    if summary.skipped() > 0 {
        output.warning(&format!(
            "Skipped: {} (transport {}, parse {}, validation {}, store {})",
            summary.skipped(),
            summary.skipped_transport,
            summary.skipped_parse,
            summary.skipped_validation,
            summary.skipped_store
        ));
    }
    output.info(&format!("Total processed: {}", summary.processed));

    Ok(())
}

/// CLI overrides beat file and environment configuration. A provider switch
/// drops the previously resolved credentials so the right key variable is
/// picked up for the new backend.
fn apply_overrides(config: &mut Config, options: &GenerateOptions) {
    if let Some(provider) = &options.provider
        && *provider != config.llm.provider
    {
        config.llm.provider = provider.clone();
        config.llm.api_key = None;
        config.llm.api_base = None;
        config.llm.model = None;
        config.llm.label = None;
        ConfigLoader::apply_credential_env(config);
    }
    if let Some(model) = &options.model {
        config.llm.model = Some(model.clone());
    }
}

/// Interactive fallback matching the historical workflow.
fn prompt_test_number() -> Result<String> {
    print!("Enter the Test Number: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;

    let test_number = line.trim().to_string();
    if test_number.is_empty() {
        return Err(CopycatError::Config(
            "No test number given".to_string(),
        ));
    }
    Ok(test_number)
}
