//! Cleanup Command
//!
//! Runs a deterministic LaTeX cleanup pass over one text field of the
//! questions table, patching only records whose markup actually changed.

use std::sync::Arc;

use crate::cleanup::{CleanupOptions, CleanupPass};
use crate::cli::ui::output::Output;
use crate::config::ConfigLoader;
use crate::constants::store as store_constants;
use crate::store::{AirtableStore, RecordStore};
use crate::types::Result;

pub async fn run(field: Option<String>, limit: Option<usize>, dry_run: bool) -> Result<()> {
    let output = Output::new();

    let config = ConfigLoader::load()?;
    let store: Arc<dyn RecordStore> = Arc::new(AirtableStore::new(&config.store)?);

    store.health_check(&config.store.questions_table).await?;

    let field = field.unwrap_or_else(|| store_constants::CLEANUP_FIELD.to_string());
    output.info(&format!(
        "Cleaning field {:?}{}",
        field,
        if dry_run { " (dry run)" } else { "" }
    ));

    let pass = CleanupPass::new(store, &config.store.questions_table, &field);
    let summary = pass.run(&CleanupOptions { limit, dry_run }).await?;

    output.section("Cleanup summary");
    output.success(&format!("Updated: {}", summary.updated));
    output.info(&format!("Unchanged: {}", summary.unchanged));
    if summary.failed > 0 {
        output.warning(&format!("Failed patches: {}", summary.failed));
    }
    output.info(&format!("Total processed: {}", summary.processed));

    Ok(())
}
