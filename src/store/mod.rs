//! Record Store
//!
//! Adapter for the external record store. The pipeline depends only on the
//! `RecordStore` trait — record identifier plus field-map shape — so tests
//! can run against an in-memory store.

mod airtable;

pub use airtable::AirtableStore;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::types::Result;

/// A record as returned by the store: identifier plus field map.
#[derive(Debug, Clone)]
pub struct StoreRecord {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl StoreRecord {
    /// Fetch a text field, if present and a string.
    pub fn text_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

/// The store operations the pipeline needs. Pagination is the adapter's
/// concern; callers always see the full result sequence.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch all records matching a filter formula, restricted to the given
    /// fields.
    async fn query_by_filter(
        &self,
        table: &str,
        formula: &str,
        fields: &[&str],
    ) -> Result<Vec<StoreRecord>>;

    /// Create a record, returning its new identifier.
    async fn create_record(&self, table: &str, fields: Map<String, Value>) -> Result<String>;

    /// Patch an existing record.
    async fn update_record(&self, table: &str, id: &str, fields: Map<String, Value>) -> Result<()>;

    /// Connectivity self-test, run once before a pass.
    async fn health_check(&self, table: &str) -> Result<()>;
}

/// Filter formula builders for the queries the pipeline issues.
pub mod filters {
    use crate::constants::store as store_constants;

    fn quote(value: &str) -> String {
        value.replace('\'', "\\'")
    }

    /// Source questions for one test number, cleared for cloning upstream.
    pub fn sources_for_test(test_number: &str) -> String {
        format!(
            "AND({{Test Number}} = '{}', {{AI Check}} = '{}')",
            quote(test_number),
            store_constants::SOURCE_READY_CHECK
        )
    }

    /// A single record by identifier.
    pub fn record_id(id: &str) -> String {
        format!("RECORD_ID() = '{}'", quote(id))
    }

    /// Records where a field is non-empty.
    pub fn non_empty(field: &str) -> String {
        format!("NOT({{{}}} = '')", field)
    }

}
