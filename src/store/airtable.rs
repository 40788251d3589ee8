//! Airtable REST Adapter
//!
//! Implements `RecordStore` over the Airtable v0 REST API: filtered reads
//! with transparent offset pagination, record creation, and PATCH updates.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::debug;

use super::{RecordStore, StoreRecord};
use crate::config::StoreConfig;
use crate::constants::store as store_constants;
use crate::types::{CopycatError, Result};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Airtable-backed record store with secure key handling
pub struct AirtableStore {
    api_key: SecretString,
    base_url: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for AirtableStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableStore")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl AirtableStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        config.require()?;

        let api_key = config
            .api_key
            .clone()
            .unwrap_or_default();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| CopycatError::Store(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            api_key: SecretString::from(api_key),
            base_url: format!("{}/{}", store_constants::API_ROOT, config.base_id),
            client,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.base_url, table)
    }

    fn auth_header(&self) -> String {
        format!("Bearer {}", self.api_key.expose_secret())
    }

    async fn check_status(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(CopycatError::Store(format!(
            "{} failed ({}): {}",
            context, status, body
        )))
    }
}

#[async_trait]
impl RecordStore for AirtableStore {
    async fn query_by_filter(
        &self,
        table: &str,
        formula: &str,
        fields: &[&str],
    ) -> Result<Vec<StoreRecord>> {
        let url = self.table_url(table);
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut params: Vec<(String, String)> =
                vec![("filterByFormula".to_string(), formula.to_string())];
            for field in fields {
                params.push(("fields[]".to_string(), (*field).to_string()));
            }
            if let Some(cursor) = &offset {
                params.push(("offset".to_string(), cursor.clone()));
            }

            let response = self
                .client
                .get(&url)
                .header("Authorization", self.auth_header())
                .query(&params)
                .send()
                .await
                .map_err(|e| CopycatError::Store(format!("Fetch from {} failed: {}", table, e)))?;

            let response = Self::check_status(response, "Record query").await?;
            let page: QueryResponse = response
                .json()
                .await
                .map_err(|e| CopycatError::Store(format!("Malformed query response: {}", e)))?;

            records.extend(page.records.into_iter().map(|r| StoreRecord {
                id: r.id,
                fields: r.fields,
            }));

            match page.offset {
                Some(cursor) => offset = Some(cursor),
                None => break,
            }
        }

        debug!(table, count = records.len(), "Fetched records");
        Ok(records)
    }

    async fn create_record(&self, table: &str, fields: Map<String, Value>) -> Result<String> {
        let response = self
            .client
            .post(self.table_url(table))
            .header("Authorization", self.auth_header())
            .json(&WriteRequest { fields })
            .send()
            .await
            .map_err(|e| CopycatError::Store(format!("Insert into {} failed: {}", table, e)))?;

        let response = Self::check_status(response, "Record insert").await?;
        let created: WrittenRecord = response
            .json()
            .await
            .map_err(|e| CopycatError::Store(format!("Malformed insert response: {}", e)))?;

        Ok(created.id)
    }

    async fn update_record(&self, table: &str, id: &str, fields: Map<String, Value>) -> Result<()> {
        let url = format!("{}/{}", self.table_url(table), id);
        let response = self
            .client
            .patch(&url)
            .header("Authorization", self.auth_header())
            .json(&WriteRequest { fields })
            .send()
            .await
            .map_err(|e| CopycatError::Store(format!("Update of {} failed: {}", id, e)))?;

        Self::check_status(response, "Record update").await?;
        Ok(())
    }

    async fn health_check(&self, table: &str) -> Result<()> {
        let response = self
            .client
            .get(self.table_url(table))
            .header("Authorization", self.auth_header())
            .query(&[("maxRecords", "1")])
            .send()
            .await
            .map_err(|e| CopycatError::Store(format!("Connectivity test failed: {}", e)))?;

        Self::check_status(response, "Connectivity test").await?;
        Ok(())
    }
}

// Wire types

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    records: Vec<WireRecord>,
    #[serde(default)]
    offset: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Serialize)]
struct WriteRequest {
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct WrittenRecord {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_config() -> StoreConfig {
        StoreConfig {
            api_key: Some("key".to_string()),
            base_id: "appTest".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_base_url_shape() {
        let store = AirtableStore::new(&store_config()).unwrap();
        assert_eq!(
            store.table_url("tblX"),
            "https://api.airtable.com/v0/appTest/tblX"
        );
    }

    #[test]
    fn test_missing_credentials_rejected() {
        let config = StoreConfig::default();
        assert!(AirtableStore::new(&config).is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let store = AirtableStore::new(&store_config()).unwrap();
        let repr = format!("{:?}", store);
        assert!(repr.contains("[REDACTED]"));
        assert!(!repr.contains("key\""));
    }

    #[test]
    fn test_query_response_parsing() {
        let json = r#"{
            "records": [
                {"id": "rec1", "fields": {"LatexMarkdown": "What is \\(2+2\\)?"}},
                {"id": "rec2", "fields": {}}
            ],
            "offset": "itrNext"
        }"#;
        let page: QueryResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].id, "rec1");
        assert_eq!(page.offset.as_deref(), Some("itrNext"));
    }

    #[test]
    fn test_final_page_has_no_offset() {
        let json = r#"{"records": []}"#;
        let page: QueryResponse = serde_json::from_str(json).unwrap();
        assert!(page.records.is_empty());
        assert!(page.offset.is_none());
    }
}
