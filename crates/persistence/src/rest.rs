//! PostgREST-style store: contexts from a `providers` table, reports
//! into a `call_reports` table.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use haggle_core::{CallReport, NegotiationContext};

use crate::traits::{CallReportSink, ContextStore};
use crate::PersistenceError;

pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

/// Row shape of the `providers` table.
#[derive(Debug, Deserialize)]
struct ProviderRow {
    #[serde(default)]
    service_provider: String,
    #[serde(default)]
    problem: String,
    #[serde(default)]
    zip_code: String,
    max_price: f64,
    #[serde(default)]
    context_answers: BTreeMap<String, String>,
}

impl TryFrom<ProviderRow> for NegotiationContext {
    type Error = PersistenceError;

    fn try_from(row: ProviderRow) -> Result<Self, Self::Error> {
        if !row.max_price.is_finite() || row.max_price <= 0.0 {
            return Err(PersistenceError::InvalidRow(format!(
                "max_price {} is not a usable ceiling",
                row.max_price
            )));
        }
        Ok(NegotiationContext {
            counterparty: row.service_provider,
            problem: row.problem,
            location: row.zip_code,
            ceiling_price: row.max_price,
            extra_answers: row.context_answers,
        })
    }
}

#[async_trait]
impl ContextStore for RestStore {
    async fn fetch(&self, key: &str) -> Result<Option<NegotiationContext>, PersistenceError> {
        let response = self
            .request(
                reqwest::Method::GET,
                &format!("/rest/v1/providers?id=eq.{key}&select=*"),
            )
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceError::Response {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let mut rows: Vec<ProviderRow> = response.json().await?;
        debug!(key, found = !rows.is_empty(), "context lookup");
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(rows.remove(0).try_into()?))
    }
}

#[async_trait]
impl CallReportSink for RestStore {
    async fn report(&self, report: CallReport) -> Result<(), PersistenceError> {
        let response = self
            .request(reqwest::Method::POST, "/rest/v1/call_reports")
            .header("Prefer", "return=minimal")
            .json(&report)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PersistenceError::Response {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        debug!(session_id = %report.session_id, "call report persisted");
        Ok(())
    }
}
