use async_trait::async_trait;

use haggle_core::{CallReport, NegotiationContext};

use crate::PersistenceError;

/// Source of per-call negotiation contexts.
#[async_trait]
pub trait ContextStore: Send + Sync {
    /// Fetch the context stored under `key`; `Ok(None)` when the key is
    /// unknown.
    async fn fetch(&self, key: &str) -> Result<Option<NegotiationContext>, PersistenceError>;
}

/// Destination for the one report each call produces.
#[async_trait]
pub trait CallReportSink: Send + Sync {
    async fn report(&self, report: CallReport) -> Result<(), PersistenceError>;
}
