//! In-memory store and sink for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use haggle_core::{CallReport, NegotiationContext};

use crate::traits::{CallReportSink, ContextStore};
use crate::PersistenceError;

#[derive(Default)]
pub struct MemoryStore {
    contexts: RwLock<HashMap<String, NegotiationContext>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, context: NegotiationContext) {
        self.contexts.write().insert(key.into(), context);
    }
}

#[async_trait]
impl ContextStore for MemoryStore {
    async fn fetch(&self, key: &str) -> Result<Option<NegotiationContext>, PersistenceError> {
        Ok(self.contexts.read().get(key).cloned())
    }
}

#[derive(Default)]
pub struct MemorySink {
    reports: Mutex<Vec<CallReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<CallReport> {
        self.reports.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.reports.lock().len()
    }
}

#[async_trait]
impl CallReportSink for MemorySink {
    async fn report(&self, report: CallReport) -> Result<(), PersistenceError> {
        self.reports.lock().push(report);
        Ok(())
    }
}
