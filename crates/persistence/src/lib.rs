//! Context store and call report sink.
//!
//! The bridge reads one [`haggle_core::NegotiationContext`] per call and
//! writes one [`haggle_core::CallReport`] when the call ends. Both go
//! through trait seams; the REST implementation talks to a
//! PostgREST-style API, and the in-memory one backs tests and local
//! development.

pub mod memory;
pub mod rest;
pub mod traits;

pub use memory::{MemorySink, MemoryStore};
pub use rest::RestStore;
pub use traits::{CallReportSink, ContextStore};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected response ({status}): {body}")]
    Response { status: u16, body: String },

    #[error("invalid row: {0}")]
    InvalidRow(String),
}

impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        PersistenceError::Request(err.to_string())
    }
}
