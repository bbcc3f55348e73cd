//! Post-call outcome extraction.
//!
//! Once a call closes, its transcript is turned into a
//! [`haggle_core::NegotiationOutcome`]: a chat-completion model is asked
//! for the final price when one is configured, and a deterministic
//! pattern scan over the transcript backs it up.

pub mod extractor;
pub mod inference;
pub mod patterns;

pub use extractor::OutcomeExtractor;
pub use inference::{ChatInference, PriceAnswer, PriceInference};
pub use patterns::last_price_mention;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("inference request failed: {0}")]
    Request(String),

    #[error("inference response malformed: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for OutcomeError {
    fn from(err: reqwest::Error) -> Self {
        OutcomeError::Request(err.to_string())
    }
}
