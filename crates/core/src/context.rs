//! Negotiation context fetched before a call starts streaming.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Everything the voice agent needs to know about one negotiation.
///
/// Fetched from the context store keyed by the identifier carried in the
/// telephony start signal. A call cannot stream without it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NegotiationContext {
    /// Who we are negotiating with, e.g. a plumbing company name.
    pub counterparty: String,
    /// Short description of the job being priced.
    pub problem: String,
    /// Service location, typically a postal code.
    pub location: String,
    /// The highest price the agent should accept.
    pub ceiling_price: f64,
    /// Free-form question/answer pairs gathered ahead of the call,
    /// folded into the instructions verbatim.
    #[serde(default)]
    pub extra_answers: BTreeMap<String, String>,
}

impl NegotiationContext {
    pub fn new(
        counterparty: impl Into<String>,
        problem: impl Into<String>,
        location: impl Into<String>,
        ceiling_price: f64,
    ) -> Self {
        Self {
            counterparty: counterparty.into(),
            problem: problem.into(),
            location: location.into(),
            ceiling_price,
            extra_answers: BTreeMap::new(),
        }
    }
}
