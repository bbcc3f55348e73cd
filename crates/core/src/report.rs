//! Call outcome and the report written once per call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal status of a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    /// A price was settled on.
    Agreed,
    /// The call completed but no price was agreed.
    NoAgreement,
    /// The call completed but neither extraction path could read an
    /// outcome from the transcript.
    ExtractionFailed,
    /// The call never streamed or failed mid-setup.
    Error,
}

/// What the outcome extractor concluded from a finished transcript.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NegotiationOutcome {
    pub status: CallStatus,
    /// Present only when `status` is [`CallStatus::Agreed`].
    pub agreed_price: Option<f64>,
}

impl NegotiationOutcome {
    pub fn agreed(price: f64) -> Self {
        Self {
            status: CallStatus::Agreed,
            agreed_price: Some(price),
        }
    }

    pub fn no_agreement() -> Self {
        Self {
            status: CallStatus::NoAgreement,
            agreed_price: None,
        }
    }

    pub fn extraction_failed() -> Self {
        Self {
            status: CallStatus::ExtractionFailed,
            agreed_price: None,
        }
    }
}

/// The single record persisted when a call reaches its terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallReport {
    pub session_id: String,
    pub status: CallStatus,
    pub agreed_price: Option<f64>,
    /// Role-tagged transcript, one turn per line.
    pub transcript: String,
    pub completed_at: DateTime<Utc>,
}

impl CallReport {
    pub fn from_outcome(
        session_id: impl Into<String>,
        outcome: NegotiationOutcome,
        transcript: String,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            status: outcome.status,
            agreed_price: outcome.agreed_price,
            transcript,
            completed_at: Utc::now(),
        }
    }

    /// Report for a call that failed before or during setup.
    pub fn setup_failure(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            status: CallStatus::Error,
            agreed_price: None,
            transcript: String::new(),
            completed_at: Utc::now(),
        }
    }
}
