//! Shared domain types for the haggle call bridge.
//!
//! Everything here is plain data: audio frame descriptions, transcript
//! entries, the negotiation context fetched per call, and the report
//! written once the call ends. Behaviour lives in the crates that move
//! these values around.

pub mod audio;
pub mod context;
pub mod report;
pub mod transcript;

pub use audio::{AudioEncoding, AudioFormat, AudioFrame};
pub use context::NegotiationContext;
pub use report::{CallReport, CallStatus, NegotiationOutcome};
pub use transcript::{render_transcript, TranscriptEntry, TurnRole};
