//! The call bridge: one session per telephony connection, relaying audio
//! to and from the realtime AI engine while aggregating the transcript,
//! then reporting the negotiation outcome exactly once.

pub mod instructions;
pub mod registry;
pub mod session;
pub mod transcript;

pub use instructions::build_instructions;
pub use registry::CallRegistry;
pub use session::{run_call, CallSession, CallState, SessionDeps, SessionOptions, StreamBinding};
pub use transcript::TranscriptLog;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("stream already bound")]
    AlreadyBound,

    #[error("stream ended before start signal")]
    NoStart,

    #[error("context lookup failed: {0}")]
    Context(String),

    #[error("transport error: {0}")]
    Transport(#[from] haggle_transport::TransportError),
}
