//! Wire protocols and audio plumbing for both legs of the bridge.
//!
//! The telephony leg speaks JSON frames carrying base64 mu-law audio at
//! 8 kHz; the realtime AI leg speaks JSON events carrying base64 PCM16
//! at 24 kHz. This crate owns both framings, the transcoding pipelines
//! between them, and the trait seams the bridge is driven through.

pub mod client;
pub mod codec;
pub mod realtime;
pub mod telephony;
pub mod traits;

pub use client::RealtimeClient;
pub use codec::{AiToTelephony, StreamResampler, TelephonyToAi};
pub use realtime::{
    MessageItem, RealtimeClientEvent, RealtimeServerEvent, ResponsePayload, SessionConfig,
};
pub use telephony::{MediaFrame, StartFrame, TelephonyMessage};
pub use traits::{RealtimeConnector, RealtimeSink, RealtimeStream, TelephonySink, TelephonyStream};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("websocket error: {0}")]
    WebSocket(String),

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("malformed frame: {0}")]
    Frame(String),

    #[error("media payload error: {0}")]
    Media(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::WebSocket(err.to_string())
    }
}

impl From<base64::DecodeError> for TransportError {
    fn from(err: base64::DecodeError) -> Self {
        TransportError::Media(format!("invalid base64: {err}"))
    }
}
