//! Trait seams the bridge is driven through.
//!
//! The session loop never touches a socket type directly; it reads and
//! writes through these traits so the server can hand it real websocket
//! halves while tests hand it channel-backed doubles.

use async_trait::async_trait;

use crate::realtime::{RealtimeClientEvent, RealtimeServerEvent};
use crate::telephony::TelephonyMessage;
use crate::TransportError;

/// Read half of the telephony media stream.
///
/// Implementations skip unrecognized frames internally; `None` means the
/// peer closed the stream.
#[async_trait]
pub trait TelephonyStream: Send {
    async fn recv(&mut self) -> Option<Result<TelephonyMessage, TransportError>>;
}

/// Write half of the telephony media stream.
#[async_trait]
pub trait TelephonySink: Send {
    async fn send(&mut self, msg: TelephonyMessage) -> Result<(), TransportError>;
}

/// Read half of the realtime AI connection.
#[async_trait]
pub trait RealtimeStream: Send {
    async fn recv(&mut self) -> Option<Result<RealtimeServerEvent, TransportError>>;
}

/// Write half of the realtime AI connection.
#[async_trait]
pub trait RealtimeSink: Send {
    async fn send(&mut self, event: RealtimeClientEvent) -> Result<(), TransportError>;
}

/// Factory for realtime AI connections, one per call.
#[async_trait]
pub trait RealtimeConnector: Send + Sync {
    async fn connect(
        &self,
    ) -> Result<(Box<dyn RealtimeSink>, Box<dyn RealtimeStream>), TransportError>;
}
