//! Websocket endpoint for the telephony media stream.
//!
//! Each accepted socket becomes one call session; the socket halves are
//! wrapped into the transport traits and handed to the bridge.

use async_trait::async_trait;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tracing::info;

use haggle_bridge::{run_call, CallSession};
use haggle_transport::{TelephonyMessage, TelephonySink, TelephonyStream, TransportError};

use crate::state::AppState;

pub async fn media_stream_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| handle_media_stream(socket, state))
}

async fn handle_media_stream(socket: WebSocket, state: AppState) {
    let session = CallSession::new();
    info!(session_id = %session.id(), "telephony stream connected");

    let (write, read) = socket.split();
    run_call(
        session.clone(),
        state.registry.clone(),
        state.deps.clone(),
        WsTelephonyStream { inner: read },
        WsTelephonySink { inner: write },
    )
    .await;

    info!(session_id = %session.id(), state = ?session.state(), "telephony stream closed");
}

struct WsTelephonyStream {
    inner: SplitStream<WebSocket>,
}

#[async_trait]
impl TelephonyStream for WsTelephonyStream {
    async fn recv(&mut self) -> Option<Result<TelephonyMessage, TransportError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => {
                    return Some(
                        serde_json::from_str(&text)
                            .map_err(|e| TransportError::Frame(e.to_string())),
                    )
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                Err(e) => return Some(Err(TransportError::WebSocket(e.to_string()))),
            }
        }
    }
}

struct WsTelephonySink {
    inner: SplitSink<WebSocket, Message>,
}

#[async_trait]
impl TelephonySink for WsTelephonySink {
    async fn send(&mut self, msg: TelephonyMessage) -> Result<(), TransportError> {
        let text = serde_json::to_string(&msg)?;
        self.inner
            .send(Message::Text(text))
            .await
            .map_err(|e| TransportError::WebSocket(e.to_string()))
    }
}
