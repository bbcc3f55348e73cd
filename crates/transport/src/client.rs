//! Websocket client for the realtime AI engine.

use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use crate::realtime::{RealtimeClientEvent, RealtimeServerEvent};
use crate::traits::{RealtimeConnector, RealtimeSink, RealtimeStream};
use crate::TransportError;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Connects to the realtime engine with bearer authentication and hands
/// back split trait objects for the session loop.
pub struct RealtimeClient {
    url: String,
    api_key: String,
}

impl RealtimeClient {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl RealtimeConnector for RealtimeClient {
    async fn connect(
        &self,
    ) -> Result<(Box<dyn RealtimeSink>, Box<dyn RealtimeStream>), TransportError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::Connect(format!("bad realtime url: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key))
            .map_err(|e| TransportError::Connect(format!("bad api key header: {e}")))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (ws, response) = connect_async(request)
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?;
        debug!(status = %response.status(), "realtime websocket connected");

        let (write, read) = ws.split();
        Ok((
            Box::new(WsRealtimeSink { inner: write }),
            Box::new(WsRealtimeStream { inner: read }),
        ))
    }
}

struct WsRealtimeSink {
    inner: SplitSink<WsStream, Message>,
}

#[async_trait]
impl RealtimeSink for WsRealtimeSink {
    async fn send(&mut self, event: RealtimeClientEvent) -> Result<(), TransportError> {
        let text = serde_json::to_string(&event)?;
        self.inner.send(Message::Text(text)).await?;
        Ok(())
    }
}

struct WsRealtimeStream {
    inner: SplitStream<WsStream>,
}

#[async_trait]
impl RealtimeStream for WsRealtimeStream {
    async fn recv(&mut self) -> Option<Result<RealtimeServerEvent, TransportError>> {
        loop {
            match self.inner.next().await? {
                Ok(Message::Text(text)) => match serde_json::from_str(&text) {
                    Ok(event) => return Some(Ok(event)),
                    Err(e) => {
                        warn!(error = %e, "skipping malformed realtime event");
                        continue;
                    }
                },
                Ok(Message::Close(_)) => return None,
                // Pings are answered by the websocket layer.
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
