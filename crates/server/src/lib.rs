//! HTTP surface of the bridge: the media-stream websocket endpoint,
//! health probes, and a read-only view of live sessions.

pub mod http;
pub mod state;
pub mod websocket;

pub use http::create_router;
pub use state::AppState;
