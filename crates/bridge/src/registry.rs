//! Registry of in-flight call sessions, keyed by stream id.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::session::{CallSession, CallState};

#[derive(Default)]
pub struct CallRegistry {
    sessions: RwLock<HashMap<String, Arc<CallSession>>>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, stream_sid: impl Into<String>, session: Arc<CallSession>) {
        self.sessions.write().insert(stream_sid.into(), session);
    }

    pub fn remove(&self, stream_sid: &str) -> Option<Arc<CallSession>> {
        self.sessions.write().remove(stream_sid)
    }

    pub fn get(&self, stream_sid: &str) -> Option<Arc<CallSession>> {
        self.sessions.read().get(stream_sid).cloned()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Stream id, session id and state of every live call.
    pub fn snapshot(&self) -> Vec<(String, String, CallState)> {
        self.sessions
            .read()
            .iter()
            .map(|(sid, s)| (sid.clone(), s.id().to_owned(), s.state()))
            .collect()
    }
}
