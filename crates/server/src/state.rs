//! Shared application state assembled from settings at startup.

use std::sync::Arc;

use tracing::{info, warn};

use haggle_bridge::{CallRegistry, SessionDeps, SessionOptions};
use haggle_config::Settings;
use haggle_outcome::{ChatInference, OutcomeExtractor};
use haggle_persistence::{CallReportSink, ContextStore, MemorySink, MemoryStore, RestStore};
use haggle_transport::RealtimeClient;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<CallRegistry>,
    pub deps: SessionDeps,
}

impl AppState {
    pub fn from_settings(settings: Settings) -> Self {
        let (store, sink): (Arc<dyn ContextStore>, Arc<dyn CallReportSink>) =
            match &settings.store.base_url {
                Some(url) => {
                    info!(url = %url, "using REST context store");
                    let rest = Arc::new(RestStore::new(url.clone(), settings.store.api_key.clone()));
                    (rest.clone(), rest)
                }
                None => {
                    warn!("store.base_url not configured, falling back to in-memory store");
                    (Arc::new(MemoryStore::new()), Arc::new(MemorySink::new()))
                }
            };

        let extractor = if settings.outcome.inference_enabled {
            info!(model = %settings.outcome.model, "outcome inference enabled");
            Arc::new(OutcomeExtractor::new(Some(Arc::new(ChatInference::new(
                settings.outcome.base_url.clone(),
                settings.outcome.api_key.clone(),
                settings.outcome.model.clone(),
            )))))
        } else {
            Arc::new(OutcomeExtractor::fallback_only())
        };

        let connector = Arc::new(RealtimeClient::new(
            settings.realtime.url.clone(),
            settings.realtime.api_key.clone(),
        ));

        let options = SessionOptions {
            voice: settings.realtime.voice.clone(),
            transcription_model: (!settings.realtime.transcription_model.is_empty())
                .then(|| settings.realtime.transcription_model.clone()),
            greet_on_connect: settings.realtime.greet_on_connect,
            barge_in_clear: settings.realtime.barge_in_clear,
            drain_timeout_ms: settings.realtime.drain_timeout_ms,
        };

        Self {
            settings: Arc::new(settings),
            registry: Arc::new(CallRegistry::new()),
            deps: SessionDeps {
                store,
                sink,
                extractor,
                connector,
                options,
            },
        }
    }
}
