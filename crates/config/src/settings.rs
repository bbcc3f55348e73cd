use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub outcome: OutcomeConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Websocket endpoint of the realtime AI engine.
    #[serde(default = "default_realtime_url")]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Transcription model for the human side; empty disables it.
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    /// Ask the engine to speak first once the session is configured.
    #[serde(default = "default_true")]
    pub greet_on_connect: bool,
    /// Send a telephony `clear` frame when the human barges in.
    #[serde(default = "default_true")]
    pub barge_in_clear: bool,
    /// How long the surviving relay may drain after the other side ends.
    #[serde(default = "default_drain_timeout_ms")]
    pub drain_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the REST store; unset falls back to the in-memory
    /// store, which is only useful for local development.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub api_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutcomeConfig {
    /// Enable the chat-completion primary extractor. The pattern-scan
    /// fallback always runs regardless.
    #[serde(default)]
    pub inference_enabled: bool,
    #[serde(default = "default_outcome_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_outcome_model")]
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_json: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}
fn default_port() -> u16 {
    8080
}
fn default_realtime_url() -> String {
    "wss://api.x.ai/v1/realtime".to_owned()
}
fn default_voice() -> String {
    "Rex".to_owned()
}
fn default_transcription_model() -> String {
    "whisper-1".to_owned()
}
fn default_true() -> bool {
    true
}
fn default_drain_timeout_ms() -> u64 {
    2_000
}
fn default_outcome_url() -> String {
    "https://api.x.ai/v1".to_owned()
}
fn default_outcome_model() -> String {
    "grok-3-mini".to_owned()
}
fn default_log_level() -> String {
    "haggle=info,tower_http=info".to_owned()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            url: default_realtime_url(),
            api_key: String::new(),
            voice: default_voice(),
            transcription_model: default_transcription_model(),
            greet_on_connect: true,
            barge_in_clear: true,
            drain_timeout_ms: default_drain_timeout_ms(),
        }
    }
}

impl Default for OutcomeConfig {
    fn default() -> Self {
        Self {
            inference_enabled: false,
            base_url: default_outcome_url(),
            api_key: String::new(),
            model: default_outcome_model(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

impl Settings {
    /// Load defaults, then the optional file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix("HAGGLE").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.realtime.url.starts_with("ws://") && !self.realtime.url.starts_with("wss://") {
            return Err(ConfigError::Invalid {
                field: "realtime.url",
                message: format!("must be a websocket url, got {:?}", self.realtime.url),
            });
        }
        if self.realtime.drain_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "realtime.drain_timeout_ms",
                message: "must be greater than zero".to_owned(),
            });
        }
        if let Some(url) = &self.store.base_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    field: "store.base_url",
                    message: format!("must be an http url, got {url:?}"),
                });
            }
        }
        if self.outcome.inference_enabled && self.outcome.api_key.is_empty() {
            return Err(ConfigError::Invalid {
                field: "outcome.api_key",
                message: "required when outcome.inference_enabled is set".to_owned(),
            });
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            realtime: RealtimeConfig::default(),
            store: StoreConfig::default(),
            outcome: OutcomeConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}
