//! Layered configuration: defaults, optional TOML file, then
//! `HAGGLE__`-prefixed environment variables (double underscore between
//! section and field, e.g. `HAGGLE__REALTIME__API_KEY`).

pub mod settings;

pub use settings::{
    ObservabilityConfig, OutcomeConfig, RealtimeConfig, ServerConfig, Settings, StoreConfig,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}
