//! Configuration for the voice gateway
//!
//! Layered settings: `config/default.yaml`, an optional environment file,
//! then `VOICE_GATEWAY`-prefixed environment variables.

mod settings;

pub use settings::{
    load_settings, EngineConfig, LimitsConfig, ObservabilityConfig, ServerConfig, Settings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config load error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}
