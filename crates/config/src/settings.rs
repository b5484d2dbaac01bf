//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Synthesis engine configuration
    #[serde(default)]
    pub engine: EngineConfig,

    /// Generation concurrency limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_concurrent_generations == 0 {
            return Err(ConfigError::InvalidValue {
                field: "limits.max_concurrent_generations".to_string(),
                message: "must allow at least one generation".to_string(),
            });
        }
        if self.engine.model_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "engine.model_dir".to_string(),
                message: "model directory must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_enabled: default_true(),
        }
    }
}

/// Synthesis engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model checkpoint directory (loaded by the external launcher)
    #[serde(default = "default_model_dir")]
    pub model_dir: String,
}

fn default_model_dir() -> String {
    "pretrained_models/voice-gateway-300m".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { model_dir: default_model_dir() }
    }
}

/// Generation concurrency limits
///
/// A single engine instance is shared by all requests; these caps bound
/// memory and compute pressure on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Simultaneous generations allowed
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_generations: usize,

    /// Requests allowed to wait for a generation slot
    #[serde(default = "default_max_queued")]
    pub max_queued_requests: usize,
}

fn default_max_concurrent() -> usize {
    2
}
fn default_max_queued() -> usize {
    4
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_concurrent_generations: default_max_concurrent(),
            max_queued_requests: default_max_queued(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (VOICE_GATEWAY prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder
            .add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("VOICE_GATEWAY")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
