//! Application state
//!
//! Shared state across all handlers.

use std::sync::Arc;

use voice_gateway_config::Settings;
use voice_gateway_core::SynthesisEngine;
use voice_gateway_pipeline::SynthesisDispatcher;

use crate::limit::GenerationLimiter;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: Arc<Settings>,
    /// Synthesis dispatcher over the shared engine
    pub dispatcher: Arc<SynthesisDispatcher>,
    /// Generation admission control
    pub limiter: Arc<GenerationLimiter>,
}

impl AppState {
    /// Create new application state over a loaded engine
    pub fn new(config: Settings, engine: Arc<dyn SynthesisEngine>) -> Self {
        let limiter = GenerationLimiter::new(
            config.limits.max_concurrent_generations,
            config.limits.max_queued_requests,
        );
        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(SynthesisDispatcher::new(engine)),
            limiter: Arc::new(limiter),
        }
    }
}
