//! Synthesis request pipeline
//!
//! This crate provides the request-shaping layer between callers and the
//! synthesis engine:
//! - Request model with four mutually exclusive synthesis modes
//! - Mode validation with fatal preconditions and non-fatal advisories
//! - Prompt-audio conditioning (silence trim, peak normalization, padding)
//! - Dispatch to the matching engine operation with deterministic seeding
//! - Seed generation for reproducible requests

pub mod conditioner;
pub mod dispatch;
pub mod request;
pub mod seed;
pub mod validate;

// Request exports
pub use request::{Mode, PromptAudio, SynthesisRequest};

// Validation exports
pub use validate::{validate, ValidationOutcome};

// Conditioner exports
pub use conditioner::{condition, condition_with, ConditionerConfig};

// Dispatch exports
pub use dispatch::{SynthesisDispatcher, SynthesisEvent};

// Seed exports
pub use seed::{generate_seed, SEED_MAX, SEED_MIN};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("Engine error: {0}")]
    Engine(#[from] voice_gateway_core::EngineError),

    #[error("No voices available")]
    NoVoices,

    #[error("Channel closed")]
    ChannelClosed,
}

impl From<PipelineError> for voice_gateway_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Engine(e) => voice_gateway_core::Error::Engine(e),
            other => voice_gateway_core::Error::Other(other.to_string()),
        }
    }
}
