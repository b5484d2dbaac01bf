//! Core types for the voice gateway
//!
//! This crate provides foundational types used across all other crates:
//! - Waveform and audio chunk types
//! - Error types
//! - The synthesis engine interface

pub mod audio;
pub mod engine;
pub mod error;

pub use audio::{AudioChunk, Waveform, OUTPUT_SAMPLE_RATE, PROMPT_SAMPLE_RATE};
pub use engine::{EngineCall, SegmentStream, StubEngine, SynthesisEngine, WaveformInfo};
pub use error::{EngineError, Error, Result};
