//! Synthesis engine interface
//!
//! The inference engine is an external collaborator. The gateway reaches it
//! only through this trait: voice listing, a capability probe, deterministic
//! seeding, four synthesis operations, and prompt-audio file access.

mod stub;

pub use stub::{EngineCall, StubEngine};

use std::path::Path;
use std::pin::Pin;

use futures::Stream;

use crate::audio::Waveform;
use crate::error::EngineError;

/// Lazy, finite stream of synthesized segments.
///
/// Consumers pull; a dropped stream stops generation. A segment is the raw
/// sample vector for one synthesized piece of the request.
pub type SegmentStream =
    Pin<Box<dyn Stream<Item = Result<Vec<f32>, EngineError>> + Send>>;

/// Header-level information about an audio file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveformInfo {
    /// Sample rate in Hz
    pub sample_rate: u32,
}

/// Synthesis engine backend trait
#[async_trait::async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Ordered voice identifiers. Non-empty once the engine is loaded.
    fn available_voices(&self) -> Vec<String>;

    /// Whether the loaded model supports instruction-driven control.
    /// Fixed for the lifetime of the process.
    fn supports_instruct(&self) -> bool;

    /// Seed the engine's random source. Global effect: callers must not
    /// interleave seeding and generation across concurrent requests.
    fn seed(&self, seed: i64);

    /// Synthesize with a pre-trained voice
    async fn synthesize_from_voice(
        &self,
        text: &str,
        voice_id: &str,
        streaming: bool,
        speed: f32,
    ) -> Result<SegmentStream, EngineError>;

    /// Synthesize by cloning the prompt audio, guided by its transcript
    async fn synthesize_zero_shot(
        &self,
        text: &str,
        prompt_text: &str,
        prompt_audio: &Waveform,
        streaming: bool,
        speed: f32,
    ) -> Result<SegmentStream, EngineError>;

    /// Synthesize in a language different from the prompt audio's
    async fn synthesize_cross_lingual(
        &self,
        text: &str,
        prompt_audio: &Waveform,
        streaming: bool,
        speed: f32,
    ) -> Result<SegmentStream, EngineError>;

    /// Synthesize with a pre-trained voice shaped by instruct text
    async fn synthesize_instructed(
        &self,
        text: &str,
        voice_id: &str,
        instruct_text: &str,
        streaming: bool,
        speed: f32,
    ) -> Result<SegmentStream, EngineError>;

    /// Load an audio file, resampled to `target_rate`
    fn load_waveform(&self, path: &Path, target_rate: u32) -> Result<Waveform, EngineError>;

    /// Probe an audio file's header without loading samples
    fn waveform_info(&self, path: &Path) -> Result<WaveformInfo, EngineError>;
}
