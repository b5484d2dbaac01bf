//! Stub synthesis engine
//!
//! Deterministic in-process backend used by tests and as the server's
//! default wiring when no real inference engine is linked. Output depends
//! only on the last seed and the request inputs, and every call is recorded
//! so tests can assert on operation order.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::StreamExt;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::audio::{Waveform, OUTPUT_SAMPLE_RATE};
use crate::error::EngineError;

use super::{SegmentStream, SynthesisEngine, WaveformInfo};

/// Samples synthesized per character of input text (~50 ms each)
const SAMPLES_PER_CHAR: usize = OUTPUT_SAMPLE_RATE as usize / 20;

/// Number of segments produced when streaming is requested
const STREAMING_SEGMENTS: usize = 3;

/// One recorded engine invocation
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Seed(i64),
    FromVoice { voice: String },
    ZeroShot { prompt_text: String },
    CrossLingual,
    Instructed { voice: String, instruct_text: String },
}

/// Deterministic stand-in for a real synthesis engine
pub struct StubEngine {
    voices: Vec<String>,
    instruct: bool,
    rng: Mutex<StdRng>,
    calls: Mutex<Vec<EngineCall>>,
    waveforms: Mutex<HashMap<PathBuf, Waveform>>,
    /// Inject a failure after this many segments
    fail_after: Option<usize>,
    segments_pulled: Arc<AtomicUsize>,
}

impl StubEngine {
    /// Engine with two voices and no instruct support
    pub fn new() -> Self {
        Self {
            voices: vec!["female-1".to_string(), "male-1".to_string()],
            instruct: false,
            rng: Mutex::new(StdRng::seed_from_u64(0)),
            calls: Mutex::new(Vec::new()),
            waveforms: Mutex::new(HashMap::new()),
            fail_after: None,
            segments_pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Replace the voice list
    pub fn with_voices(mut self, voices: Vec<String>) -> Self {
        self.voices = voices;
        self
    }

    /// Set the instruct capability flag
    pub fn with_instruct(mut self, instruct: bool) -> Self {
        self.instruct = instruct;
        self
    }

    /// Make generation fail after yielding `n` segments
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Register an audio file the engine can load and probe
    pub fn register_waveform(&self, path: impl Into<PathBuf>, waveform: Waveform) {
        self.waveforms.lock().insert(path.into(), waveform);
    }

    /// All calls recorded so far, in invocation order
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }

    /// Segments actually consumed from returned streams
    pub fn segments_pulled(&self) -> usize {
        self.segments_pulled.load(Ordering::SeqCst)
    }

    fn record(&self, call: EngineCall) {
        self.calls.lock().push(call);
    }

    /// Draw the full segment list for one request from the seeded source
    fn render(&self, text: &str, streaming: bool, speed: f32) -> SegmentStream {
        let total = (text.len().max(1) * SAMPLES_PER_CHAR) as f32 / speed;
        let total = total as usize;
        let count = if streaming { STREAMING_SEGMENTS } else { 1 };
        let per_segment = (total / count).max(1);

        let mut rng = self.rng.lock();
        let mut segments: Vec<Result<Vec<f32>, EngineError>> = Vec::with_capacity(count);
        for i in 0..count {
            if self.fail_after == Some(i) {
                segments.push(Err(EngineError::Synthesis("inference failed".to_string())));
                break;
            }
            let samples: Vec<f32> =
                (0..per_segment).map(|_| rng.gen_range(-0.5..0.5)).collect();
            segments.push(Ok(samples));
        }

        let pulled = Arc::clone(&self.segments_pulled);
        Box::pin(futures::stream::iter(segments).inspect(move |_| {
            pulled.fetch_add(1, Ordering::SeqCst);
        }))
    }

    fn check_voice(&self, voice_id: &str) -> Result<(), EngineError> {
        if self.voices.iter().any(|v| v == voice_id) {
            Ok(())
        } else {
            Err(EngineError::UnknownVoice(voice_id.to_string()))
        }
    }
}

impl Default for StubEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SynthesisEngine for StubEngine {
    fn available_voices(&self) -> Vec<String> {
        self.voices.clone()
    }

    fn supports_instruct(&self) -> bool {
        self.instruct
    }

    fn seed(&self, seed: i64) {
        self.record(EngineCall::Seed(seed));
        *self.rng.lock() = StdRng::seed_from_u64(seed as u64);
    }

    async fn synthesize_from_voice(
        &self,
        text: &str,
        voice_id: &str,
        streaming: bool,
        speed: f32,
    ) -> Result<SegmentStream, EngineError> {
        self.check_voice(voice_id)?;
        self.record(EngineCall::FromVoice { voice: voice_id.to_string() });
        Ok(self.render(text, streaming, speed))
    }

    async fn synthesize_zero_shot(
        &self,
        text: &str,
        prompt_text: &str,
        _prompt_audio: &Waveform,
        streaming: bool,
        speed: f32,
    ) -> Result<SegmentStream, EngineError> {
        self.record(EngineCall::ZeroShot { prompt_text: prompt_text.to_string() });
        Ok(self.render(text, streaming, speed))
    }

    async fn synthesize_cross_lingual(
        &self,
        text: &str,
        _prompt_audio: &Waveform,
        streaming: bool,
        speed: f32,
    ) -> Result<SegmentStream, EngineError> {
        self.record(EngineCall::CrossLingual);
        Ok(self.render(text, streaming, speed))
    }

    async fn synthesize_instructed(
        &self,
        text: &str,
        voice_id: &str,
        instruct_text: &str,
        streaming: bool,
        speed: f32,
    ) -> Result<SegmentStream, EngineError> {
        self.check_voice(voice_id)?;
        self.record(EngineCall::Instructed {
            voice: voice_id.to_string(),
            instruct_text: instruct_text.to_string(),
        });
        Ok(self.render(text, streaming, speed))
    }

    fn load_waveform(&self, path: &Path, target_rate: u32) -> Result<Waveform, EngineError> {
        let waveforms = self.waveforms.lock();
        let wave = waveforms
            .get(path)
            .ok_or_else(|| EngineError::Io(format!("no such file: {}", path.display())))?;
        Ok(resample(wave, target_rate))
    }

    fn waveform_info(&self, path: &Path) -> Result<WaveformInfo, EngineError> {
        let waveforms = self.waveforms.lock();
        let wave = waveforms
            .get(path)
            .ok_or_else(|| EngineError::Io(format!("no such file: {}", path.display())))?;
        Ok(WaveformInfo { sample_rate: wave.sample_rate })
    }
}

/// Linear-interpolation resample, good enough for a stub
fn resample(wave: &Waveform, target_rate: u32) -> Waveform {
    if wave.sample_rate == target_rate || wave.is_empty() {
        return Waveform::new(wave.samples.clone(), target_rate);
    }
    let ratio = wave.sample_rate as f64 / target_rate as f64;
    let out_len = (wave.samples.len() as f64 / ratio).round() as usize;
    let samples: Vec<f32> = (0..out_len)
        .map(|i| {
            let pos = i as f64 * ratio;
            let idx = pos as usize;
            let frac = (pos - idx as f64) as f32;
            let a = wave.samples[idx.min(wave.samples.len() - 1)];
            let b = wave.samples[(idx + 1).min(wave.samples.len() - 1)];
            a + (b - a) * frac
        })
        .collect();
    Waveform::new(samples, target_rate)
}
