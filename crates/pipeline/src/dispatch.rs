//! Request dispatch
//!
//! Routes a validated request to the matching engine operation and relays
//! its output as a bounded, consumer-pulled event stream. Seeding mutates
//! the engine's process-wide random state, so each seed-then-generate pair
//! runs under one lock shared by all requests on the dispatcher.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::{mpsc, Mutex};

use voice_gateway_core::{
    AudioChunk, EngineError, SynthesisEngine, Waveform, OUTPUT_SAMPLE_RATE, PROMPT_SAMPLE_RATE,
};

use crate::conditioner::condition;
use crate::request::{Mode, SynthesisRequest};
use crate::validate::{validate, ValidationOutcome};
use crate::PipelineError;

/// Number of in-flight events before the producer blocks on the consumer
const CHANNEL_CAPACITY: usize = 8;

/// One item of a synthesis output stream
#[derive(Debug, Clone)]
pub enum SynthesisEvent {
    /// Fatal precondition: the request was aborted, a silent placeholder
    /// chunk follows
    Warning(String),
    /// Advisory: synthesis proceeds, some fields are ignored
    Info(String),
    /// One synthesized audio chunk, in generation order
    Chunk(AudioChunk),
    /// The stream finished normally
    Complete,
    /// The engine failed mid-generation; chunks already sent stand
    Error(String),
}

/// Routes requests to the synthesis engine
pub struct SynthesisDispatcher {
    engine: Arc<dyn SynthesisEngine>,
    /// Serializes seed-then-generate across concurrent requests
    generation_lock: Arc<Mutex<()>>,
}

impl SynthesisDispatcher {
    /// Create a dispatcher over a shared engine instance
    pub fn new(engine: Arc<dyn SynthesisEngine>) -> Self {
        Self { engine, generation_lock: Arc::new(Mutex::new(())) }
    }

    /// The engine this dispatcher routes to
    pub fn engine(&self) -> &Arc<dyn SynthesisEngine> {
        &self.engine
    }

    /// Process one request, returning its event stream.
    ///
    /// The stream is finite, ordered, and not restartable. Dropping the
    /// receiver cancels the request: no further segments are pulled from
    /// the engine.
    pub fn generate(&self, request: SynthesisRequest) -> mpsc::Receiver<SynthesisEvent> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let engine = Arc::clone(&self.engine);
        let lock = Arc::clone(&self.generation_lock);
        tokio::spawn(async move {
            run(engine, lock, request, tx).await;
        });
        rx
    }
}

async fn run(
    engine: Arc<dyn SynthesisEngine>,
    lock: Arc<Mutex<()>>,
    request: SynthesisRequest,
    tx: mpsc::Sender<SynthesisEvent>,
) {
    // Validation runs entirely before any audio is generated
    let outcome = match validate(&request, engine.as_ref()) {
        Ok(outcome) => outcome,
        Err(err) => {
            let _ = tx.send(SynthesisEvent::Error(err.to_string())).await;
            return;
        }
    };

    match outcome {
        ValidationOutcome::Fatal { message } => {
            tracing::warn!(mode = %request.mode, %message, "request rejected");
            let _ = tx.send(SynthesisEvent::Warning(message)).await;
            let _ = tx
                .send(SynthesisEvent::Chunk(AudioChunk::silence(OUTPUT_SAMPLE_RATE)))
                .await;
            let _ = tx.send(SynthesisEvent::Complete).await;
            return;
        }
        ValidationOutcome::Proceed { advisories } => {
            for advisory in advisories {
                tracing::info!(mode = %request.mode, %advisory, "request advisory");
                if tx.send(SynthesisEvent::Info(advisory)).await.is_err() {
                    return;
                }
            }
        }
    }

    // Condition the reference audio before touching the engine's random state
    let conditioned = match conditioned_prompt(engine.as_ref(), &request) {
        Ok(conditioned) => conditioned,
        Err(err) => {
            let _ = tx.send(SynthesisEvent::Error(err.to_string())).await;
            return;
        }
    };

    let voice = match resolve_voice(engine.as_ref(), &request) {
        Ok(voice) => voice,
        Err(err) => {
            let _ = tx.send(SynthesisEvent::Error(err.to_string())).await;
            return;
        }
    };

    tracing::info!(mode = %request.mode, seed = request.seed, streaming = request.streaming,
        "received synthesis request");

    // Seed-then-generate is a critical section: the lock is held until the
    // engine's segment stream is exhausted or the caller goes away
    let _guard = lock.lock().await;
    engine.seed(request.seed);

    let stream = match (request.mode, voice.as_deref(), conditioned.as_ref()) {
        (Mode::PretrainedVoice, Some(voice), _) => {
            engine
                .synthesize_from_voice(&request.text, voice, request.streaming, request.speed)
                .await
        }
        (Mode::InstructControl, Some(voice), _) => {
            engine
                .synthesize_instructed(
                    &request.text,
                    voice,
                    &request.instruct_text,
                    request.streaming,
                    request.speed,
                )
                .await
        }
        (Mode::RapidCloning, _, Some(prompt)) => {
            engine
                .synthesize_zero_shot(
                    &request.text,
                    &request.prompt_text,
                    prompt,
                    request.streaming,
                    request.speed,
                )
                .await
        }
        (Mode::CrossLingual, _, Some(prompt)) => {
            engine
                .synthesize_cross_lingual(&request.text, prompt, request.streaming, request.speed)
                .await
        }
        _ => Err(EngineError::Synthesis("request is missing required inputs".to_string())),
    };

    let mut stream = match stream {
        Ok(stream) => stream,
        Err(err) => {
            let _ = tx.send(SynthesisEvent::Error(err.to_string())).await;
            return;
        }
    };

    while let Some(segment) = stream.next().await {
        match segment {
            Ok(samples) => {
                let chunk = AudioChunk::new(OUTPUT_SAMPLE_RATE, samples);
                if tx.send(SynthesisEvent::Chunk(chunk)).await.is_err() {
                    // Caller cancelled; stop pulling from the engine
                    tracing::debug!(mode = %request.mode, "caller went away, stopping generation");
                    return;
                }
            }
            Err(err) => {
                tracing::error!(mode = %request.mode, error = %err, "generation failed");
                let _ = tx.send(SynthesisEvent::Error(err.to_string())).await;
                return;
            }
        }
    }

    let _ = tx.send(SynthesisEvent::Complete).await;
}

/// Load and condition the prompt audio for the modes that use it
fn conditioned_prompt(
    engine: &dyn SynthesisEngine,
    request: &SynthesisRequest,
) -> Result<Option<Waveform>, PipelineError> {
    match request.mode {
        Mode::RapidCloning | Mode::CrossLingual => {
            let path = request
                .prompt_audio
                .effective()
                .ok_or_else(|| EngineError::Audio("prompt audio missing".to_string()))?;
            let raw = engine.load_waveform(path, PROMPT_SAMPLE_RATE)?;
            Ok(Some(condition(&raw)))
        }
        Mode::PretrainedVoice | Mode::InstructControl => Ok(None),
    }
}

/// The requested voice, or the engine's first available one
fn resolve_voice(
    engine: &dyn SynthesisEngine,
    request: &SynthesisRequest,
) -> Result<Option<String>, PipelineError> {
    match request.mode {
        Mode::PretrainedVoice | Mode::InstructControl => match &request.voice {
            Some(voice) => Ok(Some(voice.clone())),
            None => engine
                .available_voices()
                .into_iter()
                .next()
                .map(Some)
                .ok_or(PipelineError::NoVoices),
        },
        Mode::RapidCloning | Mode::CrossLingual => Ok(None),
    }
}
