//! End-to-end dispatch scenarios over the stub engine
//!
//! These exercise the full validate → condition → seed → generate flow the
//! way the serving layer drives it.

use std::sync::Arc;

use tokio::sync::mpsc;

use voice_gateway_core::{AudioChunk, EngineCall, StubEngine, Waveform, OUTPUT_SAMPLE_RATE};
use voice_gateway_pipeline::{Mode, SynthesisDispatcher, SynthesisEvent, SynthesisRequest};

async fn drain(mut rx: mpsc::Receiver<SynthesisEvent>) -> Vec<SynthesisEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    events
}

fn chunk_samples(events: &[SynthesisEvent]) -> Vec<&AudioChunk> {
    events
        .iter()
        .filter_map(|e| match e {
            SynthesisEvent::Chunk(chunk) => Some(chunk),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn cross_lingual_without_prompt_gets_placeholder() {
    let engine = Arc::new(StubEngine::new());
    let dispatcher = SynthesisDispatcher::new(engine.clone());

    let request = SynthesisRequest::new(Mode::CrossLingual, "bonjour tout le monde");
    let events = drain(dispatcher.generate(request)).await;

    assert!(matches!(events[0], SynthesisEvent::Warning(_)));

    let chunks = chunk_samples(&events);
    assert_eq!(chunks.len(), 1, "fatal outcome must produce exactly one chunk");
    assert_eq!(chunks[0].sample_rate, 22_050);
    assert_eq!(chunks[0].len(), 22_050);
    assert!(chunks[0].samples.iter().all(|&s| s == 0.0));

    assert!(engine.calls().is_empty(), "no synthesis operation may run");
}

#[tokio::test]
async fn rapid_cloning_without_prompt_text_gets_placeholder() {
    let engine = Arc::new(StubEngine::new());
    // Valid 3 s clip at 16 kHz: only the empty prompt text is wrong
    engine.register_waveform("clip.wav", Waveform::silence(16_000, 3.0));
    let dispatcher = SynthesisDispatcher::new(engine.clone());

    let mut request = SynthesisRequest::new(Mode::RapidCloning, "hello");
    request.prompt_audio.uploaded = Some("clip.wav".into());

    let events = drain(dispatcher.generate(request)).await;

    assert!(matches!(events[0], SynthesisEvent::Warning(_)));
    let chunks = chunk_samples(&events);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].len(), OUTPUT_SAMPLE_RATE as usize);
    assert!(engine.calls().is_empty());
}

#[tokio::test]
async fn rapid_cloning_conditions_prompt_and_dispatches_zero_shot() {
    let engine = Arc::new(StubEngine::new());
    engine.register_waveform("clip.wav", Waveform::silence(16_000, 3.0));
    let dispatcher = SynthesisDispatcher::new(engine.clone());

    let mut request = SynthesisRequest::new(Mode::RapidCloning, "hello");
    request.prompt_audio.uploaded = Some("clip.wav".into());
    request.prompt_text = "a matching transcript".to_string();
    request.seed = 7;

    let events = drain(dispatcher.generate(request)).await;

    assert!(matches!(events.last(), Some(SynthesisEvent::Complete)));
    assert_eq!(
        engine.calls(),
        vec![
            EngineCall::Seed(7),
            EngineCall::ZeroShot { prompt_text: "a matching transcript".to_string() },
        ]
    );
}

#[tokio::test]
async fn identical_requests_produce_identical_chunks() {
    let engine = Arc::new(StubEngine::new());
    let dispatcher = SynthesisDispatcher::new(engine);

    let mut request = SynthesisRequest::new(Mode::PretrainedVoice, "deterministic output");
    request.voice = Some("male-1".to_string());
    request.seed = 1234;
    request.streaming = true;

    let first = drain(dispatcher.generate(request.clone())).await;
    let second = drain(dispatcher.generate(request)).await;

    let first_chunks: Vec<Vec<f32>> =
        chunk_samples(&first).iter().map(|c| c.samples.to_vec()).collect();
    let second_chunks: Vec<Vec<f32>> =
        chunk_samples(&second).iter().map(|c| c.samples.to_vec()).collect();

    assert!(!first_chunks.is_empty());
    assert_eq!(first_chunks, second_chunks);
}

#[tokio::test]
async fn concurrent_requests_each_stay_deterministic() {
    let engine = Arc::new(StubEngine::new());
    let dispatcher = Arc::new(SynthesisDispatcher::new(engine));

    let mut request_a = SynthesisRequest::new(Mode::PretrainedVoice, "first request text");
    request_a.seed = 1;
    request_a.streaming = true;
    let mut request_b = request_a.clone();
    request_b.text = "second request text, a bit longer".to_string();
    request_b.seed = 2;

    // Reference runs, one at a time
    let expect_a = drain(dispatcher.generate(request_a.clone())).await;
    let expect_b = drain(dispatcher.generate(request_b.clone())).await;

    // Same requests raced against each other
    let (got_a, got_b) = tokio::join!(
        drain(dispatcher.generate(request_a)),
        drain(dispatcher.generate(request_b)),
    );

    let samples = |events: &[SynthesisEvent]| -> Vec<Vec<f32>> {
        chunk_samples(events).iter().map(|c| c.samples.to_vec()).collect()
    };
    assert_eq!(samples(&expect_a), samples(&got_a));
    assert_eq!(samples(&expect_b), samples(&got_b));
}
