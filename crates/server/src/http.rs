//! HTTP endpoints
//!
//! REST API for the voice gateway.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use voice_gateway_pipeline::{generate_seed, Mode, SynthesisEvent, SynthesisRequest};

use crate::encode::pcm16_base64;
use crate::state::AppState;
use crate::ws;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        // Synthesis
        .route("/api/synthesize", post(synthesize))
        .route("/api/synthesize/ws", get(ws::ws_handler))
        // Catalog
        .route("/api/voices", get(list_voices))
        .route("/api/modes", get(list_modes))
        .route("/api/seed", get(new_seed))
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Middleware
        .layer(TraceLayer::new_for_http());

    if state.config.server.cors_enabled {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}

/// List available voices
async fn list_voices(State(state): State<AppState>) -> Json<serde_json::Value> {
    let voices = state.dispatcher.engine().available_voices();
    Json(serde_json::json!({
        "voices": voices,
    }))
}

/// List synthesis modes with their operation steps
async fn list_modes(State(state): State<AppState>) -> Json<serde_json::Value> {
    let instruct = state.dispatcher.engine().supports_instruct();
    let modes: Vec<serde_json::Value> = Mode::ALL
        .iter()
        .map(|mode| {
            serde_json::json!({
                "mode": mode,
                "label": mode.label(),
                "instructions": mode.instructions(),
                "supported": *mode != Mode::InstructControl || instruct,
            })
        })
        .collect();

    Json(serde_json::json!({
        "modes": modes,
    }))
}

/// Hand out a fresh random seed
async fn new_seed() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "seed": generate_seed(),
    }))
}

/// Non-streaming synthesis: runs the whole stream and returns one payload
async fn synthesize(
    State(state): State<AppState>,
    Json(request): Json<SynthesisRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let request = clamp_speed(request);

    let _permit = state
        .limiter
        .acquire()
        .await
        .map_err(|e| (StatusCode::TOO_MANY_REQUESTS, e.to_string()))?;

    let request_id = uuid::Uuid::new_v4();
    tracing::debug!(%request_id, mode = %request.mode, "http synthesis request");

    let mut rx = state.dispatcher.generate(request);

    let mut warnings = Vec::new();
    let mut advisories = Vec::new();
    let mut samples: Vec<f32> = Vec::new();
    let mut sample_rate = 0u32;

    while let Some(event) = rx.recv().await {
        match event {
            SynthesisEvent::Warning(message) => warnings.push(message),
            SynthesisEvent::Info(message) => advisories.push(message),
            SynthesisEvent::Chunk(chunk) => {
                sample_rate = chunk.sample_rate;
                samples.extend_from_slice(&chunk.samples);
            }
            SynthesisEvent::Complete => break,
            SynthesisEvent::Error(message) => {
                tracing::error!(%request_id, %message, "synthesis failed");
                return Err((StatusCode::INTERNAL_SERVER_ERROR, message));
            }
        }
    }

    Ok(Json(serde_json::json!({
        "request_id": request_id.to_string(),
        "warnings": warnings,
        "advisories": advisories,
        "sample_rate": sample_rate,
        "audio": pcm16_base64(&samples),
    })))
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let voices = state.dispatcher.engine().available_voices();

    Json(serde_json::json!({
        "status": "ready",
        "voices": voices.len(),
        "queued": state.limiter.queued(),
    }))
}

/// Clamp speed into the supported range, as the input widget would
pub(crate) fn clamp_speed(mut request: SynthesisRequest) -> SynthesisRequest {
    if !(0.5..=2.0).contains(&request.speed) {
        let clamped = request.speed.clamp(0.5, 2.0);
        tracing::warn!(speed = request.speed, clamped, "speed out of range, clamping");
        request.speed = clamped;
    }
    request
}
