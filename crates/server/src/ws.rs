//! WebSocket synthesis endpoint
//!
//! The client sends one synthesis request as a JSON text frame and receives
//! the event stream back as JSON messages, audio as base64 PCM16. The
//! connection stays open for further requests.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use voice_gateway_pipeline::{SynthesisEvent, SynthesisRequest};

use crate::encode::pcm16_base64;
use crate::http::clamp_speed;
use crate::state::AppState;

/// Outbound WebSocket message types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Advisory: synthesis proceeds
    Info { message: String },
    /// Fatal precondition: a silent placeholder chunk follows
    Warning { message: String },
    /// One audio chunk
    Audio { data: String, sample_rate: u32 },
    /// Stream finished normally
    Complete,
    /// Generation failed
    Error { message: String },
}

impl From<SynthesisEvent> for WsMessage {
    fn from(event: SynthesisEvent) -> Self {
        match event {
            SynthesisEvent::Info(message) => WsMessage::Info { message },
            SynthesisEvent::Warning(message) => WsMessage::Warning { message },
            SynthesisEvent::Chunk(chunk) => WsMessage::Audio {
                data: pcm16_base64(&chunk.samples),
                sample_rate: chunk.sample_rate,
            },
            SynthesisEvent::Complete => WsMessage::Complete,
            SynthesisEvent::Error(message) => WsMessage::Error { message },
        }
    }
}

/// Handle WebSocket upgrade
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle one WebSocket connection
async fn handle_socket(mut socket: WebSocket, state: AppState) {
    while let Some(msg) = socket.recv().await {
        match msg {
            Ok(Message::Text(text)) => {
                let request = match serde_json::from_str::<SynthesisRequest>(&text) {
                    Ok(request) => request,
                    Err(e) => {
                        let reply = WsMessage::Error {
                            message: format!("Invalid request: {e}"),
                        };
                        if send(&mut socket, &reply).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };
                let request = clamp_speed(request);

                let permit = match state.limiter.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        let reply = WsMessage::Error { message: e.to_string() };
                        if send(&mut socket, &reply).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };

                let result = stream_generation(&mut socket, &state, request).await;
                drop(permit);
                if result.is_err() {
                    // Client went away mid-stream; the dropped receiver
                    // cancels the generation task
                    break;
                }
            }
            Ok(Message::Ping(data)) => {
                let _ = socket.send(Message::Pong(data)).await;
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    tracing::debug!("WebSocket closed");
}

/// Forward one request's event stream to the socket
async fn stream_generation(
    socket: &mut WebSocket,
    state: &AppState,
    request: SynthesisRequest,
) -> Result<(), axum::Error> {
    let request_id = uuid::Uuid::new_v4();
    tracing::debug!(%request_id, mode = %request.mode, "ws synthesis request");

    let mut rx = state.dispatcher.generate(request);
    while let Some(event) = rx.recv().await {
        send(socket, &WsMessage::from(event)).await?;
    }
    Ok(())
}

async fn send(socket: &mut WebSocket, message: &WsMessage) -> Result<(), axum::Error> {
    let json = serde_json::to_string(message).unwrap_or_default();
    socket.send(Message::Text(json)).await
}
