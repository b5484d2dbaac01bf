//! Voice gateway server entry point

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use voice_gateway_config::{load_settings, Settings};
use voice_gateway_core::{StubEngine, SynthesisEngine};
use voice_gateway_server::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env = std::env::var("VOICE_GATEWAY_ENV").ok();
    let config = load_settings(env.as_deref())?;

    init_tracing(&config);

    tracing::info!("Starting voice gateway v{}", env!("CARGO_PKG_VERSION"));

    let engine = load_engine(&config);
    let voices = engine.available_voices();
    if voices.is_empty() {
        return Err("engine reports no available voices".into());
    }
    tracing::info!(
        voices = voices.len(),
        instruct = engine.supports_instruct(),
        "Engine ready"
    );

    let state = AppState::new(config.clone(), engine);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Build the synthesis engine.
///
/// Checkpoint loading belongs to the engine crate shipped alongside the
/// model; builds without one fall back to the deterministic stub backend.
fn load_engine(config: &Settings) -> Arc<dyn SynthesisEngine> {
    tracing::warn!(
        model_dir = %config.engine.model_dir,
        "no inference backend linked, using the stub engine"
    );
    Arc::new(StubEngine::new())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

/// Initialize tracing with an env-filter and optional JSON output
fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("voice_gateway={},tower_http=info", level).into()
    });

    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}
