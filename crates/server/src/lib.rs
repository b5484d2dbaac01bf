//! Voice gateway server
//!
//! Thin HTTP/WebSocket shell over the synthesis pipeline: request intake,
//! the external concurrency cap, and audio encoding for the wire.

pub mod encode;
pub mod http;
pub mod limit;
pub mod state;
pub mod ws;

pub use http::create_router;
pub use limit::{GenerationLimiter, GenerationPermit, LimitError};
pub use state::AppState;
