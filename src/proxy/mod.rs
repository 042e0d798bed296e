//! HTTP proxy server module.
//!
//! Accepts chat requests from the browser client and forwards them to the
//! Gemini API with the server-held key injected.

mod handlers;
mod server;
pub mod types;

pub use server::{create_router, run_server, AppState};
pub use types::{build_upstream_payload, ChatRequest, DEFAULT_SYSTEM_PROMPT};
