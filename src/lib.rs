//! gemrelay - server-side chat relay for the Gemini API
//!
//! A small proxy that accepts chat requests from a browser client, injects
//! a server-held API key, and forwards them to the Google generative-language
//! API. The key never reaches the client.

pub mod config;
pub mod error;
pub mod proxy;

pub use config::Config;
pub use error::{Error, Result};
