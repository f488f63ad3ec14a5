//! Google Gemini session adapter.
//!
//! Implements the `Llm` trait for Gemini models via the Generative
//! Language REST API, with a configuration-keyed session cache.

mod api;
mod cache;
mod config;
mod models;
mod session;
mod transport;
pub mod types;


pub use cache::SessionCache;
pub use config::{
    GeminiConfig, GeminiOptions, API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_TEMPERATURE,
    DEFAULT_TOP_P, MAX_TOKENS_ENV, MODEL_ENV, TEMPERATURE_ENV, TOP_P_ENV,
};
pub use models::GeminiModel;
pub use session::GeminiSession;
pub use transport::{ChunkStream, GeminiTransport, HttpTransport};
