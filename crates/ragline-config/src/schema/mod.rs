//! Configuration schema types for ragline.
//!
//! All structs use `serde(default)` so partial configs work correctly.
//! Missing fields are filled from the environment or built-in defaults
//! when the session is constructed.

mod llm;
mod rag;
mod system;

pub use llm::*;
pub use rag::*;
pub use system::*;

use serde::{Deserialize, Serialize};

/// Current config schema version.
pub const CONFIG_SCHEMA_VERSION: u32 = 1;

/// Root configuration for ragline.
///
/// Only override what you want to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct RaglineConfig {
    pub gemini: GeminiSection,
    pub mistral: MistralSection,
    pub rag: RagConfig,
    pub logging: LoggingConfig,
}
