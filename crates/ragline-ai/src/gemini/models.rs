//! Known Gemini models and their context windows.

use std::fmt;
use std::str::FromStr;

use ragline_common::ConfigError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GeminiModel {
    #[default]
    #[serde(rename = "gemini-pro")]
    GeminiPro,
    #[serde(rename = "gemini-pro-vision")]
    GeminiProVision,
    #[serde(rename = "embedding-001")]
    Embedding001,
    #[serde(rename = "aqa")]
    Aqa,
}

impl GeminiModel {
    pub const ALL: [GeminiModel; 4] = [
        GeminiModel::GeminiPro,
        GeminiModel::GeminiProVision,
        GeminiModel::Embedding001,
        GeminiModel::Aqa,
    ];

    /// Model id as used in API paths.
    pub fn id(self) -> &'static str {
        match self {
            GeminiModel::GeminiPro => "gemini-pro",
            GeminiModel::GeminiProVision => "gemini-pro-vision",
            GeminiModel::Embedding001 => "embedding-001",
            GeminiModel::Aqa => "aqa",
        }
    }

    /// Registered context window, in tokens. Reported, never enforced.
    pub fn context_window(self) -> u32 {
        match self {
            GeminiModel::GeminiPro => 30720,
            GeminiModel::GeminiProVision => 12288,
            GeminiModel::Embedding001 => 2048,
            GeminiModel::Aqa => 7168,
        }
    }
}

impl fmt::Display for GeminiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for GeminiModel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim();
        // Accept the fully-qualified resource name too.
        let id = id.strip_prefix("models/").unwrap_or(id);
        Self::ALL
            .into_iter()
            .find(|model| model.id() == id)
            .ok_or_else(|| ConfigError::UnknownModel(s.to_string()))
    }
}
