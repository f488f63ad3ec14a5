//! Retrieval settings for the demo query engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub document: PathBuf,
    pub query: String,
    /// Number of nodes handed to the LLM (valid range: 1-20).
    pub similarity_top_k: u32,
    /// Upper bound on node length in characters (valid range: 200-20000).
    pub max_node_chars: u32,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            document: PathBuf::from("data/abramov.txt"),
            query: "What did the author do in college?".into(),
            similarity_top_k: 2,
            max_node_chars: 2000,
        }
    }
}
