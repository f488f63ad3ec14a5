//! Retrieval section validation.

use crate::schema::RaglineConfig;

use super::helpers::validate_range;

pub(crate) fn validate_rag(errors: &mut Vec<String>, config: &RaglineConfig) {
    validate_range(
        errors,
        "rag.similarity_top_k",
        config.rag.similarity_top_k,
        1,
        20,
    );
    validate_range(
        errors,
        "rag.max_node_chars",
        config.rag.max_node_chars,
        200,
        20_000,
    );
    if config.rag.query.trim().is_empty() {
        errors.push("rag.query must not be empty".into());
    }
}
