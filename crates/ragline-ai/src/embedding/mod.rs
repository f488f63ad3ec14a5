//! Text embedding capability and the Mistral AI client.

mod mistral;

use async_trait::async_trait;

use crate::LlmError;

pub use mistral::{MistralConfig, MistralEmbedding, MISTRAL_API_KEY_ENV, MISTRAL_DEFAULT_BASE_URL};

/// A backend turning text into dense vectors.
#[async_trait]
pub trait Embedding: Send + Sync {
    /// One vector per input, in input order.
    async fn text_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;

    async fn text_embedding(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        self.text_embeddings(&[text.to_string()])
            .await?
            .pop()
            .ok_or_else(|| LlmError::MalformedResponse("no embedding returned".into()))
    }

    /// Embedding for a retrieval query. Same as `text_embedding` unless the
    /// backend distinguishes queries from documents.
    async fn query_embedding(&self, query: &str) -> Result<Vec<f32>, LlmError> {
        self.text_embedding(query).await
    }
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 when the lengths differ or either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct LengthEmbedding;

    #[async_trait]
    impl Embedding for LengthEmbedding {
        async fn text_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
    }

    #[tokio::test]
    async fn single_and_query_embeddings_use_batch() {
        let embedder = LengthEmbedding;
        assert_eq!(embedder.text_embedding("abc").await.unwrap(), vec![3.0, 1.0]);
        assert_eq!(embedder.query_embedding("ab").await.unwrap(), vec![2.0, 1.0]);
    }

    #[test]
    fn cosine_of_parallel_vectors_is_one() {
        let sim = cosine_similarity(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn cosine_degenerate_inputs() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }
}
