//! Traits over the remote model endpoints.
//!
//! [`ChatModel`] abstracts the chat completion endpoint and [`Embedder`]
//! the embeddings endpoint. The reasoning loop and the tools only see
//! these traits — HTTP implementations live in `cornerman-providers`, and
//! tests substitute scripted stubs.

use crate::error::{ChatError, EmbedError};
use crate::message::ChatMessage;
use async_trait::async_trait;

/// A chat completion backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send the full message context and return the model reply text.
    ///
    /// Implementations own their retry policy; by the time this returns an
    /// error, the retry budget is spent and the error is final for this
    /// turn.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChatError>;
}

/// An embedding backend producing fixed-dimension vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, preserving input order in the output.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError>;

    /// Embed a single query string (one-element batch).
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let mut vectors = self.embed_batch(std::slice::from_ref(&text.to_string())).await?;
        vectors
            .pop()
            .ok_or_else(|| EmbedError::Malformed("empty embedding batch response".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }
    }

    #[tokio::test]
    async fn embed_query_uses_single_element_batch() {
        let embedder = FixedEmbedder;
        let vector = embedder.embed_query("hola").await.unwrap();
        assert_eq!(vector, vec![4.0]);
    }
}
