//! Hosted model clients for Cornerman.
//!
//! Two thin HTTP clients over OpenAI-compatible endpoints:
//!
//! - [`OpenAiChatClient`] — chat completions with a bounded retry policy
//!   (429 / 5xx / timeout) and a deterministic status-to-outcome mapping.
//! - [`OpenAiEmbeddingClient`] — embeddings with transparent batching and
//!   deliberately **no** retries: an index build that cannot embed must
//!   stop, not degrade.
//!
//! Both implement the traits in `cornerman-core`, so everything above this
//! crate is testable without a network.

pub mod chat;
pub mod embeddings;
pub mod retry;

pub use chat::OpenAiChatClient;
pub use embeddings::OpenAiEmbeddingClient;
pub use retry::RetryPolicy;

/// Cap an HTTP body for error payloads and logs.
pub(crate) fn body_snippet(body: &str) -> String {
    cornerman_core::text::truncate_chars(body, 200, "…")
}

#[cfg(test)]
mod test_http;
