//! Error types for the Cornerman domain.
//!
//! Uses `thiserror` for ergonomic error definitions; each bounded context
//! has its own enum. Display strings are diagnostic (for logs). The chat
//! errors additionally render a Spanish user-facing message at the UI
//! boundary via [`ChatError::user_message`] — callers decide between the
//! two; nothing below the boundary formats text for end users.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for Cornerman operations that cross contexts
/// (notably the offline index build, which mixes embedding and storage).
#[derive(Debug, Error)]
pub enum Error {
    #[error("chat error: {0}")]
    Chat(#[from] ChatError),

    #[error("embedding error: {0}")]
    Embed(#[from] EmbedError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the chat completion client.
///
/// Fatal kinds abort the reasoning turn and are surfaced verbatim; the rest
/// flow back into the loop as plain text (the model-facing contract treats
/// every outcome as a string).
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("chat endpoint rejected the request (400): {0}")]
    BadRequest(String),

    #[error("chat endpoint rejected the credentials (401)")]
    Auth,

    #[error("chat endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("chat request timed out after {attempts} attempt(s)")]
    Timeout { attempts: usize },

    #[error("connection to chat endpoint failed: {0}")]
    Connection(String),

    #[error("malformed chat response: {0}")]
    Malformed(String),

    #[error("retry budget exhausted after {attempts} attempt(s)")]
    Exhausted { attempts: usize },
}

impl ChatError {
    /// Whether this failure should abort the current reasoning turn
    /// outright. Soft failures (overlong request, timeout, garbled reply)
    /// are still answered with a friendly message in the normal flow.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ChatError::Auth | ChatError::Connection(_) | ChatError::Status { .. }
        )
    }

    /// The Spanish message shown to the end user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::BadRequest(_) => {
                "Disculpa, tu consulta es muy compleja. Intenta simplificarla.".to_string()
            }
            ChatError::Auth => "❌ Error de autenticación. Token inválido o expirado.".to_string(),
            ChatError::Status { status, .. } => {
                format!("Error técnico (código {status}). Por favor intenta de nuevo.")
            }
            ChatError::Timeout { .. } => {
                "La consulta tardó demasiado. Intenta con una pregunta más simple.".to_string()
            }
            ChatError::Connection(_) => "❌ Error de conexión. Verifica tu internet.".to_string(),
            ChatError::Malformed(_) => {
                "Ocurrió un error al procesar tu consulta. Intenta reformularla.".to_string()
            }
            ChatError::Exhausted { .. } => {
                "No pude procesar tu consulta después de varios intentos.".to_string()
            }
        }
    }
}

/// Failures of the embedding client. No retry happens at this layer: a
/// failed embedding run must stop the index build rather than mask data
/// loss, so every variant is terminal for the caller.
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("embeddings endpoint returned status {status}: {body}")]
    RemoteService { status: u16, body: String },

    #[error("malformed embeddings response: {0}")]
    Malformed(String),

    #[error("embeddings request failed: {0}")]
    Transport(String),
}

/// Failures of the vector index and its on-disk artifact.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("index artifact not found at {path}; run `cornerman build-index` first")]
    NotFound { path: PathBuf },

    #[error("no documents with extension .{extension} found under {path}")]
    NoDocuments { extension: String, path: PathBuf },

    #[error("index storage error: {0}")]
    Storage(String),

    #[error("corrupt index artifact: {0}")]
    Corrupt(String),

    #[error("query dimension {got} does not match index dimension {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Failures of tool dispatch. Tool *execution* never fails — tools report
/// problems inside their textual output — so the only variant is a missing
/// registry entry.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
}
