//! Document retrieval tool — embeds the query and searches the index.
//!
//! The index handle and the embedder are injected at construction; the
//! tool owns no global state. Every lower-layer failure is wrapped into a
//! readable observation string — nothing propagates past this boundary,
//! and an empty result is an answer ("nothing relevant"), not a failure.

use async_trait::async_trait;
use cornerman_core::error::IndexError;
use cornerman_core::model::Embedder;
use cornerman_core::text::truncate_chars;
use cornerman_core::tool::{Tool, ToolOutcome};
use cornerman_index::IndexHandle;
use std::sync::Arc;
use tracing::{debug, warn};

/// Tool name used by the marker protocol.
pub const DOC_SEARCH_TOOL_NAME: &str = "buscar_documentos";

/// Separator between retrieved fragments.
const FRAGMENT_SEPARATOR: &str = "\n\n--- FRAGMENTO ---\n\n";

/// Fixed reply when nothing relevant is found. Callers must treat this as
/// an empty-knowledge signal, not a failure.
pub const NO_RESULTS_MESSAGE: &str = "No se encontró información relevante en los documentos.";

const DEFAULT_TOP_K: usize = 3;
const DEFAULT_MAX_OUTPUT_CHARS: usize = 2000;
const OUTPUT_TRUNCATION_MARKER: &str = "\n... [resultado truncado]";

pub struct DocSearchTool {
    index: Arc<IndexHandle>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
    max_output_chars: usize,
}

impl DocSearchTool {
    pub fn new(index: Arc<IndexHandle>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: DEFAULT_TOP_K,
            max_output_chars: DEFAULT_MAX_OUTPUT_CHARS,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_output_chars(mut self, max_output_chars: usize) -> Self {
        self.max_output_chars = max_output_chars;
        self
    }

    async fn lookup(&self, query: &str) -> Result<String, String> {
        let store = self.index.get().await.map_err(|e| match e {
            IndexError::NotFound { .. } => {
                "No se pudo cargar el índice de documentos. Ejecuta primero: cornerman build-index"
                    .to_string()
            }
            other => format!("Error al buscar en documentos: {other}"),
        })?;

        if store.is_empty() {
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }

        let query_vector = self
            .embedder
            .embed_query(query)
            .await
            .map_err(|e| format!("Error al buscar en documentos: {e}"))?;

        let hits = store
            .search(&query_vector, self.top_k)
            .map_err(|e| format!("Error al buscar en documentos: {e}"))?;

        if hits.is_empty() {
            return Ok(NO_RESULTS_MESSAGE.to_string());
        }

        debug!(hits = hits.len(), "retrieved fragments");

        let joined = hits
            .iter()
            .map(|(chunk, _)| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join(FRAGMENT_SEPARATOR);

        Ok(truncate_chars(
            &joined,
            self.max_output_chars,
            OUTPUT_TRUNCATION_MARKER,
        ))
    }
}

#[async_trait]
impl Tool for DocSearchTool {
    fn name(&self) -> &str {
        DOC_SEARCH_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Busca en el catálogo de productos y políticas de la marca"
    }

    async fn run(&self, input: &str) -> ToolOutcome {
        debug!(query = %input, "document search invoked");
        match self.lookup(input).await {
            Ok(text) => ToolOutcome::ok(text),
            Err(message) => {
                warn!(message = %message, "document search failed");
                ToolOutcome::failed(message)
            }
        }
    }
}
