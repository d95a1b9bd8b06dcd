//! Built-in tool implementations for Cornerman.
//!
//! Two tools back the assistant: document retrieval over the knowledge
//! index and a restricted arithmetic calculator. Both take free-form text
//! input and always answer with text — errors included — so the reasoning
//! loop can feed any outcome straight back to the model.

pub mod calculator;
pub mod doc_search;

pub use calculator::CalculatorTool;
pub use doc_search::DocSearchTool;

use cornerman_core::model::Embedder;
use cornerman_core::tool::ToolRegistry;
use cornerman_index::IndexHandle;
use std::sync::Arc;

/// Create the default tool registry: document search plus calculator.
///
/// The index handle and the embedder are injected here — tools hold no
/// global state.
pub fn default_registry(index: Arc<IndexHandle>, embedder: Arc<dyn Embedder>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(DocSearchTool::new(index, embedder)));
    registry.register(Box::new(CalculatorTool));
    registry
}
