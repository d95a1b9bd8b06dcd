//! Command implementations and shared wiring.

pub mod ask;
pub mod build_index;
pub mod chat;

use cornerman_agent::{ReasoningAgent, system_prompt};
use cornerman_config::{AppConfig, RemoteSettings};
use cornerman_core::memory::ConversationMemory;
use cornerman_core::model::Embedder;
use cornerman_index::IndexHandle;
use cornerman_providers::{OpenAiChatClient, OpenAiEmbeddingClient};
use std::sync::Arc;

/// Resolve the required remote settings, printing setup instructions when
/// something is missing.
pub(crate) fn resolve_remote(
    config: &AppConfig,
) -> Result<RemoteSettings, Box<dyn std::error::Error>> {
    match config.remote() {
        Ok(remote) => Ok(remote),
        Err(e) => {
            eprintln!();
            eprintln!("  ERROR: configuración incompleta: {e}");
            eprintln!();
            eprintln!("  Define las variables de entorno requeridas:");
            eprintln!("    CORNERMAN_API_KEY        (o GITHUB_TOKEN)");
            eprintln!("    CORNERMAN_CHAT_URL       (o OPENAI_BASE_URL)");
            eprintln!("    CORNERMAN_EMBEDDINGS_URL (o OPENAI_EMBEDDINGS_URL)");
            eprintln!();
            eprintln!(
                "  O agrégalas en: {}",
                AppConfig::config_dir().join("config.toml").display()
            );
            eprintln!();
            Err(e.into())
        }
    }
}

/// Wire a session agent from configuration: chat client, embedder, index
/// handle, tools, memory.
pub(crate) fn build_agent(
    config: &AppConfig,
) -> Result<ReasoningAgent, Box<dyn std::error::Error>> {
    let remote = resolve_remote(config)?;

    let chat_client = OpenAiChatClient::from_settings(&remote, &config.chat);
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbeddingClient::from_settings(
        &remote,
        config.index.embedding_model.clone(),
    ));
    let index = Arc::new(IndexHandle::new(config.index.dir.clone()));
    let tools = Arc::new(cornerman_tools::default_registry(index, embedder));

    let memory = ConversationMemory::new(config.memory.window, config.memory.max_message_chars);

    Ok(
        ReasoningAgent::new(Arc::new(chat_client), tools, system_prompt(&config.brand))
            .with_memory(memory)
            .with_max_iterations(config.agent.max_iterations)
            .with_history_window(config.memory.history_window)
            .with_input_limits(
                config.agent.max_input_chars,
                config.agent.max_tool_output_chars,
            ),
    )
}
