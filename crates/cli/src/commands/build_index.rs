//! `cornerman build-index` — Offline index build step.
//!
//! Any failure exits non-zero with a diagnostic: an incomplete index is
//! worse than no index.

use cornerman_config::AppConfig;
use cornerman_index::{Chunker, build_index};
use cornerman_providers::OpenAiEmbeddingClient;
use std::path::PathBuf;

pub async fn run(
    docs: Option<PathBuf>,
    out: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let remote = super::resolve_remote(&config)?;

    let docs_dir = docs.unwrap_or_else(|| config.index.docs_dir.clone());
    let out_dir = out.unwrap_or_else(|| config.index.dir.clone());

    println!();
    println!("  Construyendo índice de documentos");
    println!("  Documentos: {}", docs_dir.display());
    println!("  Destino:    {}", out_dir.display());
    println!("  Modelo:     {}", config.index.embedding_model);
    println!();

    let chunker = Chunker::new(config.index.chunk_size, config.index.chunk_overlap);
    let embedder =
        OpenAiEmbeddingClient::from_settings(&remote, config.index.embedding_model.clone());

    let report = build_index(
        &docs_dir,
        &config.index.extension,
        &out_dir,
        &chunker,
        &embedder,
        &config.index.embedding_model,
    )
    .await
    .map_err(|e| format!("La construcción del índice falló: {e}"))?;

    println!("  ✅ Índice creado");
    println!("     Documentos: {}", report.documents);
    println!("     Chunks:     {}", report.chunks);
    println!("     Dimensión:  {}", report.dimension);
    println!();
    println!("  Siguiente paso: cornerman chat");
    println!();
    Ok(())
}
