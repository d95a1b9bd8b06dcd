//! Offline index build pipeline.
//!
//! Walks a document folder recursively, chunks every matching file,
//! embeds the chunk texts, and writes the artifact. Every failure here is
//! fatal for the build — an incomplete index is worse than no index, so
//! nothing is degraded or skipped silently.

use cornerman_core::error::{Error, IndexError};
use cornerman_core::model::Embedder;
use std::path::Path;
use tracing::info;
use walkdir::WalkDir;

use crate::chunker::Chunker;
use crate::flat::FlatIndex;
use crate::store::{Chunk, KnowledgeStore};

/// Summary of a completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub documents: usize,
    pub chunks: usize,
    pub dimension: usize,
}

/// Build the index artifact at `out_dir` from the documents under
/// `docs_dir` with the given extension (no leading dot).
pub async fn build_index(
    docs_dir: &Path,
    extension: &str,
    out_dir: &Path,
    chunker: &Chunker,
    embedder: &dyn Embedder,
    model: &str,
) -> Result<BuildReport, Error> {
    info!(path = %docs_dir.display(), extension, "collecting documents");

    let mut files = Vec::new();
    for entry in WalkDir::new(docs_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::Index(IndexError::Storage(format!(
                "walk {}: {e}",
                docs_dir.display()
            )))
        })?;
        if entry.file_type().is_file()
            && entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(Error::Index(IndexError::NoDocuments {
            extension: extension.to_string(),
            path: docs_dir.to_path_buf(),
        }));
    }

    let mut chunks: Vec<Chunk> = Vec::new();
    for path in &files {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Index(IndexError::Storage(format!("read {}: {e}", path.display())))
        })?;
        let source = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        info!(document = %source, chars = content.chars().count(), "loaded document");

        for text in chunker.split(&content) {
            chunks.push(Chunk {
                text,
                source: source.clone(),
            });
        }
    }

    if chunks.is_empty() {
        return Err(Error::Index(IndexError::NoDocuments {
            extension: extension.to_string(),
            path: docs_dir.to_path_buf(),
        }));
    }

    info!(documents = files.len(), chunks = chunks.len(), "chunking done");

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = embedder.embed_batch(&texts).await?;
    let index = FlatIndex::build(vectors).map_err(Error::Index)?;
    let dimension = index.dimension();

    info!(vectors = index.len(), dimension, "index built");

    let store = KnowledgeStore::new(index, chunks, model).map_err(Error::Index)?;
    store.save(out_dir).map_err(Error::Index)?;

    Ok(BuildReport {
        documents: files.len(),
        chunks: store.len(),
        dimension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::KnowledgeStore;
    use async_trait::async_trait;
    use cornerman_core::error::EmbedError;

    /// Deterministic toy embedder: [char count, word count].
    struct CountingEmbedder;

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Ok(texts
                .iter()
                .map(|t| {
                    vec![
                        t.chars().count() as f32,
                        t.split_whitespace().count() as f32,
                    ]
                })
                .collect())
        }
    }

    /// Embedder that always fails, to prove failures stop the build.
    struct BrokenEmbedder;

    #[async_trait]
    impl Embedder for BrokenEmbedder {
        async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbedError> {
            Err(EmbedError::RemoteService {
                status: 500,
                body: "boom".into(),
            })
        }
    }

    fn write_docs(dir: &Path) {
        std::fs::write(
            dir.join("productos.md"),
            "## GUANTES\n\nGuantes de 12 oz para sparring.\n\n## VENDAS\n\nVendas de 4 metros.",
        )
        .unwrap();
        std::fs::write(dir.join("politicas.md"), "Devoluciones dentro de 30 días.").unwrap();
        std::fs::write(dir.join("notas.txt"), "no debería indexarse").unwrap();
    }

    #[tokio::test]
    async fn builds_a_loadable_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        write_docs(&docs);
        let out = tmp.path().join("index");

        let chunker = Chunker::new(2000, 200);
        let report = build_index(&docs, "md", &out, &chunker, &CountingEmbedder, "toy-model")
            .await
            .unwrap();

        assert_eq!(report.documents, 2);
        assert_eq!(report.dimension, 2);
        assert!(report.chunks >= 2);

        let store = KnowledgeStore::load(&out).unwrap();
        assert_eq!(store.len(), report.chunks);
        assert_eq!(store.manifest().model, "toy-model");
        // The .txt file must not have been picked up.
        assert!(store.chunks().iter().all(|c| c.source.ends_with(".md")));
    }

    #[tokio::test]
    async fn empty_corpus_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        let out = tmp.path().join("index");

        let chunker = Chunker::new(2000, 200);
        let err = build_index(&docs, "md", &out, &chunker, &CountingEmbedder, "toy-model")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Index(IndexError::NoDocuments { .. })
        ));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn embedding_failure_stops_the_build() {
        let tmp = tempfile::tempdir().unwrap();
        let docs = tmp.path().join("docs");
        std::fs::create_dir(&docs).unwrap();
        write_docs(&docs);
        let out = tmp.path().join("index");

        let chunker = Chunker::new(2000, 200);
        let err = build_index(&docs, "md", &out, &chunker, &BrokenEmbedder, "toy-model")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Embed(_)));
        // No partial artifact may exist.
        assert!(!out.exists());
    }
}
