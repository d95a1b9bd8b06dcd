//! The on-disk index artifact and its process-wide handle.
//!
//! An artifact is a directory of three files:
//!
//! - `index.json` — the serialized [`FlatIndex`]
//! - `chunks.jsonl` — the parallel chunk sequence, one JSON object per line
//! - `manifest.json` — embedding model name, dimension, chunk count
//!
//! Writes stage into a temporary sibling directory and rename into place,
//! so a crash mid-write never leaves a half-written artifact where the
//! loader looks. Loads are read-only and validate the manifest against
//! the actual contents before anything is served from them.

use chrono::{DateTime, Utc};
use cornerman_core::error::IndexError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::info;

use crate::flat::FlatIndex;

const INDEX_FILE: &str = "index.json";
const CHUNKS_FILE: &str = "chunks.jsonl";
const MANIFEST_FILE: &str = "manifest.json";

/// A contiguous slice of a source document — the unit of retrieval.
/// Immutable after build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// File name of the originating document.
    pub source: String,
}

/// Small config record stored alongside the index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub model: String,
    pub dimension: usize,
    pub chunk_count: usize,
    pub built_at: DateTime<Utc>,
}

/// A loaded, read-only index artifact: vectors plus the parallel chunks.
#[derive(Debug)]
pub struct KnowledgeStore {
    index: FlatIndex,
    chunks: Vec<Chunk>,
    manifest: Manifest,
}

impl KnowledgeStore {
    /// Pair an index with its chunk sequence. Counts must match — the
    /// positional correspondence is the whole contract.
    pub fn new(
        index: FlatIndex,
        chunks: Vec<Chunk>,
        model: impl Into<String>,
    ) -> Result<Self, IndexError> {
        if index.len() != chunks.len() {
            return Err(IndexError::Corrupt(format!(
                "{} vectors but {} chunks",
                index.len(),
                chunks.len()
            )));
        }
        let manifest = Manifest {
            model: model.into(),
            dimension: index.dimension(),
            chunk_count: chunks.len(),
            built_at: Utc::now(),
        };
        Ok(Self {
            index,
            chunks,
            manifest,
        })
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Nearest chunks to `query`, ascending distance.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(&Chunk, f32)>, IndexError> {
        let hits = self.index.search(query, k)?;
        Ok(hits
            .into_iter()
            .filter_map(|(i, dist)| self.chunks.get(i).map(|c| (c, dist)))
            .collect())
    }

    /// Write the artifact atomically: stage into a temp directory next to
    /// the target, then rename into place.
    pub fn save(&self, dir: &Path) -> Result<(), IndexError> {
        let parent = match dir.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent).map_err(|e| storage("create parent directory", e))?;

        let staging = tempfile::tempdir_in(parent).map_err(|e| storage("create staging dir", e))?;

        let index_json = serde_json::to_string(&self.index)
            .map_err(|e| IndexError::Storage(format!("serialize index: {e}")))?;
        std::fs::write(staging.path().join(INDEX_FILE), index_json)
            .map_err(|e| storage("write index", e))?;

        let mut chunk_lines = String::new();
        for chunk in &self.chunks {
            let line = serde_json::to_string(chunk)
                .map_err(|e| IndexError::Storage(format!("serialize chunk: {e}")))?;
            chunk_lines.push_str(&line);
            chunk_lines.push('\n');
        }
        std::fs::write(staging.path().join(CHUNKS_FILE), chunk_lines)
            .map_err(|e| storage("write chunks", e))?;

        let manifest_json = serde_json::to_string_pretty(&self.manifest)
            .map_err(|e| IndexError::Storage(format!("serialize manifest: {e}")))?;
        std::fs::write(staging.path().join(MANIFEST_FILE), manifest_json)
            .map_err(|e| storage("write manifest", e))?;

        let staged = staging.keep();
        if dir.exists() {
            std::fs::remove_dir_all(dir).map_err(|e| storage("remove previous artifact", e))?;
        }
        std::fs::rename(&staged, dir).map_err(|e| storage("move artifact into place", e))?;

        info!(
            path = %dir.display(),
            chunks = self.chunks.len(),
            dimension = self.manifest.dimension,
            "index artifact saved"
        );
        Ok(())
    }

    /// Load an artifact read-only, validating it against its manifest.
    pub fn load(dir: &Path) -> Result<Self, IndexError> {
        if !dir.is_dir() {
            return Err(IndexError::NotFound {
                path: dir.to_path_buf(),
            });
        }

        let manifest_raw = std::fs::read_to_string(dir.join(MANIFEST_FILE))
            .map_err(|e| storage("read manifest", e))?;
        let manifest: Manifest = serde_json::from_str(&manifest_raw)
            .map_err(|e| IndexError::Corrupt(format!("manifest: {e}")))?;

        let index_raw = std::fs::read_to_string(dir.join(INDEX_FILE))
            .map_err(|e| storage("read index", e))?;
        let index: FlatIndex = serde_json::from_str(&index_raw)
            .map_err(|e| IndexError::Corrupt(format!("index: {e}")))?;

        let chunks_raw = std::fs::read_to_string(dir.join(CHUNKS_FILE))
            .map_err(|e| storage("read chunks", e))?;
        let chunks: Vec<Chunk> = chunks_raw
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| {
                serde_json::from_str(l).map_err(|e| IndexError::Corrupt(format!("chunk line: {e}")))
            })
            .collect::<Result<_, _>>()?;

        if index.len() != chunks.len() || chunks.len() != manifest.chunk_count {
            return Err(IndexError::Corrupt(format!(
                "manifest claims {} chunks, found {} vectors and {} chunks",
                manifest.chunk_count,
                index.len(),
                chunks.len()
            )));
        }
        if index.dimension() != manifest.dimension {
            return Err(IndexError::Corrupt(format!(
                "manifest claims dimension {}, index has {}",
                manifest.dimension,
                index.dimension()
            )));
        }

        info!(
            path = %dir.display(),
            chunks = chunks.len(),
            dimension = manifest.dimension,
            model = %manifest.model,
            "index artifact loaded"
        );

        Ok(Self {
            index,
            chunks,
            manifest,
        })
    }
}

fn storage(action: &str, e: std::io::Error) -> IndexError {
    IndexError::Storage(format!("{action}: {e}"))
}

/// Lazily-initialized, process-wide handle to the artifact.
///
/// Owned by whoever constructs the tools and shared via `Arc`. The first
/// successful load is cached for the process lifetime; the artifact is
/// treated as immutable, so there is no invalidation — replacing it on
/// disk requires a restart to take effect. Safe to share across
/// concurrent sessions: reads only.
#[derive(Debug)]
pub struct IndexHandle {
    dir: PathBuf,
    cell: OnceCell<KnowledgeStore>,
}

impl IndexHandle {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cell: OnceCell::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The loaded store, loading it on first use. A failed load is not
    /// cached; the next call retries.
    pub async fn get(&self) -> Result<&KnowledgeStore, IndexError> {
        self.cell
            .get_or_try_init(|| async { KnowledgeStore::load(&self.dir) })
            .await
    }
}
