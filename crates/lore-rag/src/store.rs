//! Flat cosine-similarity index persisted as a single JSON file.
//!
//! The index is rebuilt wholesale on every ingestion run and replaced
//! atomically: the new file is written to a staging path and renamed over
//! the destination, so concurrent readers see either the old snapshot or
//! the new one, never a mix.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};
use crate::types::RetrievedChunk;

/// One embedded chunk as persisted in the index file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub vector: Vec<f32>,
    pub content: String,
    pub source: String,
    pub chunk_index: usize,
}

/// Brute-force cosine index over one corpus snapshot.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FlatIndex {
    entries: Vec<IndexEntry>,
}

impl FlatIndex {
    #[must_use]
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the index at `path`, creating the parent directory if absent.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails; on
    /// failure the previous index at `path` is left untouched.
    pub async fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = staging_path(path);
        let bytes = serde_json::to_vec(self)?;
        tokio::fs::write(&staging, &bytes).await?;
        tokio::fs::rename(&staging, path).await?;
        Ok(())
    }

    /// Load a persisted index.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::IndexNotFound`] when nothing is persisted at
    /// `path`, distinct from other I/O failures so callers can tell the
    /// operator to run ingestion.
    pub async fn load(path: &Path) -> Result<Self> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RagError::IndexNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Top-`k` entries by cosine similarity, ranked from 1. Ties keep
    /// insertion order (stable sort); fewer than `k` entries returns all.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] when `k` is zero.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedChunk>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be positive".into()));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(query, &entry.vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .enumerate()
            .map(|(i, (idx, score))| {
                let entry = &self.entries[idx];
                RetrievedChunk {
                    rank: i + 1,
                    score,
                    content: entry.content.clone(),
                    source: entry.source.clone(),
                    chunk_index: entry.chunk_index,
                }
            })
            .collect())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".staging");
    PathBuf::from(os)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
