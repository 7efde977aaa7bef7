//! Top-k semantic retrieval over the persisted index.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lore_llm::{LlmError, LlmProvider};

use crate::error::{RagError, Result};
use crate::store::FlatIndex;
use crate::types::RetrievedChunk;

/// Default number of chunks retrieved per query.
pub const DEFAULT_TOP_K: usize = 4;

pub struct Retriever<P> {
    provider: Arc<P>,
    index_path: PathBuf,
}

impl<P: LlmProvider> Retriever<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            provider,
            index_path: index_path.into(),
        }
    }

    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Retrieve the `k` most similar chunks for `query`, ranked from 1 by
    /// decreasing similarity. An index with fewer than `k` chunks returns
    /// them all; an empty index returns an empty vector.
    ///
    /// The index is reloaded on every call, so queries issued while a
    /// re-ingestion swaps the file see either the old snapshot or the new
    /// one, never a mix.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] for `k == 0`,
    /// [`RagError::IndexNotFound`] when no index is persisted, and
    /// [`RagError::Embedding`] when the query cannot be embedded.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<RetrievedChunk>> {
        if k == 0 {
            return Err(RagError::InvalidArgument("k must be positive".into()));
        }

        let index = FlatIndex::load(&self.index_path).await?;
        if index.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = self
            .provider
            .embed(&[query.to_owned()])
            .await
            .map_err(RagError::Embedding)?;
        let query_vector = vectors.into_iter().next().ok_or_else(|| {
            RagError::Embedding(LlmError::Other("provider returned no query embedding".into()))
        })?;

        let hits = index.search(&query_vector, k)?;
        tracing::debug!(query, k, hits = hits.len(), "retrieved chunks");
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use lore_llm::mock::MockProvider;

    use super::*;
    use crate::store::{FlatIndex, IndexEntry};

    async fn seed_index(path: &Path, contents: &[&str]) {
        let provider = MockProvider::default();
        let texts: Vec<String> = contents.iter().map(|c| (*c).to_owned()).collect();
        let vectors = provider.embed(&texts).await.unwrap();
        let entries = contents
            .iter()
            .zip(vectors)
            .map(|(content, vector)| IndexEntry {
                vector,
                content: (*content).to_owned(),
                source: "seed.txt".to_owned(),
                chunk_index: 0,
            })
            .collect();
        FlatIndex::new(entries).save(path).await.unwrap();
    }

    #[tokio::test]
    async fn retrieves_exact_match_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        seed_index(&path, &["the sky is blue", "completely different words"]).await;

        let retriever = Retriever::new(Arc::new(MockProvider::default()), &path);
        let hits = retriever.retrieve("the sky is blue", 2).await.unwrap();

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].content, "the sky is blue");
        assert_eq!(hits[0].rank, 1);
        assert!((hits[0].score - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn fewer_entries_than_k_returns_all() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        seed_index(&path, &["only entry"]).await;

        let retriever = Retriever::new(Arc::new(MockProvider::default()), &path);
        let hits = retriever.retrieve("anything", 4).await.unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[tokio::test]
    async fn empty_index_returns_empty_not_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        FlatIndex::default().save(&path).await.unwrap();

        let retriever = Retriever::new(Arc::new(MockProvider::default()), &path);
        let hits = retriever.retrieve("anything", 4).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn missing_index_is_index_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(
            Arc::new(MockProvider::default()),
            dir.path().join("absent.json"),
        );
        let err = retriever.retrieve("q", 4).await.unwrap_err();
        assert!(matches!(err, RagError::IndexNotFound(_)));
    }

    #[tokio::test]
    async fn zero_k_is_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let retriever = Retriever::new(
            Arc::new(MockProvider::default()),
            dir.path().join("index.json"),
        );
        let err = retriever.retrieve("q", 0).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn embed_failure_surfaces_as_embedding_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");
        seed_index(&path, &["entry"]).await;

        let retriever = Retriever::new(Arc::new(MockProvider::failing_embed()), &path);
        let err = retriever.retrieve("q", 4).await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }
}
