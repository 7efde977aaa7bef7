//! Offline ingestion: load documents, split, embed, persist the index.

use std::path::Path;
use std::sync::Arc;

use lore_llm::{LlmError, LlmProvider};

use crate::error::{RagError, Result};
use crate::loader::TextLoader;
use crate::splitter::{SplitterConfig, TextSplitter};
use crate::store::{FlatIndex, IndexEntry};
use crate::types::Chunk;

/// Chunks embedded per provider request.
const EMBED_BATCH: usize = 64;

#[derive(Debug, Clone, Copy)]
pub struct IngestStats {
    pub documents: usize,
    pub chunks: usize,
}

/// Builds the persisted index from a source directory. One ingestion run per
/// corpus update; re-running fully replaces the prior index.
pub struct Indexer<P> {
    provider: Arc<P>,
    loader: TextLoader,
    splitter: TextSplitter,
}

impl<P: LlmProvider> Indexer<P> {
    /// # Errors
    ///
    /// Returns [`RagError::InvalidArgument`] when the splitter configuration
    /// is invalid.
    pub fn new(provider: Arc<P>, splitter_config: SplitterConfig) -> Result<Self> {
        splitter_config.validate()?;
        Ok(Self {
            provider,
            loader: TextLoader::default(),
            splitter: TextSplitter::new(splitter_config),
        })
    }

    #[must_use]
    pub fn with_loader(mut self, loader: TextLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Run the full ingestion pipeline and atomically replace the index at
    /// `index_path`.
    ///
    /// # Errors
    ///
    /// Fails on an empty corpus, any unreadable document, or any embedding
    /// failure. Nothing is written unless every step succeeds.
    pub async fn ingest(&self, source_dir: &Path, index_path: &Path) -> Result<IngestStats> {
        let documents = self.loader.load_dir(source_dir).await?;
        tracing::info!(count = documents.len(), dir = %source_dir.display(), "loaded documents");

        let mut chunks: Vec<Chunk> = Vec::new();
        for document in &documents {
            chunks.extend(self.splitter.split(document));
        }
        tracing::info!(count = chunks.len(), "split into chunks");

        let mut entries = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(EMBED_BATCH) {
            let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let vectors = self
                .provider
                .embed(&texts)
                .await
                .map_err(RagError::Embedding)?;
            if vectors.len() != batch.len() {
                return Err(RagError::Embedding(LlmError::Other(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    vectors.len()
                ))));
            }
            for (chunk, vector) in batch.iter().zip(vectors) {
                entries.push(IndexEntry {
                    vector,
                    content: chunk.content.clone(),
                    source: chunk.source.clone(),
                    chunk_index: chunk.chunk_index,
                });
            }
        }

        let index = FlatIndex::new(entries);
        index.save(index_path).await?;
        tracing::info!(path = %index_path.display(), chunks = index.len(), "index persisted");

        Ok(IngestStats {
            documents: documents.len(),
            chunks: index.len(),
        })
    }
}
