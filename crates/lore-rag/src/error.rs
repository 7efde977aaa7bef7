//! Error types for the retrieval pipeline.

use std::path::PathBuf;

use lore_llm::LlmError;

/// Errors that can occur during ingestion, retrieval, or answering.
#[derive(Debug, thiserror::Error)]
pub enum RagError {
    /// Source directory contained no loadable documents.
    #[error("no documents found in {}", .0.display())]
    NoDocuments(PathBuf),

    /// A document could not be read or decoded.
    #[error("failed to load document {}: {source}", .path.display())]
    DocumentLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A document exceeded the loader's size cap.
    #[error("file too large: {} ({size} bytes)", .path.display())]
    FileTooLarge { path: PathBuf, size: u64 },

    /// No persisted index at the configured path.
    #[error("index not found at {} (run ingestion first)", .0.display())]
    IndexNotFound(PathBuf),

    /// Caller violated an argument contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Embedding provider failure.
    #[error("embedding provider error: {0}")]
    Embedding(#[source] LlmError),

    /// LLM provider failure.
    #[error("LLM provider error: {0}")]
    Llm(#[source] LlmError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using `RagError`.
pub type Result<T> = std::result::Result<T, RagError>;
