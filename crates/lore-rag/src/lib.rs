//! Retrieval-augmented answering: ingest a document corpus into a persisted
//! vector index, retrieve top-k chunks per query, and synthesize answers
//! grounded in the retrieved context with inline `[DOC_i]` citations.

pub mod chain;
pub mod context;
pub mod error;
pub mod eval;
pub mod indexer;
pub mod loader;
pub mod retriever;
pub mod splitter;
pub mod store;
pub mod types;

pub use chain::RagChain;
pub use error::{RagError, Result};
pub use retriever::{DEFAULT_TOP_K, Retriever};
pub use types::{AnswerResult, Chunk, Document, RetrievedChunk, SourceRef};
