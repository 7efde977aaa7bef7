use std::fmt;

use serde::Serialize;

/// A loaded source document with provenance.
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub source: String,
}

/// A bounded contiguous slice of a document, the retrieval unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub chunk_index: usize,
}

/// A chunk returned from similarity search, ranked from 1 by decreasing score.
#[derive(Debug, Clone)]
pub struct RetrievedChunk {
    pub rank: usize,
    pub score: f32,
    pub content: String,
    pub source: String,
    pub chunk_index: usize,
}

/// A citation tag paired with the source it resolves to.
///
/// Built in the same pass as the rendered context, so the tags cited in an
/// answer always resolve against this list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    pub tag: String,
    pub source: String,
}

impl SourceRef {
    #[must_use]
    pub fn new(rank: usize, source: impl Into<String>) -> Self {
        Self {
            tag: format!("DOC_{rank}"),
            source: source.into(),
        }
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tag, self.source)
    }
}

/// Answer text plus the sources its citation tags resolve against.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerResult {
    pub answer: String,
    pub sources: Vec<SourceRef>,
}
