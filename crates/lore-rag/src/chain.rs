//! Grounded answer synthesis over retrieved context.

use std::path::PathBuf;
use std::sync::Arc;

use lore_llm::{LlmProvider, Message};

use crate::context::format_as_context;
use crate::error::{RagError, Result};
use crate::retriever::{DEFAULT_TOP_K, Retriever};
use crate::types::{AnswerResult, SourceRef};

const SYSTEM_PROMPT: &str = "You are a helpful assistant. Use the context to answer the question. \
     Always mention the citation tags like [DOC_1], [DOC_2] in your answer \
     so the user knows which document you used.";

/// Retrieval plus synthesis: one embedding call, one chat call per query.
pub struct RagChain<P> {
    retriever: Retriever<P>,
    provider: Arc<P>,
}

impl<P: LlmProvider> RagChain<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            retriever: Retriever::new(Arc::clone(&provider), index_path),
            provider,
        }
    }

    /// Answer `query` grounded in the top-`k` retrieved chunks.
    ///
    /// The returned `sources` list is built from the same retrieval result
    /// as the prompt context, so every `[DOC_n]` tag the model can cite
    /// resolves against it, and `sources.len()` always equals the number of
    /// chunks rendered into the context.
    ///
    /// # Errors
    ///
    /// Propagates retrieval errors and returns [`RagError::Llm`] when the
    /// provider call fails; no partial answer is returned.
    pub async fn answer(&self, query: &str, k: usize) -> Result<AnswerResult> {
        let retrieved = self.retriever.retrieve(query, k).await?;
        let context = format_as_context(&retrieved);

        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(build_user_prompt(query, &context)),
        ];
        let answer = self
            .provider
            .chat(&messages)
            .await
            .map_err(RagError::Llm)?;

        let sources = retrieved
            .iter()
            .map(|chunk| SourceRef::new(chunk.rank, chunk.source.clone()))
            .collect();

        Ok(AnswerResult { answer, sources })
    }

    /// [`RagChain::answer`] with the default top-k.
    ///
    /// # Errors
    ///
    /// See [`RagChain::answer`].
    pub async fn answer_default(&self, query: &str) -> Result<AnswerResult> {
        self.answer(query, DEFAULT_TOP_K).await
    }
}

fn build_user_prompt(query: &str, context: &str) -> String {
    if context.is_empty() {
        format!(
            "Question: {query}\n\n\
             No context is available for this question. State that you cannot \
             answer from the indexed documents."
        )
    } else {
        format!(
            "Question: {query}\n\n\
             Context:\n{context}\n\n\
             Answer clearly and concisely. If you don't know, say you don't know."
        )
    }
}
