//! Test-only mock LLM provider.

use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message};

#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    chat_calls: Arc<Mutex<Vec<Vec<Message>>>>,
    pub default_response: String,
    pub embedding_dim: usize,
    pub fail_chat: bool,
    pub fail_embed: bool,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            chat_calls: Arc::new(Mutex::new(Vec::new())),
            default_response: "mock response".into(),
            embedding_dim: 16,
            fail_chat: false,
            fail_embed: false,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_chat: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failing_embed() -> Self {
        Self {
            fail_embed: true,
            ..Self::default()
        }
    }

    /// Messages passed to each `chat` call, in call order.
    #[must_use]
    pub fn chat_calls(&self) -> Vec<Vec<Message>> {
        self.chat_calls.lock().unwrap().clone()
    }
}

impl LlmProvider for MockProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        if self.fail_chat {
            return Err(LlmError::Other("mock LLM error".into()));
        }
        self.chat_calls.lock().unwrap().push(messages.to_vec());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if self.fail_embed {
            return Err(LlmError::Other("mock embed error".into()));
        }
        Ok(texts
            .iter()
            .map(|t| embed_text(t, self.embedding_dim))
            .collect())
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Deterministic unit-length vector folded from byte content. Identical texts
/// embed identically, so exact-content retrieval is reproducible in tests.
fn embed_text(text: &str, dim: usize) -> Vec<f32> {
    if dim == 0 {
        return Vec::new();
    }
    let mut v = vec![0.0f32; dim];
    for (i, b) in text.bytes().enumerate() {
        v[i % dim] += f32::from(b) / 255.0;
    }
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_responses_in_order() {
        let p = MockProvider::with_responses(vec!["one".into(), "two".into()]);
        assert_eq!(p.chat(&[Message::user("a")]).await.unwrap(), "one");
        assert_eq!(p.chat(&[Message::user("b")]).await.unwrap(), "two");
        assert_eq!(p.chat(&[Message::user("c")]).await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn failing_chat_errors() {
        let p = MockProvider::failing();
        assert!(p.chat(&[Message::user("a")]).await.is_err());
    }

    #[tokio::test]
    async fn embed_is_deterministic() {
        let p = MockProvider::default();
        let a = p.embed(&["same text".into()]).await.unwrap();
        let b = p.embed(&["same text".into()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn embed_batch_matches_input_length() {
        let p = MockProvider::default();
        let vectors = p.embed(&["a".into(), "b".into(), "c".into()]).await.unwrap();
        assert_eq!(vectors.len(), 3);
        assert!(vectors.iter().all(|v| v.len() == 16));
    }

    #[tokio::test]
    async fn chat_calls_are_recorded() {
        let p = MockProvider::default();
        p.chat(&[Message::system("s"), Message::user("u")])
            .await
            .unwrap();
        let calls = p.chat_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 2);
    }
}
