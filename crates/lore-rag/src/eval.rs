//! Keyword-overlap evaluation over the full answer pipeline.
//!
//! The scoring rule is intentionally crude and preserved exactly for
//! comparability with historical runs: `recall` is the fraction of expected
//! keywords appearing case-insensitively as substrings of the answer, and
//! `precision` divides the same hit count by the answer's whitespace word
//! count. Word-count "precision" is not precision in the IR sense; treat the
//! numbers as a regression signal, not semantic evaluation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use lore_llm::LlmProvider;

use crate::chain::RagChain;
use crate::error::{RagError, Result};

/// One labeled question from the evaluation corpus.
#[derive(Debug, Clone, Deserialize)]
pub struct EvalExample {
    pub question: String,
    #[serde(default)]
    pub expected_keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExampleScore {
    pub question: String,
    pub precision: f64,
    pub recall: f64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct EvalAverages {
    pub precision: f64,
    pub recall: f64,
}

#[derive(Debug, Serialize)]
pub struct EvalReport {
    pub examples: Vec<ExampleScore>,
    /// `None` when the example set was empty.
    pub averages: Option<EvalAverages>,
}

/// Load line-delimited examples from `path`. Blank lines are skipped.
///
/// # Errors
///
/// Returns [`RagError::DocumentLoad`] when the file cannot be read and
/// [`RagError::Json`] on a malformed record.
pub async fn load_examples(path: &Path) -> Result<Vec<EvalExample>> {
    let content =
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RagError::DocumentLoad {
                path: path.to_path_buf(),
                source: e,
            })?;

    let mut examples = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        examples.push(serde_json::from_str(line)?);
    }
    Ok(examples)
}

/// Substring-containment metrics: `(precision, recall)`.
///
/// Zero denominators (empty keyword set, empty answer) score 0.0 rather
/// than erroring.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn keyword_metrics(answer: &str, keywords: &[String]) -> (f64, f64) {
    if keywords.is_empty() {
        return (0.0, 0.0);
    }

    let answer_lower = answer.to_lowercase();
    let hits = keywords
        .iter()
        .filter(|kw| answer_lower.contains(&kw.to_lowercase()))
        .count();

    let words = answer.split_whitespace().count();
    let precision = if words == 0 {
        0.0
    } else {
        hits as f64 / words as f64
    };
    let recall = hits as f64 / keywords.len() as f64;
    (precision, recall)
}

/// Runs every example through the answer pipeline and aggregates scores.
pub struct Evaluator<P> {
    chain: RagChain<P>,
    k: usize,
}

impl<P: LlmProvider> Evaluator<P> {
    #[must_use]
    pub fn new(chain: RagChain<P>, k: usize) -> Self {
        Self { chain, k }
    }

    /// # Errors
    ///
    /// The first pipeline failure aborts the run; per-example scoring itself
    /// cannot fail.
    #[allow(clippy::cast_precision_loss)]
    pub async fn run(&self, examples: &[EvalExample]) -> Result<EvalReport> {
        let mut scores = Vec::with_capacity(examples.len());

        for example in examples {
            let result = self.chain.answer(&example.question, self.k).await?;
            let (precision, recall) = keyword_metrics(&result.answer, &example.expected_keywords);
            tracing::info!(question = %example.question, precision, recall, "scored example");
            scores.push(ExampleScore {
                question: example.question.clone(),
                precision,
                recall,
            });
        }

        let averages = (!scores.is_empty()).then(|| EvalAverages {
            precision: scores.iter().map(|s| s.precision).sum::<f64>() / scores.len() as f64,
            recall: scores.iter().map(|s| s.recall).sum::<f64>() / scores.len() as f64,
        });

        Ok(EvalReport {
            examples: scores,
            averages,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lore_llm::mock::MockProvider;

    use super::*;
    use crate::store::{FlatIndex, IndexEntry};

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_owned()).collect()
    }

    #[test]
    fn recall_counts_case_insensitive_substrings() {
        let (_, recall) = keyword_metrics("The SKY is blue today", &kw(&["sky", "green"]));
        assert!((recall - 0.5).abs() < 1e-9);
    }

    #[test]
    fn precision_divides_by_word_count() {
        // 5 words, 1 hit
        let (precision, _) = keyword_metrics("the sky is blue today", &kw(&["sky"]));
        assert!((precision - 0.2).abs() < 1e-9);
    }

    #[test]
    fn empty_keywords_score_zero() {
        assert_eq!(keyword_metrics("any answer", &[]), (0.0, 0.0));
    }

    #[test]
    fn empty_answer_scores_zero_precision() {
        let (precision, recall) = keyword_metrics("", &kw(&["sky"]));
        assert_eq!(precision, 0.0);
        assert_eq!(recall, 0.0);
    }

    #[test]
    fn keyword_matching_is_substring_based() {
        // "sky" matches inside "skyline" under the historical rule
        let (_, recall) = keyword_metrics("the skyline glows", &kw(&["sky"]));
        assert!((recall - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn load_examples_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.jsonl");
        std::fs::write(
            &path,
            "{\"question\":\"Q1\",\"expected_keywords\":[\"a\"]}\n\n{\"question\":\"Q2\"}\n",
        )
        .unwrap();

        let examples = load_examples(&path).await.unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].expected_keywords, vec!["a"]);
        assert!(examples[1].expected_keywords.is_empty());
    }

    #[tokio::test]
    async fn load_examples_missing_file_identifies_path() {
        let err = load_examples(Path::new("/nonexistent/eval.jsonl"))
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::DocumentLoad { .. }));
    }

    #[tokio::test]
    async fn load_examples_malformed_line_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.jsonl");
        std::fs::write(&path, "{\"question\":\"ok\"}\nnot json\n").unwrap();
        let err = load_examples(&path).await.unwrap_err();
        assert!(matches!(err, RagError::Json(_)));
    }

    async fn chain_with_answer(dir: &Path, answer: &str) -> RagChain<MockProvider> {
        let path = dir.join("index.json");
        let provider = MockProvider::default();
        let vectors = provider.embed(&["doc text".to_owned()]).await.unwrap();
        let entries = vec![IndexEntry {
            vector: vectors[0].clone(),
            content: "doc text".to_owned(),
            source: "doc.txt".to_owned(),
            chunk_index: 0,
        }];
        FlatIndex::new(entries).save(&path).await.unwrap();
        RagChain::new(
            Arc::new(MockProvider::with_responses(vec![answer.to_owned()])),
            path,
        )
    }

    #[tokio::test]
    async fn run_scores_per_example_and_averages() {
        let dir = tempfile::tempdir().unwrap();
        // 4-word answer containing "sky" but not "green"
        let chain = chain_with_answer(dir.path(), "the sky looks blue").await;
        let evaluator = Evaluator::new(chain, 4);

        let examples = vec![EvalExample {
            question: "Q".to_owned(),
            expected_keywords: kw(&["sky", "green"]),
        }];
        let report = evaluator.run(&examples).await.unwrap();

        assert_eq!(report.examples.len(), 1);
        assert!((report.examples[0].recall - 0.5).abs() < 1e-9);
        assert!((report.examples[0].precision - 0.25).abs() < 1e-9);
        let avg = report.averages.unwrap();
        assert!((avg.recall - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn run_empty_example_set_has_no_averages() {
        let dir = tempfile::tempdir().unwrap();
        let chain = chain_with_answer(dir.path(), "unused").await;
        let report = Evaluator::new(chain, 4).run(&[]).await.unwrap();
        assert!(report.examples.is_empty());
        assert!(report.averages.is_none());
    }
}
