use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub index: IndexConfig,
    pub corpus: CorpusConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
    pub max_tokens: u32,
}

#[derive(Debug, Deserialize)]
pub struct IndexConfig {
    pub path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
}

#[derive(Debug, Deserialize)]
pub struct CorpusConfig {
    pub dir: PathBuf,
    pub eval_file: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    pub bind: String,
    pub port: u16,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("LORE_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = std::env::var("LORE_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("LORE_LLM_EMBEDDING_MODEL") {
            self.llm.embedding_model = v;
        }
        if let Ok(v) = std::env::var("LORE_INDEX_PATH") {
            self.index.path = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("LORE_CORPUS_DIR") {
            self.corpus.dir = PathBuf::from(v);
        }
    }

    fn default() -> Self {
        Self {
            llm: LlmConfig {
                base_url: "https://api.openai.com/v1".into(),
                model: "gpt-4o-mini".into(),
                embedding_model: "text-embedding-3-small".into(),
                max_tokens: 1024,
            },
            index: IndexConfig {
                path: "./data/index.json".into(),
                chunk_size: 1000,
                chunk_overlap: 200,
                top_k: 4,
            },
            corpus: CorpusConfig {
                dir: "./data/docs".into(),
                eval_file: "./data/eval.jsonl".into(),
            },
            gateway: GatewayConfig {
                bind: "127.0.0.1".into(),
                port: 8080,
            },
        }
    }
}

/// API key from the environment: `LORE_API_KEY`, then `OPENAI_API_KEY`.
#[must_use]
pub fn api_key_from_env() -> Option<String> {
    std::env::var("LORE_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .ok()
}
