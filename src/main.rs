use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;

use lore_core::Config;
use lore_core::config::api_key_from_env;
use lore_gateway::GatewayServer;
use lore_llm::openai::OpenAiProvider;
use lore_rag::RagChain;
use lore_rag::eval::{Evaluator, load_examples};
use lore_rag::indexer::Indexer;
use lore_rag::splitter::SplitterConfig;

#[derive(Parser)]
#[command(name = "lore", version, about = "Retrieval-augmented knowledge assistant")]
struct Cli {
    /// Path to the config file.
    #[arg(long, default_value = "lore.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the vector index from the source corpus.
    Ingest {
        /// Corpus directory (defaults to the configured one).
        #[arg(long)]
        source: Option<PathBuf>,
        /// Index destination (defaults to the configured one).
        #[arg(long)]
        index: Option<PathBuf>,
    },
    /// Ask a single question and print the cited answer.
    Ask {
        /// The question, as one or more words.
        question: Vec<String>,
        /// Number of chunks to retrieve.
        #[arg(short, long)]
        k: Option<usize>,
    },
    /// Score the pipeline against the labeled eval corpus.
    Eval {
        /// JSONL file of {question, expected_keywords} records.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Serve the HTTP API.
    Serve {
        #[arg(long)]
        bind: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    let api_key = api_key_from_env().context("LORE_API_KEY or OPENAI_API_KEY must be set")?;
    let provider = Arc::new(OpenAiProvider::new(
        api_key,
        config.llm.base_url.clone(),
        config.llm.model.clone(),
        config.llm.max_tokens,
        Some(config.llm.embedding_model.clone()),
    ));

    match cli.command {
        Command::Ingest { source, index } => {
            let splitter = SplitterConfig {
                chunk_size: config.index.chunk_size,
                chunk_overlap: config.index.chunk_overlap,
            };
            let indexer = Indexer::new(provider, splitter)?;
            let source = source.unwrap_or(config.corpus.dir);
            let index = index.unwrap_or(config.index.path);
            let stats = indexer.ingest(&source, &index).await?;
            println!(
                "Indexed {} chunks from {} documents into {}",
                stats.chunks,
                stats.documents,
                index.display()
            );
        }
        Command::Ask { question, k } => {
            let question = question.join(" ");
            anyhow::ensure!(!question.trim().is_empty(), "question must not be empty");

            let chain = RagChain::new(provider, config.index.path);
            let result = chain
                .answer(&question, k.unwrap_or(config.index.top_k))
                .await?;

            println!("{}", result.answer);
            if !result.sources.is_empty() {
                println!("\nSources used:");
                for source in &result.sources {
                    println!("- {source}");
                }
            }
        }
        Command::Eval { file } => {
            let file = file.unwrap_or(config.corpus.eval_file);
            let examples = load_examples(&file).await?;

            let chain = RagChain::new(provider, config.index.path);
            let report = Evaluator::new(chain, config.index.top_k)
                .run(&examples)
                .await?;

            for score in &report.examples {
                println!(
                    "{}: precision {:.4}, recall {:.4}",
                    score.question, score.precision, score.recall
                );
            }
            match report.averages {
                Some(avg) => println!(
                    "\nAverage precision: {:.4}\nAverage recall: {:.4}",
                    avg.precision, avg.recall
                ),
                None => println!("No eval examples found in {}", file.display()),
            }
        }
        Command::Serve { bind, port } => {
            let chain = Arc::new(RagChain::new(provider, config.index.path));

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    let _ = shutdown_tx.send(true);
                }
            });

            let server = GatewayServer::new(
                bind.as_deref().unwrap_or(&config.gateway.bind),
                port.unwrap_or(config.gateway.port),
                chain,
                config.index.top_k,
                shutdown_rx,
            )
            .with_auth(std::env::var("LORE_GATEWAY_TOKEN").ok());
            server.serve().await?;
        }
    }

    Ok(())
}
