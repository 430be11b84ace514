//! Macro Sentiment
//!
//! Daily topic sentiment from social-media posts.

use clap::{Parser, Subcommand};
use macro_sentiment::{config::Config, pipeline, topic::Taxonomy};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Parser)]
#[command(name = "macro-sentiment")]
#[command(about = "Aggregate daily sentiment per macroeconomic topic")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: config.toml, if present)
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the batch pipeline
    Run {
        /// Input CSV (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Output CSV (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Sentiment backend: huggingface, llm or lexicon
        #[arg(short, long)]
        backend: Option<String>,
        /// Maximum concurrent sentiment requests
        #[arg(long)]
        concurrency: Option<usize>,
    },
    /// Print the topic assigned to a text
    Classify {
        text: String,
    },
    /// List topics in classification order
    Topics,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_optional(DEFAULT_CONFIG_PATH)?,
    };

    match cli.command {
        Commands::Run {
            input,
            output,
            backend,
            concurrency,
        } => {
            if let Some(input) = input {
                config.input.path = input;
            }
            if let Some(output) = output {
                config.output.path = output;
            }
            if let Some(backend) = backend {
                config.sentiment.backend = backend.parse()?;
            }
            if let Some(concurrency) = concurrency {
                config.sentiment.max_concurrency = concurrency;
            }
            run(config).await
        }
        Commands::Classify { text } => {
            let taxonomy = config.taxonomy()?;
            println!("{}", taxonomy.classify(&text));
            Ok(())
        }
        Commands::Topics => {
            show_topics(&config.taxonomy()?);
            Ok(())
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting sentiment run: {} -> {}",
        config.input.path.display(),
        config.output.path.display()
    );

    let summary = pipeline::run(&config).await?;

    if summary.scoring_failures > 0 {
        tracing::warn!(
            "{} of {} records could not be scored",
            summary.scoring_failures,
            summary.records
        );
    }

    println!("Sentiment analysis and topic classification completed.");
    println!(
        "Results saved to '{}'. Length: {} rows",
        summary.output_path.display(),
        summary.rows_written
    );

    Ok(())
}

fn show_topics(taxonomy: &Taxonomy) {
    for (i, topic) in taxonomy.topics().iter().enumerate() {
        println!("{:>2}. {:<18} {}", i + 1, topic.name, topic.keywords.join(", "));
    }
    println!("    {:<18} (no keyword matched)", macro_sentiment::topic::OTHER_TOPIC);
}
