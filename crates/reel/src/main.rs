use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ingest::Abbreviations;
use rank::PprRanker;
use reel::NelConfig;

/// Link recognized biomedical entities to knowledge base concepts.
#[derive(Parser, Debug)]
#[command(name = "reel")]
struct Cli {
    /// Directory with one brat `.ann` file per document
    #[arg(long)]
    ner_dir: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Abbreviations per document (`{doc_id: {abbreviation: long_form}}`)
    #[arg(long)]
    abbreviations: Option<PathBuf>,

    /// Target as `entity_type=kb`, e.g. `disease=medic`. Overrides the config.
    #[arg(long = "type", value_name = "ENTITY=KB")]
    types: Vec<String>,

    /// Keep the run directories under the temporary root
    #[arg(long)]
    keep_temp: bool,

    /// Log as JSON lines
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let mut config = match &cli.config {
        Some(path) => NelConfig::load(path).await?,
        None => NelConfig::default(),
    };

    if !cli.types.is_empty() {
        config.types.clear();
        for target in &cli.types {
            let (entity_type, kb) = target
                .split_once('=')
                .context(format!("Invalid --type {:?}, expected entity_type=kb", target))?;
            config.types.insert(entity_type.to_string(), kb.to_string());
        }
    }
    config.keep_temp |= cli.keep_temp;

    // Reject bad targets before reading any input
    config.validate()?;

    let abbreviations = match &cli.abbreviations {
        Some(path) => Abbreviations::load(path).await?,
        None => Abbreviations::new(),
    };
    let documents = ingest::ingest_directory(&cli.ner_dir).await?;
    info!(documents = documents.len(), dir = ?cli.ner_dir, "Read NER output");

    let ranker = PprRanker::new(config.ranker.clone());
    let outcomes = reel::link_all(&config, &documents, &abbreviations, &ranker).await?;

    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}
