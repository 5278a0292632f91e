//! Asset Indexer
//!
//! Entry point for loading a CSV IT asset inventory into the search index.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use dotenv::dotenv;
use tracing::{error, info, warn};

use asset_indexer::logging::init_tracing;
use asset_indexer::{Dependencies, IndexerConfig, IndexingError, LogFormat};

#[derive(Parser, Debug, Default)]
#[command(name = "asset-indexer")]
#[command(about = "Load a CSV IT asset inventory into a search index", long_about = None)]
struct Cli {
    /// CSV file to index (overrides CSV_FILE)
    #[arg(long)]
    csv_file: Option<PathBuf>,

    /// Search engine URL (overrides OPENSEARCH_URL)
    #[arg(long)]
    opensearch_url: Option<String>,

    /// Index name (overrides INDEX_NAME)
    #[arg(long)]
    index_name: Option<String>,

    /// Documents per bulk request (overrides BATCH_SIZE)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Skip TLS certificate validation
    #[arg(long)]
    accept_invalid_certs: bool,

    /// Log format, text or json (overrides LOG_FORMAT)
    #[arg(long)]
    log_format: Option<String>,
}

impl Cli {
    /// Apply command-line flags on top of environment settings.
    fn apply(&self, mut config: IndexerConfig) -> Result<IndexerConfig, IndexingError> {
        if let Some(path) = &self.csv_file {
            config.pipeline.source_path = path.clone();
        }
        if let Some(url) = &self.opensearch_url {
            config.connection.url = url.clone();
        }
        if let Some(index_name) = &self.index_name {
            config.index_name = index_name.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.pipeline.loader.batch_size = batch_size;
        }
        if self.accept_invalid_certs {
            config.connection.accept_invalid_certs = true;
        }
        if let Some(format) = &self.log_format {
            config.log_format = format.parse()?;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    let config = match IndexerConfig::from_env().and_then(|config| cli.apply(config)) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(LogFormat::Text);
            error!(error = %e, "Invalid configuration");
            process::exit(1);
        }
    };

    init_tracing(config.log_format);

    if let Err(e) = run(&config).await {
        error!(error = %e, "Indexing failed");
        process::exit(1);
    }
}

async fn run(config: &IndexerConfig) -> Result<(), IndexingError> {
    let dependencies = Dependencies::new(config)?;

    info!("Starting asset indexer");
    let report = dependencies.orchestrator.run().await?;

    info!(
        records = report.records_loaded,
        cleaned = report.sanitize.final_rows,
        indexed = report.load.succeeded(),
        failed = report.load.failed(),
        "Indexing complete"
    );

    match report.index_count {
        Some(count) => info!(index = %config.index_name, count, "Index document count"),
        None => warn!(index = %config.index_name, "Index document count unavailable"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flags_override_environment() {
        let cli = Cli::parse_from([
            "asset-indexer",
            "--csv-file",
            "inventory.csv",
            "--index-name",
            "assets_staging",
            "--batch-size",
            "50",
            "--accept-invalid-certs",
            "--log-format",
            "json",
        ]);

        let config = cli.apply(IndexerConfig::default()).unwrap();

        assert_eq!(config.pipeline.source_path, PathBuf::from("inventory.csv"));
        assert_eq!(config.index_name, "assets_staging");
        assert_eq!(config.pipeline.loader.batch_size, 50);
        assert!(config.connection.accept_invalid_certs);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.connection.url, "http://localhost:9200");
    }

    #[test]
    fn test_no_flags_keeps_environment() {
        let mut env_config = IndexerConfig::default();
        env_config.index_name = "from_env".to_string();

        let config = Cli::default().apply(env_config).unwrap();

        assert_eq!(config.index_name, "from_env");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let cli = Cli::parse_from(["asset-indexer", "--batch-size", "0"]);
        assert!(cli.apply(IndexerConfig::default()).is_err());
    }
}
