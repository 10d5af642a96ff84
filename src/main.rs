//! # mongodocs
//!
//! Command line driver for the MongoDB document provider.
//!
//! ## Usage
//!
//! ```bash
//! # Run one lifecycle request (JSON, or YAML by extension)
//! mongodocs apply request.json
//!
//! # Read the request from stdin
//! cat request.yaml | mongodocs apply --format yaml -
//!
//! # Print the resource schema
//! mongodocs schema
//!
//! # Also write Prometheus metrics for a textfile collector
//! mongodocs --metrics-file /var/lib/node_exporter/mongodocs.prom apply request.json
//! ```
//!
//! The response is printed to stdout as JSON; logs go to stderr. The exit
//! status is 1 when the response carries an error diagnostic.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, LazyLock};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use mongodocs_provider::config::ProviderConfig;
use mongodocs_provider::constants::PROVIDER_TYPE_NAME;
use mongodocs_provider::lifecycle::{self, LifecycleRequest};
use mongodocs_provider::observability::{logging, metrics};
use mongodocs_provider::reconciler::Reconciler;
use mongodocs_provider::secrets::AwsSecretsManager;
use mongodocs_provider::store::MongoConnector;

static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} (git {}, built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_GIT_HASH"),
        env!("BUILD_DATETIME")
    )
});

/// Declarative lifecycle management for MongoDB documents
#[derive(Parser)]
#[command(name = "mongodocs", version, long_version = LONG_VERSION.as_str())]
#[command(
    about = "Declarative lifecycle management for MongoDB documents",
    long_about = None,
    after_help = "\
Examples:
  mongodocs apply create.json
  cat read.yaml | mongodocs apply --format yaml -
  mongodocs schema
"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write Prometheus metrics in text exposition format to this file on exit
    #[arg(long, global = true, value_name = "PATH")]
    metrics_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one lifecycle request and print the response
    Apply {
        /// Request file, or `-` for stdin
        #[arg(value_name = "REQUEST")]
        request: PathBuf,

        /// Request format; inferred from the file extension when omitted
        #[arg(long, value_enum)]
        format: Option<RequestFormat>,
    },
    /// Print the JSON Schema of the document resource
    Schema,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum RequestFormat {
    Json,
    Yaml,
}

impl RequestFormat {
    fn infer(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Self::Yaml,
            _ => Self::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = ProviderConfig::from_env();

    logging::init_logging(&config)?;
    info!(
        provider = PROVIDER_TYPE_NAME,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("BUILD_GIT_HASH"),
        build_datetime = env!("BUILD_DATETIME"),
        "Starting mongodocs"
    );

    if config.enable_metrics {
        metrics::register_metrics()?;
    }

    let exit = match cli.command {
        Commands::Apply { request, format } => apply(&config, &request, format).await?,
        Commands::Schema => {
            let schema = lifecycle::schema::resource_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            ExitCode::SUCCESS
        }
    };

    if let Some(path) = cli.metrics_file {
        if config.enable_metrics {
            write_metrics(&path)?;
        }
    }

    Ok(exit)
}

async fn apply(
    config: &ProviderConfig,
    path: &Path,
    format: Option<RequestFormat>,
) -> Result<ExitCode> {
    let request = read_request(path, format)?;

    let reconciler = Reconciler::new(
        Arc::new(MongoConnector::new(config.store.clone())),
        Arc::new(AwsSecretsManager::new(config.secrets.clone())),
    );

    let response = lifecycle::handle(&reconciler, request).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.has_errors() {
        for diagnostic in response.diagnostics.iter().filter(|d| d.is_error()) {
            error!(summary = %diagnostic.summary, detail = %diagnostic.detail, "Lifecycle request failed");
        }
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn read_request(path: &Path, format: Option<RequestFormat>) -> Result<LifecycleRequest> {
    let (raw, inferred) = if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("Failed to read request from stdin")?;
        (raw, RequestFormat::Json)
    } else {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read request file {}", path.display()))?;
        (raw, RequestFormat::infer(path))
    };

    match format.unwrap_or(inferred) {
        RequestFormat::Json => {
            serde_json::from_str(&raw).context("Failed to parse lifecycle request as JSON")
        }
        RequestFormat::Yaml => {
            serde_yaml::from_str(&raw).context("Failed to parse lifecycle request as YAML")
        }
    }
}

fn write_metrics(path: &Path) -> Result<()> {
    let text = metrics::gather_text()?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write metrics to {}", path.display()))
}
