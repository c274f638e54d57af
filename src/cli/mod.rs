mod definition;
pub mod error;
mod output;

#[cfg(test)]
mod definition_test;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::config::DSN_KEY;
use crate::db::document::DocumentStore;
use crate::db::relational::{ModelFactories, RelationalStore};
pub use definition::{DSN_ENV, RelationalDefinition, read_definition, resolve_dsn};
use error::{CliError, CliResult};
pub use output::OutputFormat;
use output::{document_rows, relational_rows, render};

#[derive(Parser)]
#[command(name = "storekit")]
#[command(author, version, about = "Start document and relational stores from definition files", long_about = None)]
pub struct Cli {
    /// Connection string (default: STOREKIT_DSN env or the definition file)
    #[arg(long, global = true)]
    pub dsn: Option<String>,

    /// Output format (table or json)
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a document store and register its models
    Document {
        /// JSON file with `dsn`, `models` and `connectionOptions`
        #[arg(short, long)]
        config: PathBuf,
        /// Keep the connection open until Ctrl-C
        #[arg(long)]
        wait: bool,
    },
    /// Start a relational store and synchronize its tables
    Relational {
        /// JSON file with `dsn`, `debug`, `pool` and `models`
        #[arg(short, long)]
        config: PathBuf,
        /// Log every SQL statement
        #[arg(long)]
        debug: bool,
        /// Keep the pool open until Ctrl-C
        #[arg(long)]
        wait: bool,
    },
}

/// Initialize tracing subscriber with env filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storekit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

pub async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Document { config, wait } => {
            run_document(&config, cli.dsn, cli.format, wait).await
        }
        Commands::Relational {
            config,
            debug,
            wait,
        } => run_relational(&config, cli.dsn, debug, cli.format, wait).await,
    }
}

async fn run_document(
    path: &Path,
    dsn: Option<String>,
    format: OutputFormat,
    wait: bool,
) -> CliResult<()> {
    let mut store = DocumentStore::from_json(&read_definition(path)?)?;
    if let Some(dsn) = resolve_dsn(dsn) {
        store.set_config(DSN_KEY, dsn);
    }
    if store.config(DSN_KEY).is_none() {
        return Err(CliError::MissingDsn);
    }

    let models = store.start().await?;
    println!("{}", render(&document_rows(&models), format)?);

    if wait {
        wait_for_shutdown().await?;
    }
    store.close();
    Ok(())
}

async fn run_relational(
    path: &Path,
    dsn: Option<String>,
    debug: bool,
    format: OutputFormat,
    wait: bool,
) -> CliResult<()> {
    let definition = RelationalDefinition::from_value(read_definition(path)?)?;
    let mut store = RelationalStore::new(definition.config(dsn, debug)?);
    let factories = ModelFactories::from_definitions(definition.models);

    let models = store.start(&factories).await?;
    println!("{}", render(&relational_rows(&models), format)?);

    if wait {
        wait_for_shutdown().await?;
    }
    store.close().await;
    Ok(())
}

async fn wait_for_shutdown() -> CliResult<()> {
    info!("waiting for Ctrl-C");
    tokio::signal::ctrl_c().await.map_err(CliError::Signal)?;
    info!("shutting down");
    Ok(())
}
