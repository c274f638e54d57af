use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::db::DbError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("Failed to read definition file {path:?}")]
    #[diagnostic(
        code(storekit::cli::read_failed),
        help("Pass the path of a JSON definition file with --config")
    )]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid definition file: {message}")]
    #[diagnostic(code(storekit::cli::invalid_definition))]
    InvalidDefinition { message: String },

    #[error("No connection string given")]
    #[diagnostic(
        code(storekit::cli::missing_dsn),
        help("Set `dsn` in the definition file, pass --dsn, or set STOREKIT_DSN")
    )]
    MissingDsn,

    #[error("Invalid output format '{0}'")]
    #[diagnostic(code(storekit::cli::invalid_format), help("Use `table` or `json`"))]
    InvalidFormat(String),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Db(#[from] DbError),

    #[error("Failed to wait for shutdown signal: {0}")]
    #[diagnostic(code(storekit::cli::signal))]
    Signal(#[source] std::io::Error),
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidDefinition {
            message: e.to_string(),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
