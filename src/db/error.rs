//! Database error types.
//!
//! One error type is shared by the document and relational facades so that
//! both `start` paths return the same `DbResult`. It uses miette for fancy
//! diagnostic output and thiserror for derive macros.

use miette::Diagnostic;
use thiserror::Error;

/// Database facade errors.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(storekit::db::configuration),
        help("Check the `dsn`, `models` and `connectionOptions` entries")
    )]
    Configuration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(storekit::db::connection))]
    Connection { message: String },

    #[error("Timed out after {millis}ms while {operation}")]
    #[diagnostic(code(storekit::db::timeout))]
    Timeout { operation: String, millis: u64 },

    #[error("Store is not connected")]
    #[diagnostic(
        code(storekit::db::not_connected),
        help("Call start() before using the store context")
    )]
    NotConnected,

    #[error("Invalid schema for model '{model}': {message}")]
    #[diagnostic(code(storekit::db::schema))]
    Schema { model: String, message: String },

    #[error("Model '{model}' failed to build: {message}")]
    #[diagnostic(code(storekit::db::model_factory))]
    ModelFactory { model: String, message: String },

    #[error("Model '{model}' failed to synchronize: {message}")]
    #[diagnostic(code(storekit::db::sync))]
    Sync { model: String, message: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(storekit::db::database))]
    Database { message: String },
}

/// Result type for database facade operations.
pub type DbResult<T> = Result<T, DbError>;
