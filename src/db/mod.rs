//! Database facades.
//!
//! Two independent facades share one lifecycle: configure, connect, register
//! models, start. Neither implements storage itself; the clients they wrap
//! own pooling, retries and query execution.
//!
//! # Architecture
//!
//! - `config`: loosely typed configuration and connection option merging
//! - `lifecycle`: connection transition observers
//! - `document`: SurrealDB-backed document models
//! - `relational`: sqlx-backed table models

pub mod config;
pub mod document;
pub mod lifecycle;
pub mod relational;

mod error;
mod models;


pub use error::{DbError, DbResult};
pub use models::{RegisteredModelSet, StoreState};
