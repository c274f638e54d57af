//! Document store facade over SurrealDB.
//!
//! Model declarations are plain data: a field map of type tokens, optional
//! indexes and schema options. `start` connects, preprocesses each schema and
//! returns the registered models.

mod connection;
mod facade;
mod model;
mod schema;

#[cfg(test)]
mod model_test;
#[cfg(test)]
mod schema_test;

pub use connection::DocumentConnection;
pub use facade::{DocumentInit, DocumentStore};
pub use model::{DocumentModel, setup_models};
pub use schema::{
    FieldType, IndexDeclaration, ModelDescriptor, ModelMap, OBJECT_ID_TOKEN, Schema, build_schema,
    parse_models,
};
