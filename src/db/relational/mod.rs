//! Relational store facade over sqlx.
//!
//! Models come from named factories run against the live pool; each model's
//! table is synchronized before `start` returns.

mod connection;
mod dialect;
mod facade;
mod model;

#[cfg(test)]
mod facade_test;

pub use connection::{PoolConfig, RelationalConfig, RelationalConnection};
pub use dialect::Dialect;
pub use facade::RelationalStore;
pub use model::{
    Column, DataType, Model, ModelFactories, ModelFactory, OrmBase, TableDefinition, TableModel,
};
