//! Relational models and the factories that build them.
//!
//! A factory receives the live pool and an [`OrmBase`] and returns a boxed
//! [`Model`]. Factories run once, in registration order, during `start`.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sqlx::AnyPool;
use tracing::debug;

use super::dialect::Dialect;
use crate::db::{DbError, DbResult};

/// A model whose backing table can be synchronized.
#[async_trait]
pub trait Model: Send + Sync {
    fn name(&self) -> &str;

    /// Create the backing table when it does not exist yet.
    async fn sync(&self) -> DbResult<()>;
}

impl std::fmt::Debug for dyn Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model").field("name", &self.name()).finish()
    }
}

/// Builder callable with the fixed factory signature.
pub type ModelFactory =
    Box<dyn Fn(&AnyPool, &OrmBase) -> DbResult<Box<dyn Model>> + Send + Sync>;

/// Named model factories in registration order.
#[derive(Default)]
pub struct ModelFactories {
    factories: IndexMap<String, ModelFactory>,
}

impl ModelFactories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory. A later registration under the same name
    /// replaces the earlier one but keeps its position.
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&AnyPool, &OrmBase) -> DbResult<Box<dyn Model>> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Box::new(factory));
        self
    }

    /// One factory per table definition, each defining a [`TableModel`].
    pub fn from_definitions(definitions: IndexMap<String, TableDefinition>) -> Self {
        definitions
            .into_iter()
            .fold(Self::new(), |factories, (name, definition)| {
                factories.register(name, move |pool, base| {
                    Ok(Box::new(base.define(pool, definition.clone())) as Box<dyn Model>)
                })
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ModelFactory)> {
        self.factories.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

/// Base constructs handed to every factory.
#[derive(Debug, Clone, Copy)]
pub struct OrmBase {
    dialect: Dialect,
}

impl OrmBase {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Define a table-backed model bound to `pool`.
    pub fn define(&self, pool: &AnyPool, definition: TableDefinition) -> TableModel {
        TableModel {
            pool: pool.clone(),
            dialect: self.dialect,
            definition,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Integer,
    BigInt,
    Float,
    Boolean,
    String,
    Text,
    Date,
    DateTime,
    Json,
    Uuid,
}

impl DataType {
    pub fn sql(&self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (Self::Integer, _) => "INTEGER",
            (Self::BigInt, _) => "BIGINT",
            (Self::Float, Dialect::Sqlite) => "REAL",
            (Self::Float, Dialect::MySql) => "DOUBLE",
            (Self::Float, Dialect::Postgres) => "DOUBLE PRECISION",
            (Self::Boolean, Dialect::Sqlite) => "INTEGER",
            (Self::Boolean, _) => "BOOLEAN",
            (Self::String, _) => "VARCHAR(255)",
            (Self::Text, _) => "TEXT",
            (Self::Date, _) => "DATE",
            (Self::DateTime, Dialect::Postgres) => "TIMESTAMP WITH TIME ZONE",
            (Self::DateTime, _) => "DATETIME",
            (Self::Json, Dialect::Sqlite) => "TEXT",
            (Self::Json, Dialect::MySql) => "JSON",
            (Self::Json, Dialect::Postgres) => "JSONB",
            (Self::Uuid, Dialect::Postgres) => "UUID",
            (Self::Uuid, Dialect::MySql) => "CHAR(36) BINARY",
            (Self::Uuid, Dialect::Sqlite) => "TEXT",
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default = "default_true")]
    pub allow_null: bool,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default)]
    pub auto_increment: bool,
    #[serde(default)]
    pub unique: bool,
}

impl Column {
    pub fn new(data_type: DataType) -> Self {
        Self {
            data_type,
            allow_null: true,
            primary_key: false,
            auto_increment: false,
            unique: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.allow_null = false;
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }
}

/// Declarative table shape.
///
/// Without a primary key column an auto-increment `id` is added. With
/// `timestamps` (the default) `createdAt` and `updatedAt` are appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub table: String,
    #[serde(default)]
    pub columns: IndexMap<String, Column>,
    #[serde(default = "default_true")]
    pub timestamps: bool,
}

impl TableDefinition {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: IndexMap::new(),
            timestamps: true,
        }
    }

    pub fn column(mut self, name: impl Into<String>, column: Column) -> Self {
        self.columns.insert(name.into(), column);
        self
    }

    pub fn without_timestamps(mut self) -> Self {
        self.timestamps = false;
        self
    }

    /// `CREATE TABLE IF NOT EXISTS` statement for `dialect`.
    pub fn create_table_sql(&self, dialect: Dialect) -> String {
        let mut columns: Vec<(String, Column)> = Vec::new();
        if !self.columns.values().any(|c| c.primary_key) {
            columns.push((
                "id".to_string(),
                Column::new(DataType::Integer)
                    .primary_key()
                    .auto_increment()
                    .not_null(),
            ));
        }
        columns.extend(self.columns.iter().map(|(n, c)| (n.clone(), c.clone())));
        if self.timestamps {
            columns.push(("createdAt".to_string(), Column::new(DataType::DateTime).not_null()));
            columns.push(("updatedAt".to_string(), Column::new(DataType::DateTime).not_null()));
        }

        let keys: Vec<&str> = columns
            .iter()
            .filter(|(_, c)| c.primary_key)
            .map(|(n, _)| n.as_str())
            .collect();
        let composite = keys.len() > 1;

        let mut parts: Vec<String> = columns
            .iter()
            .map(|(name, column)| column_sql(dialect, name, column, composite))
            .collect();
        if composite {
            let keys: Vec<String> = keys.iter().map(|k| dialect.quote(k)).collect();
            parts.push(format!("PRIMARY KEY ({})", keys.join(", ")));
        }

        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            dialect.quote(&self.table),
            parts.join(", ")
        )
    }
}

fn column_sql(dialect: Dialect, name: &str, column: &Column, composite: bool) -> String {
    let name = dialect.quote(name);
    if column.primary_key && column.auto_increment && !composite {
        let serial = match (dialect, column.data_type) {
            (Dialect::Sqlite, _) => "INTEGER PRIMARY KEY AUTOINCREMENT",
            (Dialect::MySql, DataType::BigInt) => "BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY",
            (Dialect::MySql, _) => "INTEGER NOT NULL AUTO_INCREMENT PRIMARY KEY",
            (Dialect::Postgres, DataType::BigInt) => "BIGSERIAL PRIMARY KEY",
            (Dialect::Postgres, _) => "SERIAL PRIMARY KEY",
        };
        return format!("{} {}", name, serial);
    }

    let mut sql = format!("{} {}", name, column.data_type.sql(dialect));
    if !column.allow_null || column.primary_key {
        sql.push_str(" NOT NULL");
    }
    if column.primary_key && !composite {
        sql.push_str(" PRIMARY KEY");
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    sql
}

/// A model backed by one table.
#[derive(Debug, Clone)]
pub struct TableModel {
    pool: AnyPool,
    dialect: Dialect,
    definition: TableDefinition,
}

impl TableModel {
    pub fn definition(&self) -> &TableDefinition {
        &self.definition
    }

    pub fn table(&self) -> &str {
        &self.definition.table
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

#[async_trait]
impl Model for TableModel {
    fn name(&self) -> &str {
        &self.definition.table
    }

    async fn sync(&self) -> DbResult<()> {
        let sql = self.definition.create_table_sql(self.dialect);
        debug!(table = %self.definition.table, %sql, "synchronizing table");
        sqlx::query(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::Sync {
                model: self.definition.table.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }
}
