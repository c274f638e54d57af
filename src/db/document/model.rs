//! Registered document models.

use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::debug;

use super::schema::{ModelMap, Schema, build_schema};
use crate::db::{DbError, DbResult, RegisteredModelSet};

/// A named, schema-bound handle to one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentModel {
    name: String,
    collection: String,
    schema: Schema,
}

impl DocumentModel {
    /// Register a model whose collection shares the model name.
    pub fn register(name: impl Into<String>, schema: Schema) -> Self {
        let name = name.into();
        Self {
            collection: name.clone(),
            name,
            schema,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// SurrealQL statements defining the collection and its indexes.
    pub fn index_statements(&self) -> DbResult<Vec<String>> {
        if self.schema.indexes().is_empty() {
            return Ok(Vec::new());
        }

        let table = self.quote(&self.collection)?;
        let mut statements = vec![format!(
            "DEFINE TABLE IF NOT EXISTS {} SCHEMALESS;",
            table
        )];

        for index in self.schema.indexes() {
            if index.index.is_empty() {
                return Err(DbError::Schema {
                    model: self.name.clone(),
                    message: "index declaration has no fields".to_string(),
                });
            }
            let fields = index
                .index
                .keys()
                .map(|field| self.quote(field))
                .collect::<DbResult<Vec<_>>>()?;
            let mut statement = format!(
                "DEFINE INDEX IF NOT EXISTS {} ON TABLE {} FIELDS {}",
                self.quote(&index.name(&self.collection))?,
                table,
                fields.join(", ")
            );
            if index.is_unique() {
                statement.push_str(" UNIQUE");
            }
            statement.push(';');
            statements.push(statement);
        }

        Ok(statements)
    }

    /// Define the declared indexes on the store.
    pub async fn ensure_indexes(&self, client: &Surreal<Any>) -> DbResult<()> {
        let statements = self.index_statements()?;
        if statements.is_empty() {
            return Ok(());
        }

        debug!(model = %self.name, count = statements.len() - 1, "defining indexes");
        client
            .query(statements.join("\n"))
            .await
            .and_then(|response| response.check())
            .map_err(|e| DbError::Schema {
                model: self.name.clone(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    fn quote(&self, ident: &str) -> DbResult<String> {
        if ident.is_empty() || ident.contains('`') {
            return Err(DbError::Schema {
                model: self.name.clone(),
                message: format!("invalid identifier '{}'", ident),
            });
        }
        Ok(format!("`{}`", ident))
    }
}

/// Build and register every declared model, in declaration order.
pub fn setup_models(models: &ModelMap) -> RegisteredModelSet<DocumentModel> {
    let mut registered = RegisteredModelSet::new();
    for (name, descriptor) in models {
        let schema = build_schema(descriptor);
        registered.insert(name.clone(), DocumentModel::register(name.clone(), schema));
    }
    registered
}
