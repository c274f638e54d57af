//! Declarative document models and schema preprocessing.
//!
//! A model declaration maps each field to its declaration, usually a type
//! token. The reserved token `"ObjectId"` is rewritten to the store's native
//! record identifier before the schema is built; every other declaration,
//! including nested objects and arrays, is kept as written.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::db::{DbError, DbResult};

/// Token that stands for the native record identifier type.
pub const OBJECT_ID_TOKEN: &str = "ObjectId";

/// Model declarations keyed by model name.
pub type ModelMap = IndexMap<String, ModelDescriptor>;

/// Declaration of one document model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDescriptor {
    /// Field name to declaration (a type token, object or array).
    pub schema: IndexMap<String, Value>,
    pub indexes: Vec<IndexDeclaration>,
    /// Schema-level options, handed to the schema untouched.
    pub options: Map<String, Value>,
}

impl ModelDescriptor {
    pub fn field(mut self, name: impl Into<String>, token: impl Into<Value>) -> Self {
        self.schema.insert(name.into(), token.into());
        self
    }

    pub fn index(mut self, index: IndexDeclaration) -> Self {
        self.indexes.push(index);
        self
    }
}

/// An index over one or more fields with its options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexDeclaration {
    /// Field name to sort direction (`1` or `-1`).
    pub index: IndexMap<String, Value>,
    #[serde(default)]
    pub options: Map<String, Value>,
}

impl IndexDeclaration {
    pub fn on(fields: &[&str]) -> Self {
        Self {
            index: fields
                .iter()
                .map(|f| (f.to_string(), Value::from(1)))
                .collect(),
            options: Map::new(),
        }
    }

    pub fn unique(mut self) -> Self {
        self.options.insert("unique".to_string(), Value::Bool(true));
        self
    }

    pub fn is_unique(&self) -> bool {
        self.options
            .get("unique")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Index name from `options.name`, otherwise derived from the fields.
    pub fn name(&self, collection: &str) -> String {
        if let Some(name) = self.options.get("name").and_then(Value::as_str) {
            return name.to_string();
        }
        let fields: Vec<&str> = self.index.keys().map(String::as_str).collect();
        format!("{}_{}_idx", collection, fields.join("_"))
    }
}

/// Type of a schema field after preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FieldType {
    /// Native record identifier (a SurrealDB record link).
    RecordId,
    /// Any other declaration, passed through as declared.
    Declared(Value),
}

impl FieldType {
    /// Only a top-level `"ObjectId"` string is rewritten.
    pub fn from_declaration(declaration: &Value) -> Self {
        match declaration {
            Value::String(token) if token == OBJECT_ID_TOKEN => Self::RecordId,
            other => Self::Declared(other.clone()),
        }
    }

    pub fn is_record_id(&self) -> bool {
        matches!(self, Self::RecordId)
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordId => f.write_str("record"),
            Self::Declared(Value::String(token)) => f.write_str(token),
            Self::Declared(other) => write!(f, "{}", other),
        }
    }
}

/// Built schema: typed fields, options and indexes.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: IndexMap<String, FieldType>,
    options: Map<String, Value>,
    indexes: Vec<IndexDeclaration>,
}

impl Schema {
    pub fn new(fields: IndexMap<String, FieldType>, options: Map<String, Value>) -> Self {
        Self {
            fields,
            options,
            indexes: Vec::new(),
        }
    }

    pub fn add_index(&mut self, index: IndexDeclaration) {
        self.indexes.push(index);
    }

    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &IndexMap<String, FieldType> {
        &self.fields
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn indexes(&self) -> &[IndexDeclaration] {
        &self.indexes
    }
}

/// Build the schema for one model declaration.
pub fn build_schema(descriptor: &ModelDescriptor) -> Schema {
    let fields = descriptor
        .schema
        .iter()
        .map(|(name, token)| (name.clone(), FieldType::from_declaration(token)))
        .collect();

    let mut schema = Schema::new(fields, descriptor.options.clone());
    for index in &descriptor.indexes {
        schema.add_index(index.clone());
    }
    schema
}

/// Parse a JSON `models` value into declarations.
pub fn parse_models(value: &Value) -> DbResult<ModelMap> {
    serde_json::from_value(value.clone()).map_err(|e| DbError::Configuration {
        message: format!("invalid models declaration: {}", e),
    })
}
