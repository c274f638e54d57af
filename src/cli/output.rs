//! Rendering of registered models.

use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use super::error::{CliError, CliResult};
use crate::db::RegisteredModelSet;
use crate::db::document::DocumentModel;
use crate::db::relational::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(CliError::InvalidFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Tabled, Serialize)]
pub struct DocumentRow {
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Collection")]
    pub collection: String,
    #[tabled(rename = "Fields")]
    pub fields: usize,
    #[tabled(rename = "Record links")]
    pub record_links: String,
    #[tabled(rename = "Indexes")]
    pub indexes: usize,
}

impl From<&DocumentModel> for DocumentRow {
    fn from(model: &DocumentModel) -> Self {
        let links: Vec<&str> = model
            .schema()
            .fields()
            .iter()
            .filter(|(_, t)| t.is_record_id())
            .map(|(name, _)| name.as_str())
            .collect();
        Self {
            model: model.name().to_string(),
            collection: model.collection().to_string(),
            fields: model.schema().fields().len(),
            record_links: if links.is_empty() {
                "-".to_string()
            } else {
                links.join(", ")
            },
            indexes: model.schema().indexes().len(),
        }
    }
}

#[derive(Debug, Tabled, Serialize)]
pub struct RelationalRow {
    #[tabled(rename = "Model")]
    pub model: String,
    #[tabled(rename = "Table")]
    pub table: String,
}

pub fn document_rows(models: &RegisteredModelSet<DocumentModel>) -> Vec<DocumentRow> {
    models.iter().map(|(_, model)| model.into()).collect()
}

pub fn relational_rows(models: &RegisteredModelSet<Box<dyn Model>>) -> Vec<RelationalRow> {
    models
        .iter()
        .map(|(name, model)| RelationalRow {
            model: name.clone(),
            table: model.name().to_string(),
        })
        .collect()
}

/// Render rows as a rounded table or pretty JSON.
pub fn render<T: Tabled + Serialize>(rows: &[T], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        OutputFormat::Table if rows.is_empty() => Ok("No models registered.".to_string()),
        OutputFormat::Table => {
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            Ok(table.to_string())
        }
    }
}
