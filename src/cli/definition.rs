//! Definition files read by the CLI.

use std::env;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::error::{CliError, CliResult};
use crate::db::relational::{PoolConfig, RelationalConfig, TableDefinition};

/// Environment variable consulted when no DSN is given on the command line.
pub const DSN_ENV: &str = "STOREKIT_DSN";

/// Read a JSON definition file.
pub fn read_definition(path: &Path) -> CliResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| CliError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// DSN from the flag, falling back to `STOREKIT_DSN`. Empty values count as unset.
pub fn resolve_dsn(flag: Option<String>) -> Option<String> {
    flag.filter(|d| !d.is_empty())
        .or_else(|| env::var(DSN_ENV).ok().filter(|d| !d.is_empty()))
}

/// Relational definition: connection settings plus table models.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RelationalDefinition {
    pub dsn: String,
    pub debug: bool,
    pub pool: Option<PoolConfig>,
    pub models: IndexMap<String, TableDefinition>,
}

impl RelationalDefinition {
    pub fn from_value(value: Value) -> CliResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Connection config, with `dsn` and `debug` overridable from the CLI.
    pub fn config(&self, dsn: Option<String>, debug: bool) -> CliResult<RelationalConfig> {
        let dsn = resolve_dsn(dsn)
            .or_else(|| Some(self.dsn.clone()).filter(|d| !d.is_empty()))
            .ok_or(CliError::MissingDsn)?;
        Ok(RelationalConfig {
            dsn,
            debug: self.debug || debug,
            pool: self.pool.clone(),
        })
    }
}
