//! Relational store connection.

use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use serde::{Deserialize, Serialize};
use sqlx::any::{AnyConnectOptions, AnyPoolOptions, install_default_drivers};
use sqlx::{AnyPool, ConnectOptions};
use tracing::{debug, info};

use super::dialect::Dialect;
use crate::db::{DbError, DbResult};

/// Construction input for [`super::RelationalStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationalConfig {
    pub dsn: String,
    /// Log every statement at INFO.
    pub debug: bool,
    pub pool: Option<PoolConfig>,
}

impl RelationalConfig {
    pub fn new(dsn: impl Into<String>) -> Self {
        Self {
            dsn: dsn.into(),
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = Some(pool);
        self
    }
}

/// Pool overrides; unset keys keep the sqlx defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub min: Option<u32>,
    pub max: Option<u32>,
    /// Milliseconds to wait for a free connection.
    pub acquire: Option<u64>,
    /// Milliseconds before an idle connection is closed.
    pub idle: Option<u64>,
}

impl PoolConfig {
    fn apply(&self, mut options: AnyPoolOptions) -> AnyPoolOptions {
        if let Some(max) = self.max {
            options = options.max_connections(max);
        }
        if let Some(min) = self.min {
            options = options.min_connections(min);
        }
        if let Some(ms) = self.acquire {
            options = options.acquire_timeout(Duration::from_millis(ms));
        }
        if let Some(ms) = self.idle {
            options = options.idle_timeout(Duration::from_millis(ms));
        }
        options
    }
}

/// Pool wrapper built from a [`RelationalConfig`].
#[derive(Debug)]
pub struct RelationalConnection {
    config: RelationalConfig,
    dialect: Dialect,
    pool: AnyPool,
}

impl RelationalConnection {
    /// Open the pool described by `config`.
    pub async fn connect(config: RelationalConfig) -> DbResult<Self> {
        info!("connecting to relational store");
        install_default_drivers();

        let dialect = Dialect::from_dsn(&config.dsn)?;
        let mut options =
            AnyConnectOptions::from_str(&config.dsn).map_err(|e| DbError::Configuration {
                message: e.to_string(),
            })?;
        options = if config.debug {
            options.log_statements(LevelFilter::Info)
        } else {
            options.disable_statement_logging()
        };

        let mut pool_options = AnyPoolOptions::new();
        if let Some(pool) = &config.pool {
            debug!(?pool, "applying pool overrides");
            pool_options = pool.apply(pool_options);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self {
            config,
            dialect,
            pool,
        })
    }

    /// Connectivity hook run before models are registered. Currently a
    /// no-op: opening the pool already established a connection.
    pub async fn test_connection(&self) -> DbResult<()> {
        Ok(())
    }

    pub fn config(&self) -> &RelationalConfig {
        &self.config
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
