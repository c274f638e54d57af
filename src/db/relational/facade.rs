//! Relational store facade.

use sqlx::AnyPool;
use tracing::{debug, error, info, instrument};

use super::connection::{RelationalConfig, RelationalConnection};
use super::model::{Model, ModelFactories, OrmBase};
use crate::db::{DbResult, RegisteredModelSet, StoreState};

/// Configure, connect, build and synchronize relational models.
///
/// Any failure inside [`RelationalStore::start`] is logged here before it is
/// returned, and no partial model set is handed out.
#[derive(Debug)]
pub struct RelationalStore {
    config: RelationalConfig,
    connection: Option<RelationalConnection>,
    state: StoreState,
}

impl RelationalStore {
    pub const NAME: &'static str = "relationalstore";

    pub fn new(config: RelationalConfig) -> Self {
        let state = if config.dsn.is_empty() {
            StoreState::Unconfigured
        } else {
            StoreState::Configured
        };
        Self {
            config,
            connection: None,
            state,
        }
    }

    pub fn config(&self) -> &RelationalConfig {
        &self.config
    }

    /// The live pool, once started.
    pub fn context(&self) -> Option<&AnyPool> {
        self.connection.as_ref().map(RelationalConnection::pool)
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Connect, then build and synchronize every model in order.
    #[instrument(skip_all, fields(store = Self::NAME, models = factories.len()))]
    pub async fn start(
        &mut self,
        factories: &ModelFactories,
    ) -> DbResult<RegisteredModelSet<Box<dyn Model>>> {
        match self.try_start(factories).await {
            Ok(models) => {
                info!(models = models.len(), "relational store connected");
                Ok(models)
            }
            Err(e) => {
                error!(error = %e, "relational store error");
                self.state = StoreState::Failed;
                Err(e)
            }
        }
    }

    async fn try_start(
        &mut self,
        factories: &ModelFactories,
    ) -> DbResult<RegisteredModelSet<Box<dyn Model>>> {
        if let Some(previous) = self.connection.take() {
            debug!("replacing existing connection");
            previous.close().await;
        }

        self.state = StoreState::Connecting;
        let connection = RelationalConnection::connect(self.config.clone()).await?;
        connection.test_connection().await?;
        self.state = StoreState::Connected;

        let base = OrmBase::new(connection.dialect());
        let mut models = RegisteredModelSet::new();
        for (name, factory) in factories.iter() {
            let model = factory(connection.pool(), &base)?;
            debug!(model = %name, "synchronizing model");
            model.sync().await?;
            models.insert(name.clone(), model);
        }

        self.connection = Some(connection);
        self.state = StoreState::ModelsRegistered;
        Ok(models)
    }

    /// Close the pool. Does nothing when not connected.
    pub async fn close(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
            self.state = StoreState::Closed;
        }
    }
}
