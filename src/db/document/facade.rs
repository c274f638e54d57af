//! Document store facade.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use surrealdb::Surreal;
use surrealdb::engine::any::Any;
use tracing::{debug, info, instrument};

use super::connection::DocumentConnection;
use super::model::{DocumentModel, setup_models};
use super::schema::{ModelMap, parse_models};
use crate::db::config::{
    CONNECTION_OPTIONS_KEY, ConfigMap, ConnectionOptions, DSN_KEY, MODELS_KEY,
};
use crate::db::lifecycle::{ConnectionObserver, Observers};
use crate::db::{DbError, DbResult, RegisteredModelSet, StoreState};

/// Construction input for [`DocumentStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentInit {
    pub dsn: Option<String>,
    pub models: Option<ModelMap>,
    pub connection_options: Option<Map<String, Value>>,
}

/// Configure, connect and register document models.
///
/// Errors from [`DocumentStore::start`] are returned to the caller and are
/// not logged here; only the lifecycle observers write to the log.
pub struct DocumentStore {
    config: ConfigMap,
    observers: Observers,
    connection: Option<DocumentConnection>,
    state: StoreState,
}

impl DocumentStore {
    pub const NAME: &'static str = "documentstore";

    /// Create a store from `init`, keeping only the entries that are set.
    pub fn new(init: DocumentInit) -> DbResult<Self> {
        let mut store = Self {
            config: ConfigMap::new(),
            observers: Observers::new(Self::NAME),
            connection: None,
            state: StoreState::Unconfigured,
        };

        if let Some(dsn) = init.dsn {
            store.set_config(DSN_KEY, dsn);
        }
        if let Some(models) = init.models {
            let models = serde_json::to_value(models).map_err(|e| DbError::Configuration {
                message: e.to_string(),
            })?;
            store.set_config(MODELS_KEY, models);
        }
        if let Some(options) = init.connection_options {
            store.set_config(CONNECTION_OPTIONS_KEY, Value::Object(options));
        }
        Ok(store)
    }

    /// Create a store from a JSON definition such as the CLI reads.
    pub fn from_json(value: &Value) -> DbResult<Self> {
        let init: DocumentInit =
            serde_json::from_value(value.clone()).map_err(|e| DbError::Configuration {
                message: e.to_string(),
            })?;
        Self::new(init)
    }

    /// Set a configuration entry. Falsy keys or values are ignored.
    pub fn set_config(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        self.config.set(key, value.into());
        if self.state == StoreState::Unconfigured && self.config.contains(DSN_KEY) {
            self.state = StoreState::Configured;
        }
        self
    }

    pub fn config(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// The live client handle, once started.
    pub fn context(&self) -> Option<&Surreal<Any>> {
        self.connection.as_ref().and_then(DocumentConnection::client)
    }

    /// Attach an extra lifecycle observer for subsequent connections.
    pub fn observe(&mut self, observer: Arc<dyn ConnectionObserver>) -> &mut Self {
        self.observers.push(observer);
        self
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    /// Connect and register the configured models.
    #[instrument(skip(self), fields(store = Self::NAME))]
    pub async fn start(&mut self) -> DbResult<RegisteredModelSet<DocumentModel>> {
        let dsn = match self.config.get(DSN_KEY) {
            Some(Value::String(dsn)) => dsn.clone(),
            Some(_) => {
                return Err(DbError::Configuration {
                    message: "dsn must be a string".to_string(),
                });
            }
            None => {
                return Err(DbError::Configuration {
                    message: "no dsn configured".to_string(),
                });
            }
        };
        let models = match self.config.get(MODELS_KEY) {
            Some(value) => parse_models(value)?,
            None => ModelMap::new(),
        };
        let overrides = match self.config.get(CONNECTION_OPTIONS_KEY) {
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(DbError::Configuration {
                    message: "connectionOptions must be an object".to_string(),
                });
            }
            None => Map::new(),
        };
        let options = ConnectionOptions::with_overrides(&overrides);

        if let Some(mut previous) = self.connection.take() {
            debug!("replacing existing connection");
            previous.close();
        }

        self.state = StoreState::Connecting;
        let mut connection = DocumentConnection::new(dsn, self.observers.clone());
        if let Err(e) = connection.connect(&options).await {
            self.state = StoreState::Failed;
            return Err(e);
        }
        self.state = StoreState::Connected;

        let registered = setup_models(&models);
        if options.auto_index() {
            if let Some(client) = connection.client() {
                for (_, model) in &registered {
                    if let Err(e) = model.ensure_indexes(client).await {
                        self.state = StoreState::Failed;
                        return Err(e);
                    }
                }
            }
        }

        self.connection = Some(connection);
        self.state = StoreState::ModelsRegistered;
        info!(models = registered.len(), "document models registered");
        Ok(registered)
    }

    /// Close the connection. The host decides when, e.g. on Ctrl-C.
    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
            self.state = StoreState::Closed;
        }
    }
}
