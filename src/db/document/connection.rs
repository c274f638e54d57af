//! Document store connection.

use surrealdb::Surreal;
use surrealdb::engine::any::{self, Any};
use tracing::debug;

use crate::db::config::ConnectionOptions;
use crate::db::lifecycle::{ConnectionEvent, Observers};
use crate::db::{DbError, DbResult};

/// Owned SurrealDB client plus the observers notified of its transitions.
pub struct DocumentConnection {
    dsn: String,
    client: Option<Surreal<Any>>,
    observers: Observers,
}

impl DocumentConnection {
    pub fn new(dsn: impl Into<String>, observers: Observers) -> Self {
        Self {
            dsn: dsn.into(),
            client: None,
            observers,
        }
    }

    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    pub fn client(&self) -> Option<&Surreal<Any>> {
        self.client.as_ref()
    }

    /// Open the client and select the namespace and database.
    ///
    /// The whole handshake is bounded by `serverSelectionTimeoutMS`. Pool
    /// size, socket timeout and address family are managed by the engine
    /// and are only reported here.
    pub async fn connect(&mut self, options: &ConnectionOptions) -> DbResult<()> {
        self.observers.emit(ConnectionEvent::Connecting);
        debug!(
            max_pool_size = ?options.max_pool_size(),
            socket_timeout = ?options.socket_timeout(),
            namespace = options.namespace(),
            database = options.database(),
            "opening document store"
        );

        let open = async {
            let client = any::connect(self.dsn.as_str())
                .await
                .map_err(|e| DbError::Connection {
                    message: e.to_string(),
                })?;
            client
                .use_ns(options.namespace())
                .use_db(options.database())
                .await
                .map_err(|e| DbError::Connection {
                    message: e.to_string(),
                })?;
            Ok::<_, DbError>(client)
        };

        let result = match options.server_selection_timeout() {
            Some(limit) => match tokio::time::timeout(limit, open).await {
                Ok(result) => result,
                Err(_) => Err(DbError::Timeout {
                    operation: "selecting a server".to_string(),
                    millis: limit.as_millis() as u64,
                }),
            },
            None => open.await,
        };

        match result {
            Ok(client) => {
                self.client = Some(client);
                self.observers.emit(ConnectionEvent::Connected);
                Ok(())
            }
            Err(e) => {
                self.observers.emit(ConnectionEvent::Error(e.to_string()));
                Err(e)
            }
        }
    }

    /// Release the client. Does nothing when already closed.
    pub fn close(&mut self) {
        if let Some(client) = self.client.take() {
            self.observers.emit(ConnectionEvent::Disconnecting);
            drop(client);
            self.observers.emit(ConnectionEvent::Disconnected);
        }
    }
}

impl Drop for DocumentConnection {
    fn drop(&mut self) {
        self.close();
    }
}
