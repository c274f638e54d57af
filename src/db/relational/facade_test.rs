//! Tests for the relational store facade.
//!
//! Stores run against sqlite files in a temp directory.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;

use super::*;
use crate::db::{DbError, DbResult, StoreState};

type Journal = Arc<Mutex<Vec<String>>>;

/// Model that journals entry and exit of `sync`.
struct InstrumentedModel {
    name: String,
    journal: Journal,
    fail: bool,
}

#[async_trait]
impl Model for InstrumentedModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn sync(&self) -> DbResult<()> {
        self.journal
            .lock()
            .expect("lock poisoned")
            .push(format!("{}:enter", self.name));
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.journal
            .lock()
            .expect("lock poisoned")
            .push(format!("{}:exit", self.name));
        if self.fail {
            return Err(DbError::Sync {
                model: self.name.clone(),
                message: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

fn instrumented(factories: ModelFactories, name: &str, journal: &Journal, fail: bool) -> ModelFactories {
    let name = name.to_string();
    let journal = journal.clone();
    factories.register(name.clone(), move |_pool, _base| {
        journal
            .lock()
            .expect("lock poisoned")
            .push(format!("{}:build", name));
        Ok(Box::new(InstrumentedModel {
            name: name.clone(),
            journal: journal.clone(),
            fail,
        }) as Box<dyn Model>)
    })
}

fn sqlite_config(dir: &TempDir) -> RelationalConfig {
    let path = dir.path().join("store.db");
    RelationalConfig::new(format!("sqlite://{}?mode=rwc", path.display()))
}

fn journal() -> Journal {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn new_store_reports_configuration_state() {
    assert_eq!(
        RelationalStore::new(RelationalConfig::default()).state(),
        StoreState::Unconfigured
    );
    let store = RelationalStore::new(RelationalConfig::new("sqlite::memory:").with_debug(true));
    assert_eq!(store.state(), StoreState::Configured);
    assert!(store.config().debug);
    assert!(store.context().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn start_syncs_models_sequentially_in_order() {
    let dir = TempDir::new().expect("temp dir");
    let journal = journal();
    let factories = instrumented(ModelFactories::new(), "first", &journal, false);
    let factories = instrumented(factories, "second", &journal, false);

    let mut store = RelationalStore::new(sqlite_config(&dir));
    let models = store.start(&factories).await.expect("start should succeed");

    let names: Vec<&str> = models.names().collect();
    assert_eq!(names, vec!["first", "second"]);
    assert_eq!(
        *journal.lock().expect("lock poisoned"),
        vec![
            "first:build",
            "first:enter",
            "first:exit",
            "second:build",
            "second:enter",
            "second:exit",
        ]
    );
    assert_eq!(store.state(), StoreState::ModelsRegistered);
    assert!(store.context().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_sync_returns_error_and_no_models() {
    let dir = TempDir::new().expect("temp dir");
    let journal = journal();
    let factories = instrumented(ModelFactories::new(), "broken", &journal, true);
    let factories = instrumented(factories, "never", &journal, false);

    let mut store = RelationalStore::new(sqlite_config(&dir));
    let result = store.start(&factories).await;

    assert!(matches!(result, Err(DbError::Sync { ref model, .. }) if model == "broken"));
    assert_eq!(store.state(), StoreState::Failed);
    assert!(store.context().is_none());
    // later factories are never built
    assert!(
        !journal
            .lock()
            .expect("lock poisoned")
            .iter()
            .any(|entry| entry.starts_with("never"))
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failing_factory_stops_start() {
    let dir = TempDir::new().expect("temp dir");
    let factories = ModelFactories::new().register("Broken", |_pool, _base| {
        Err(DbError::ModelFactory {
            model: "Broken".to_string(),
            message: "missing column".to_string(),
        })
    });

    let mut store = RelationalStore::new(sqlite_config(&dir));
    let result = store.start(&factories).await;

    assert!(matches!(result, Err(DbError::ModelFactory { .. })));
    assert_eq!(store.state(), StoreState::Failed);
}

#[tokio::test(flavor = "multi_thread")]
async fn unsupported_dsn_fails_without_panicking() {
    let mut store = RelationalStore::new(RelationalConfig::new("nosuch://localhost/db"));

    let result = store.start(&ModelFactories::new()).await;

    assert!(matches!(result, Err(DbError::Configuration { .. })));
    assert_eq!(store.state(), StoreState::Failed);
    assert!(store.context().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn table_models_create_their_tables() {
    let dir = TempDir::new().expect("temp dir");
    let factories = ModelFactories::new()
        .register("User", |pool, base| {
            let definition = TableDefinition::new("users")
                .column("email", Column::new(DataType::String).not_null().unique());
            Ok(Box::new(base.define(pool, definition)) as Box<dyn Model>)
        })
        .register("Tag", |pool, base| {
            let definition = TableDefinition::new("tags")
                .column("label", Column::new(DataType::Text))
                .without_timestamps();
            Ok(Box::new(base.define(pool, definition)) as Box<dyn Model>)
        });

    let mut store = RelationalStore::new(
        sqlite_config(&dir)
            .with_debug(true)
            .with_pool(PoolConfig {
                max: Some(2),
                min: Some(1),
                ..PoolConfig::default()
            }),
    );
    let models = store.start(&factories).await.expect("start should succeed");
    assert_eq!(models.get("User").map(|m| m.name()), Some("users"));

    let pool = store.context().expect("pool after start");
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'tags') ORDER BY name",
    )
    .fetch_all(pool)
    .await
    .expect("query should succeed");
    assert_eq!(tables, vec!["tags".to_string(), "users".to_string()]);
}

#[tokio::test(flavor = "multi_thread")]
async fn sync_is_idempotent_across_restarts() {
    let dir = TempDir::new().expect("temp dir");
    let mut definitions = indexmap::IndexMap::new();
    definitions.insert("User".to_string(), TableDefinition::new("users"));
    let factories = ModelFactories::from_definitions(definitions);

    let mut store = RelationalStore::new(sqlite_config(&dir));
    store.start(&factories).await.expect("first start");
    store.close().await;
    assert_eq!(store.state(), StoreState::Closed);

    let models = store.start(&factories).await.expect("second start");
    assert_eq!(models.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn start_with_no_factories_returns_empty_set() {
    let dir = TempDir::new().expect("temp dir");
    let mut store = RelationalStore::new(sqlite_config(&dir));

    let models = store
        .start(&ModelFactories::new())
        .await
        .expect("start should succeed");
    assert!(models.is_empty());
}
