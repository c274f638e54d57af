use std::env;
use std::io::Write;

use serde_json::json;
use serial_test::serial;
use tempfile::NamedTempFile;

use super::definition::*;
use super::error::CliError;
use crate::db::relational::DataType;

#[test]
fn read_definition_parses_json_file() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"dsn": "mem://", "models": {{"User": {{}}}}}}"#).expect("write");

    let value = read_definition(file.path()).expect("definition should load");
    assert_eq!(value["dsn"], json!("mem://"));
    assert!(value["models"]["User"].is_object());
}

#[test]
fn read_definition_reports_missing_file() {
    let result = read_definition(std::path::Path::new("/nonexistent/storekit.json"));
    assert!(matches!(result, Err(CliError::ReadFailed { .. })));
}

#[test]
fn read_definition_reports_invalid_json() {
    let mut file = NamedTempFile::new().expect("temp file");
    write!(file, "not json").expect("write");

    let result = read_definition(file.path());
    assert!(matches!(result, Err(CliError::InvalidDefinition { .. })));
}

#[test]
#[serial]
fn resolve_dsn_prefers_flag_over_env() {
    unsafe {
        env::set_var(DSN_ENV, "mem://from-env");
    }

    assert_eq!(
        resolve_dsn(Some("mem://from-flag".to_string())),
        Some("mem://from-flag".to_string())
    );
    assert_eq!(resolve_dsn(None), Some("mem://from-env".to_string()));
    assert_eq!(
        resolve_dsn(Some(String::new())),
        Some("mem://from-env".to_string())
    );

    unsafe {
        env::remove_var(DSN_ENV);
    }
}

#[test]
#[serial]
fn resolve_dsn_is_none_without_flag_or_env() {
    unsafe {
        env::remove_var(DSN_ENV);
    }
    assert_eq!(resolve_dsn(None), None);
}

#[test]
#[serial]
fn relational_definition_builds_config() {
    unsafe {
        env::remove_var(DSN_ENV);
    }

    let definition = RelationalDefinition::from_value(json!({
        "dsn": "sqlite::memory:",
        "pool": {"max": 3},
        "models": {
            "User": {"table": "users", "columns": {"email": {"type": "string"}}}
        }
    }))
    .expect("definition should parse");

    let config = definition.config(None, true).expect("config");
    assert_eq!(config.dsn, "sqlite::memory:");
    assert!(config.debug);
    assert_eq!(config.pool.and_then(|p| p.max), Some(3));
    assert_eq!(
        definition.models["User"].columns["email"].data_type,
        DataType::String
    );
}

#[test]
#[serial]
fn relational_definition_without_dsn_is_an_error() {
    unsafe {
        env::remove_var(DSN_ENV);
    }

    let definition = RelationalDefinition::from_value(json!({})).expect("empty definition");
    assert!(matches!(
        definition.config(None, false),
        Err(CliError::MissingDsn)
    ));
}
