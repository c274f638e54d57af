//! Tests for model registration and index statements.

use serde_json::json;

use super::model::*;
use super::schema::*;
use crate::db::DbError;

fn models(value: serde_json::Value) -> ModelMap {
    parse_models(&value).expect("models should parse")
}

#[test]
fn setup_models_registers_each_model_under_its_own_collection() {
    let registered = setup_models(&models(json!({
        "User": {"schema": {"name": "String"}},
        "Post": {"schema": {"authorId": "ObjectId"}}
    })));

    assert_eq!(registered.len(), 2);
    let user = registered.get("User").expect("User should be registered");
    assert_eq!(user.name(), "User");
    assert_eq!(user.collection(), "User");

    let post = registered.get("Post").expect("Post should be registered");
    assert_eq!(post.schema().field("authorId"), Some(&FieldType::RecordId));
}

#[test]
fn setup_models_with_no_models_is_empty() {
    let registered = setup_models(&ModelMap::new());
    assert!(registered.is_empty());
}

#[test]
fn no_indexes_means_no_statements() {
    let model = DocumentModel::register("User", build_schema(&ModelDescriptor::default()));
    assert!(
        model
            .index_statements()
            .expect("statements should render")
            .is_empty()
    );
}

#[test]
fn index_statements_define_table_then_indexes() {
    let descriptor = ModelDescriptor::default()
        .field("email", "String")
        .index(IndexDeclaration::on(&["email"]).unique())
        .index(IndexDeclaration::on(&["tenant", "createdAt"]));
    let model = DocumentModel::register("User", build_schema(&descriptor));

    let statements = model.index_statements().expect("statements should render");

    assert_eq!(
        statements,
        vec![
            "DEFINE TABLE IF NOT EXISTS `User` SCHEMALESS;".to_string(),
            "DEFINE INDEX IF NOT EXISTS `User_email_idx` ON TABLE `User` FIELDS `email` UNIQUE;"
                .to_string(),
            "DEFINE INDEX IF NOT EXISTS `User_tenant_createdAt_idx` ON TABLE `User` FIELDS `tenant`, `createdAt`;"
                .to_string(),
        ]
    );
}

#[test]
fn empty_index_is_a_schema_error() {
    let descriptor = ModelDescriptor::default().index(IndexDeclaration::default());
    let model = DocumentModel::register("User", build_schema(&descriptor));

    let err = model.index_statements().unwrap_err();
    assert!(matches!(err, DbError::Schema { ref model, .. } if model == "User"));
}

#[test]
fn backtick_in_identifier_is_rejected() {
    let descriptor = ModelDescriptor::default().index(IndexDeclaration::on(&["bad`field"]));
    let model = DocumentModel::register("User", build_schema(&descriptor));

    assert!(matches!(
        model.index_statements(),
        Err(DbError::Schema { .. })
    ));
}
