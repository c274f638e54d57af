//! Tests for schema preprocessing.

use serde_json::json;

use super::schema::*;

#[test]
fn object_id_token_becomes_record_id() {
    let descriptor = ModelDescriptor::default()
        .field("ownerId", "ObjectId")
        .field("parentId", "ObjectId");

    let schema = build_schema(&descriptor);

    assert_eq!(schema.field("ownerId"), Some(&FieldType::RecordId));
    assert_eq!(schema.field("parentId"), Some(&FieldType::RecordId));
}

#[test]
fn other_tokens_pass_through_unchanged() {
    let descriptor = ModelDescriptor::default()
        .field("name", "String")
        .field("age", "Number")
        .field("createdAt", "Date")
        .field("lowercase", "objectid")
        .field("custom", "Whatever<T>");

    let schema = build_schema(&descriptor);

    for (field, token) in &descriptor.schema {
        assert_eq!(
            schema.field(field),
            Some(&FieldType::Declared(token.clone())),
            "field {} should keep its token",
            field
        );
    }
}

#[test]
fn field_order_is_preserved() {
    let descriptor = ModelDescriptor::default()
        .field("z", "String")
        .field("a", "ObjectId")
        .field("m", "Number");

    let schema = build_schema(&descriptor);
    let names: Vec<&str> = schema.fields().keys().map(String::as_str).collect();
    assert_eq!(names, vec!["z", "a", "m"]);
}

#[test]
fn options_and_indexes_are_attached() {
    let descriptor: ModelDescriptor = serde_json::from_value(json!({
        "schema": {"email": "String"},
        "indexes": [
            {"index": {"email": 1}, "options": {"unique": true}},
            {"index": {"createdAt": -1}}
        ],
        "options": {"timestamps": true}
    }))
    .expect("descriptor should parse");

    let schema = build_schema(&descriptor);

    assert_eq!(schema.options().get("timestamps"), Some(&json!(true)));
    assert_eq!(schema.indexes().len(), 2);
    assert!(schema.indexes()[0].is_unique());
    assert!(!schema.indexes()[1].is_unique());
}

#[test]
fn empty_descriptor_builds_empty_schema() {
    let descriptor: ModelDescriptor =
        serde_json::from_value(json!({})).expect("empty descriptor should parse");
    let schema = build_schema(&descriptor);

    assert!(schema.fields().is_empty());
    assert!(schema.options().is_empty());
    assert!(schema.indexes().is_empty());
}

#[test]
fn index_name_prefers_explicit_option() {
    let mut index = IndexDeclaration::on(&["email"]);
    assert_eq!(index.name("User"), "User_email_idx");

    index
        .options
        .insert("name".to_string(), json!("user_email_unique"));
    assert_eq!(index.name("User"), "user_email_unique");
}

#[test]
fn index_name_joins_compound_fields() {
    let index = IndexDeclaration::on(&["tenant", "email"]).unique();
    assert_eq!(index.name("User"), "User_tenant_email_idx");
    assert!(index.is_unique());
}

#[test]
fn field_type_display() {
    assert_eq!(FieldType::RecordId.to_string(), "record");
    assert_eq!(FieldType::Declared("String".into()).to_string(), "String");
    assert_eq!(
        FieldType::Declared(json!(["String"])).to_string(),
        "[\"String\"]"
    );
    assert!(FieldType::from_declaration(&json!(OBJECT_ID_TOKEN)).is_record_id());
}

#[test]
fn parse_models_keeps_declaration_order() {
    let models = parse_models(&json!({
        "User": {"schema": {"name": "String"}},
        "Account": {},
        "Session": {"schema": {"userId": "ObjectId"}}
    }))
    .expect("models should parse");

    let names: Vec<&str> = models.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["User", "Account", "Session"]);
}

#[test]
fn parse_models_rejects_malformed_declarations() {
    let result = parse_models(&json!({"User": {"schema": ["name"]}}));
    assert!(matches!(
        result,
        Err(crate::db::DbError::Configuration { .. })
    ));
}

#[test]
fn nested_and_array_declarations_pass_through() {
    let models = parse_models(&json!({
        "Post": {
            "schema": {
                "author": {"type": "ObjectId", "ref": "User"},
                "tags": ["String"],
                "editorId": "ObjectId"
            }
        }
    }))
    .expect("nested declarations should parse");

    let schema = build_schema(&models["Post"]);

    // only top-level tokens are rewritten
    assert_eq!(
        schema.field("author"),
        Some(&FieldType::Declared(json!({"type": "ObjectId", "ref": "User"})))
    );
    assert_eq!(
        schema.field("tags"),
        Some(&FieldType::Declared(json!(["String"])))
    );
    assert_eq!(schema.field("editorId"), Some(&FieldType::RecordId));
}
