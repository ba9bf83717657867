// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the canonical model

use unified_sql_metadata_model::{
    Database, Field, ForeignKey, MetadataModel, MetadataObject, MetadataScope, Namespace,
    ObjectKind, QualifiedName, Schema, Server,
};

fn northwind() -> MetadataModel {
    let mut model = MetadataModel::new();
    let mut db = Database::new("Northwind");
    db.set_default(true);
    let mut dbo = Schema::new("dbo");
    dbo.objects.insert(
        MetadataObject::new("Orders", ObjectKind::Table)
            .with_description("Customer orders")
            .with_fields(vec![
                Field::new("OrderID", 1).with_nullable(false).with_server_type("int"),
                Field::new("CustomerID", 2).with_server_type("nchar").with_size(5),
                Field::new("Freight", 3)
                    .with_server_type("money")
                    .with_precision(19, Some(4))
                    .with_default("0"),
            ]),
    );
    dbo.objects.insert(MetadataObject::new("Customers", ObjectKind::Table).with_fields(vec![
        Field::new("CustomerID", 1).with_nullable(false).with_server_type("nchar"),
    ]));
    db.schemas.insert(dbo);
    model.contents.databases.insert(db);
    model
}

#[test]
fn test_model_json_round_trip() {
    let model = northwind();
    let json = serde_json::to_string(&model).unwrap();
    let back: MetadataModel = serde_json::from_str(&json).unwrap();
    assert_eq!(back, model);
}

#[test]
fn test_model_from_minimal_json() {
    let json = r#"{
        "contents": {
            "schemas": [
                { "name": "main", "objects": [ { "name": "t", "kind": "view" } ] }
            ]
        }
    }"#;
    let model: MetadataModel = serde_json::from_str(json).unwrap();
    let scope = MetadataScope::root().with_schema("main").with_object("t");
    let object = model.object(&scope).unwrap();
    assert_eq!(object.kind, ObjectKind::View);
    assert!(object.fields.is_empty());
}

#[test]
fn test_foreign_key_resolves_once_target_is_loaded() {
    let mut model = northwind();
    let scope = MetadataScope::root().with_database("Northwind").with_schema("dbo");
    let fk = ForeignKey::new(QualifiedName::new("Customers"))
        .with_key_id("FK_Orders_Customers")
        .with_column(1, "CustomerID", "CustomerID");

    let referenced = fk.referenced_fields(&model, &scope);
    assert_eq!(referenced.len(), 1);
    assert!(referenced[0].is_some());

    model
        .objects_mut(&scope)
        .unwrap()
        .remove("Customers")
        .unwrap();
    assert!(fk.referenced_object(&model, &scope).is_none());
}

#[test]
fn test_servers_keep_separate_contents() {
    let mut model = northwind();
    let mut linked = Server::new("LINKED01");
    linked.contents.databases.insert(Database::new("Northwind"));
    model.servers.insert(linked);

    let remote = MetadataScope::root().with_server("LINKED01");
    assert_eq!(model.databases(&remote).map(|d| d.len()), Some(1));
    let remote_db = remote.clone().with_database("Northwind");
    assert_eq!(model.schemas(&remote_db).map(|s| s.len()), Some(0));
    assert!(model.databases(&MetadataScope::root().with_server("missing")).is_none());
}

#[test]
fn test_resolve_qualified_name() {
    let model = northwind();
    let name = QualifiedName::new("Orders")
        .with_database("Northwind")
        .with_schema("dbo");
    let orders = model.resolve(&name).unwrap();
    assert_eq!(orders.fields.len(), 3);
    assert_eq!(orders.field("Freight").and_then(|f| f.scale), Some(4));
}
