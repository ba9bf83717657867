// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Integration tests for the catalog crate
//!
//! Every test drives a [`MetadataLoader`] against a recording mock adapter
//! and checks both the resulting model and the calls made to the backend.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use unified_sql_metadata_catalog::{
    AdapterError, CatalogError, ConnectionSession, MetadataLoader, OptionalFetchError,
    ProviderRegistry, SessionState, profiles,
};
use unified_sql_metadata_model::{
    MetadataLevel, MetadataModel, MetadataScope, Namespace, ObjectKind, QualifiedName,
};
use unified_sql_metadata_test_utils::{MockAdapterBuilder, MockHandle, RowSetFixtures};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn universal_session() -> (ConnectionSession, MockHandle) {
    let (adapter, handle) = MockAdapterBuilder::new()
        .with_snapshot(RowSetFixtures::shop_snapshot())
        .build();
    (ConnectionSession::new(adapter), handle)
}

fn mssql_session() -> (ConnectionSession, MockHandle) {
    let (adapter, handle) = MockAdapterBuilder::new()
        .with_snapshot(RowSetFixtures::mssql_snapshot())
        .build();
    (ConnectionSession::new(adapter), handle)
}

fn universal_loader() -> MetadataLoader {
    MetadataLoader::new(Arc::new(profiles::universal()))
}

fn mssql_loader() -> MetadataLoader {
    ProviderRegistry::with_builtin_profiles()
        .loader("mssql")
        .expect("mssql is built in")
}

fn scope(database: &str, schema: &str) -> MetadataScope {
    MetadataScope::root().with_database(database).with_schema(schema)
}

fn object_names(model: &MetadataModel, scope: &MetadataScope) -> Vec<String> {
    model
        .objects(scope)
        .map(|objects| objects.names().into_iter().map(str::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn test_tree_load_down_to_objects() {
    init_tracing();
    let (session, handle) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();

    let report = loader.load_tree(&session, &mut model, MetadataLevel::Object);
    assert!(report.is_complete(), "{:?}", report.errors);
    // databases, 2 schema lists, 4 object lists
    assert_eq!(report.reports.len(), 7);

    let root = MetadataScope::root();
    assert_eq!(model.databases(&root).unwrap().names(), vec!["shop", "hr"]);
    let shop = root.clone().with_database("shop");
    assert_eq!(model.schemas(&shop).unwrap().names(), vec!["dbo", "sales", "sys"]);
    assert_eq!(object_names(&model, &scope("shop", "dbo")), vec!["Emp", "Dept", "VEmp"]);
    assert_eq!(object_names(&model, &scope("hr", "dbo")), vec!["Staff"]);

    let system = model.object(&scope("shop", "sys").with_object("objects")).unwrap();
    assert_eq!(system.kind, ObjectKind::SystemView);
    assert!(system.system);

    // hr is visited inside its own catalog and the original one is restored
    assert_eq!(handle.catalog_switches(), vec!["hr", "shop", "hr", "shop"]);
    assert_eq!(session.lock().active_catalog().as_deref(), Some("shop"));
}

#[test]
fn test_reload_is_idempotent() {
    let (session, _handle) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();
    let dbo = scope("shop", "dbo");

    let first = loader.load_objects(&session, &mut model, &dbo).unwrap();
    assert_eq!(first.added, 3);
    let snapshot = model.clone();

    let second = loader.load_objects(&session, &mut model, &dbo).unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(model, snapshot);
}

#[test]
fn test_single_default_database() {
    let loader = universal_loader();
    let mut model = MetadataModel::new();
    let root = MetadataScope::root();

    let (session, _) = universal_session();
    loader.load_databases(&session, &mut model, &root).unwrap();
    let defaults: Vec<&str> = model
        .databases(&root)
        .unwrap()
        .iter()
        .filter(|d| d.is_default())
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(defaults, vec!["shop"]);

    // A connection now sitting in "hr" moves the flag
    let (adapter, _) = MockAdapterBuilder::new()
        .with_snapshot(RowSetFixtures::shop_snapshot().with_active_catalog("hr"))
        .build();
    let session = ConnectionSession::new(adapter);
    let report = loader.load_databases(&session, &mut model, &root).unwrap();
    assert_eq!(report.added, 0);
    let defaults: Vec<&str> = model
        .databases(&root)
        .unwrap()
        .iter()
        .filter(|d| d.is_default())
        .map(|d| d.name.as_str())
        .collect();
    assert_eq!(defaults, vec!["hr"]);
}

#[test]
fn test_unknown_ancestor_issues_no_query() {
    let (session, handle) = mssql_session();
    let loader = mssql_loader();
    let mut model = MetadataModel::new();

    let report = loader
        .load_objects(&session, &mut model, &MetadataScope::root().with_database("shop"))
        .unwrap();
    assert!(report.abandoned);
    let report = loader
        .load_schemas(&session, &mut model, &MetadataScope::root())
        .unwrap();
    assert!(report.abandoned);

    assert!(handle.calls().is_empty());
    assert_eq!(handle.opens(), 0);
    assert!(object_names(&model, &MetadataScope::root().with_database("shop")).is_empty());
}

#[test]
fn test_fields_without_schema_issue_no_query() {
    let emp = MetadataScope::root().with_database("shop").with_object("Emp");

    // Columns listing plus schema-only fallback
    let (session, handle) = mssql_session();
    let mut model = MetadataModel::new();
    let report = mssql_loader().load_fields(&session, &mut model, &emp).unwrap();
    assert!(report.abandoned);
    assert_eq!(report.added, 0);
    assert!(handle.calls().is_empty());

    // Schema-only fallback alone
    let (session, handle) = universal_session();
    let report = universal_loader().load_fields(&session, &mut model, &emp).unwrap();
    assert!(report.abandoned);
    assert!(handle.calls().is_empty());
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[test]
fn test_connection_without_active_catalog_stays_unswitched() {
    let mut snapshot = RowSetFixtures::shop_snapshot();
    snapshot.active_catalog = None;
    let (adapter, handle) = MockAdapterBuilder::new().with_snapshot(snapshot).build();
    let session = ConnectionSession::new(adapter);
    let loader = universal_loader();
    let mut model = MetadataModel::new();
    let root = MetadataScope::root();

    let hr = scope("hr", "dbo");
    let report = loader.load_objects(&session, &mut model, &hr).unwrap();
    assert!(report.warnings.is_empty());
    assert_eq!(object_names(&model, &hr), vec!["Staff"]);
    assert!(handle.catalog_switches().is_empty());

    // Nothing left the connection in "hr", so no database becomes the default
    loader.load_databases(&session, &mut model, &root).unwrap();
    let databases = model.databases(&root).unwrap();
    assert!(databases.find("hr").is_some());
    assert!(databases.iter().all(|d| !d.is_default()));
}

#[test]
fn test_linked_server_scopes_are_skipped() {
    let (session, handle) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();

    let remote = scope("shop", "dbo").with_server("LINKED");
    let report = loader.load_objects(&session, &mut model, &remote).unwrap();
    assert!(report.abandoned);
    assert_eq!(handle.round_trips(), 0);
}

#[test]
fn test_mssql_namespaces_and_classification() {
    let (session, handle) = mssql_session();
    let loader = mssql_loader();
    let mut model = MetadataModel::new();
    let root = MetadataScope::root();

    loader.load_databases(&session, &mut model, &root).unwrap();
    assert_eq!(model.databases(&root).unwrap().names(), vec!["master", "shop"]);
    assert!(model.databases(&root).unwrap().find("master").unwrap().default);

    let shop = root.clone().with_database("shop");
    let report = loader.load_schemas(&session, &mut model, &shop).unwrap();
    assert_eq!(report.added, 3);
    assert_eq!(model.schemas(&shop).unwrap().names(), vec!["dbo", "audit", "reporting"]);

    let dbo = scope("shop", "dbo");
    loader.load_objects(&session, &mut model, &dbo).unwrap();
    let objects = model.objects(&dbo).unwrap();
    assert_eq!(objects.find("Emp").unwrap().kind, ObjectKind::Table);
    assert_eq!(objects.find("VEmp").unwrap().kind, ObjectKind::View);
    // Unknown tags fall back to the default kind instead of being dropped
    assert_eq!(objects.find("Legacy").unwrap().kind, ObjectKind::Table);
    assert_eq!(objects.len(), 3);

    // mssql never switches catalogs; restrictions carry the scope instead
    assert!(handle.catalog_switches().is_empty());
    let (_, restrictions, _) = handle.fetches().pop().unwrap();
    assert_eq!(restrictions, vec![Some("shop".to_string()), Some("dbo".to_string())]);
}

#[test]
fn test_fields_sorted_by_ordinal() {
    let (session, _) = mssql_session();
    let loader = mssql_loader();
    let mut model = MetadataModel::new();
    let dbo = scope("shop", "dbo");
    loader.load_objects(&session, &mut model, &dbo).unwrap();

    let emp = dbo.clone().with_object("Emp");
    let report = loader.load_fields(&session, &mut model, &emp).unwrap();
    assert_eq!(report.added, 3);

    let object = model.object(&emp).unwrap();
    let names: Vec<&str> = object.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "salary"]);
    assert!(object.fields.windows(2).all(|w| w[0].ordinal < w[1].ordinal));

    let id = object.field("id").unwrap();
    assert!(!id.nullable);
    assert_eq!(id.server_type, "int");
    let name = object.field("name").unwrap();
    assert!(name.nullable);
    assert_eq!(name.size, Some(50));
    assert_eq!(name.default_value.as_deref(), Some("('')"));
    let salary = object.field("salary").unwrap();
    assert_eq!((salary.precision, salary.scale), (Some(10), Some(2)));
}

#[test]
fn test_schema_only_field_fallback() {
    let (session, handle) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();
    let dbo = scope("shop", "dbo");
    loader.load_objects(&session, &mut model, &dbo).unwrap();

    let emp = dbo.clone().with_object("Emp");
    loader.load_fields(&session, &mut model, &emp).unwrap();
    assert_eq!(
        handle.queries(),
        vec![r#"SELECT * FROM "shop"."dbo"."Emp" WHERE 1=0"#.to_string()]
    );
    let object = model.object(&emp).unwrap();
    let names: Vec<&str> = object.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name", "dept_id"]);
    assert!(!object.field("id").unwrap().nullable);
    assert_eq!(object.field("name").unwrap().size, Some(50));
}

#[test]
fn test_foreign_key_and_referencing_objects() {
    let (session, _) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();
    let dbo = scope("shop", "dbo");
    loader.load_objects(&session, &mut model, &dbo).unwrap();
    let emp = dbo.clone().with_object("Emp");
    let dept = dbo.clone().with_object("Dept");
    loader.load_fields(&session, &mut model, &dept).unwrap();

    let report = loader.load_foreign_keys(&session, &mut model, &emp).unwrap();
    assert_eq!(report.added, 1);
    let key = &model.object(&emp).unwrap().foreign_keys[0];
    assert_eq!(key.key_id.as_deref(), Some("FK_Emp_Dept"));
    assert_eq!(key.referencing_fields(), vec!["dept_id"]);
    assert_eq!(key.columns[0].referenced_field, "id");
    assert_eq!(key.referenced_object(&model, &dbo).unwrap().name, "Dept");
    assert_eq!(
        key.referenced_fields(&model, &dbo)[0].map(|f| f.name.as_str()),
        Some("id")
    );

    let (names, _) = loader.referencing_objects(&session, &dept).unwrap();
    assert_eq!(
        names,
        vec![QualifiedName::new("Emp").with_database("shop").with_schema("dbo")]
    );
}

#[test]
fn test_optional_collection_falls_back() {
    let (session, _) = mssql_session();
    let loader = mssql_loader();
    let mut model = MetadataModel::new();
    let dbo = scope("shop", "dbo");
    loader.load_objects(&session, &mut model, &dbo).unwrap();

    // The snapshot has no ForeignKeys collection
    let emp = dbo.clone().with_object("Emp");
    let report = loader.load_foreign_keys(&session, &mut model, &emp).unwrap();
    assert!(report.has_fallbacks());
    assert_eq!(
        report.fallbacks,
        vec![OptionalFetchError::Unsupported {
            collection: "ForeignKeys".to_string()
        }]
    );
    assert!(model.object(&emp).unwrap().foreign_keys.is_empty());
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn test_primary_failure_empties_level() {
    let (session, handle) = mssql_session();
    let loader = mssql_loader();
    let mut model = MetadataModel::new();
    let root = MetadataScope::root();
    loader.load_databases(&session, &mut model, &root).unwrap();
    assert_eq!(model.databases(&root).unwrap().len(), 2);

    handle.fail_collection("Databases", AdapterError::Query("permission denied".to_string()));
    let err = loader.load_databases(&session, &mut model, &root).unwrap_err();
    assert!(matches!(
        err,
        CatalogError::CollectionFetchFailed { ref collection, .. } if collection == "Databases"
    ));
    assert!(model.databases(&root).unwrap().is_empty());
    // Query errors keep the connection
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn test_catalog_restored_after_failed_fetch() {
    let (session, handle) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();

    handle.fail_collection("Tables", AdapterError::Query("boom".to_string()));
    let result = loader.load_objects(&session, &mut model, &scope("hr", "dbo"));
    assert!(result.is_err());
    assert_eq!(handle.catalog_switches(), vec!["hr", "shop"]);
    assert_eq!(session.lock().active_catalog().as_deref(), Some("shop"));
}

#[test]
fn test_failed_restore_is_a_warning() {
    let (session, handle) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();

    handle.fail_catalog_switch("shop", AdapterError::Query("denied".to_string()));
    let report = loader
        .load_schemas(&session, &mut model, &MetadataScope::root().with_database("hr"))
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.warnings.len(), 1);
}

#[test]
fn test_switch_unsupported_runs_in_current_catalog() {
    let (adapter, handle) = MockAdapterBuilder::new()
        .with_snapshot(RowSetFixtures::shop_snapshot().without_catalog_switch())
        .build();
    let session = ConnectionSession::new(adapter);
    let loader = universal_loader();
    let mut model = MetadataModel::new();

    let report = loader
        .load_objects(&session, &mut model, &scope("hr", "dbo"))
        .unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(handle.catalog_switches(), vec!["hr"]);
}

#[test]
fn test_catalog_switch_failure() {
    let (session, handle) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();

    handle.fail_catalog_switch("hr", AdapterError::Query("no access".to_string()));
    let err = loader
        .load_objects(&session, &mut model, &scope("hr", "dbo"))
        .unwrap_err();
    assert!(matches!(err, CatalogError::CatalogSwitchFailed { ref catalog, .. } if catalog == "hr"));
    assert_eq!(handle.round_trips(), 0);
}

#[test]
fn test_io_failure_disconnects_and_recovers() {
    let (session, handle) = universal_session();
    let loader = universal_loader();
    let mut model = MetadataModel::new();
    let dbo = scope("shop", "dbo");

    handle.fail_collection("Tables", AdapterError::Io("connection reset".to_string()));
    assert!(loader.load_objects(&session, &mut model, &dbo).is_err());
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(session.lock().last_failure().is_some());

    handle.clear_failures();
    let report = loader.load_objects(&session, &mut model, &dbo).unwrap();
    assert_eq!(report.added, 3);
    assert_eq!(handle.opens(), 2);
    assert_eq!(session.state(), SessionState::Connected);
}

#[test]
fn test_open_failure() {
    let (adapter, _) = MockAdapterBuilder::new()
        .failing_open(AdapterError::Io("refused".to_string()))
        .build();
    let session = ConnectionSession::new(adapter);
    let err = universal_loader()
        .load_databases(&session, &mut MetadataModel::new(), &MetadataScope::root())
        .unwrap_err();
    assert!(matches!(err, CatalogError::ConnectionFailed(_)));
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[test]
fn test_no_connection_configured() {
    let session = ConnectionSession::unconfigured();
    let err = universal_loader()
        .load_databases(&session, &mut MetadataModel::new(), &MetadataScope::root())
        .unwrap_err();
    assert_eq!(err, CatalogError::NoConnectionConfigured);
}

#[test]
fn test_operations_on_one_connection_are_serialized() {
    let (adapter, handle) = MockAdapterBuilder::new()
        .with_snapshot(RowSetFixtures::shop_snapshot())
        .with_latency(Duration::from_millis(5))
        .build();
    let session = Arc::new(ConnectionSession::new(adapter));
    let loader = universal_loader();

    let targets = [
        scope("shop", "dbo"),
        scope("shop", "sales"),
        scope("hr", "dbo"),
        scope("shop", "sys"),
    ];
    thread::scope(|s| {
        for target in &targets {
            let session = Arc::clone(&session);
            let loader = loader.clone();
            s.spawn(move || {
                let mut model = MetadataModel::new();
                for _ in 0..3 {
                    loader.load_objects(&session, &mut model, target).unwrap();
                }
                assert!(!object_names(&model, target).is_empty());
            });
        }
    });

    assert_eq!(handle.max_concurrency(), 1);
    assert_eq!(handle.fetches().len(), 12);
    assert_eq!(session.lock().active_catalog().as_deref(), Some("shop"));
}
