// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Built-in provider profiles
//!
//! Collection names and column candidates for the common driver families.
//! Each function returns a fresh, validated-by-construction profile.

use unified_sql_metadata_model::{Dialect, ObjectKind};

use crate::config::{
    Classification, CollectionSource, ColumnCandidates, FieldFetchConfig, ForeignKeyFetchConfig,
    NamespaceFetchConfig, NullableRule, ObjectFetchConfig, ProviderProfile,
    ReferencingFetchConfig, RestrictionLayout, SystemFlagRule,
};

/// All built-in profiles
pub fn builtin_profiles() -> Vec<ProviderProfile> {
    vec![
        universal(),
        odbc(),
        oledb(),
        mssql(),
        mysql(),
        sqlite(),
        firebird(),
        db2(),
        vistadb(),
    ]
}

fn tables_source(layout: RestrictionLayout) -> CollectionSource<ObjectFetchConfig> {
    CollectionSource::new("Tables", layout, ObjectFetchConfig::default())
}

/// Generic ADO.NET-style provider
pub fn universal() -> ProviderProfile {
    ProviderProfile::new("universal", Dialect::Generic)
        .with_description("Universal metadata provider")
        .with_switch_catalog(true)
        .with_databases(
            CollectionSource::new(
                "Tables",
                RestrictionLayout::empty(),
                NamespaceFetchConfig::new(["TABLE_CATALOG", "TABLE_CAT"]),
            )
            .optional(),
        )
        .with_schemas(CollectionSource::new(
            "Tables",
            RestrictionLayout::standard(4),
            NamespaceFetchConfig::new(["TABLE_SCHEMA", "TABLE_SCHEM"]),
        ))
        .with_objects(tables_source(RestrictionLayout::standard(4)))
        .with_foreign_keys(
            CollectionSource::new(
                "ForeignKeys",
                RestrictionLayout::with_slots(6, Some(3), Some(4), Some(5)),
                ForeignKeyFetchConfig::default(),
            )
            .optional(),
        )
        .with_referencing(
            CollectionSource::new(
                "ForeignKeys",
                RestrictionLayout::standard(6),
                ReferencingFetchConfig::default(),
            )
            .optional(),
        )
}

/// ODBC drivers (including legacy qualifier/owner naming)
pub fn odbc() -> ProviderProfile {
    ProviderProfile::new("odbc", Dialect::Generic)
        .with_description("ODBC metadata provider")
        .with_switch_catalog(true)
        .with_databases(
            CollectionSource::new(
                "Tables",
                RestrictionLayout::empty(),
                NamespaceFetchConfig::new(["TABLE_CAT", "TABLE_QUALIFIER", "QUALIFIERNAME"]),
            )
            .optional(),
        )
        .with_schemas(CollectionSource::new(
            "Tables",
            RestrictionLayout::standard(4),
            NamespaceFetchConfig::new(["TABLE_SCHEM", "TABLE_OWNER", "OWNER"]),
        ))
        .with_objects(tables_source(RestrictionLayout::standard(4)))
        .with_objects(
            CollectionSource::new(
                "Views",
                RestrictionLayout::standard(4),
                ObjectFetchConfig::default().with_default_kind(ObjectKind::View),
            )
            .optional(),
        )
        .with_fields(
            CollectionSource::new(
                "Columns",
                RestrictionLayout::standard(4),
                FieldFetchConfig {
                    server_type: ColumnCandidates::from(["TYPE_NAME"]),
                    size: ColumnCandidates::from(["COLUMN_SIZE"]),
                    scale: ColumnCandidates::from(["DECIMAL_DIGITS"]),
                    description: ColumnCandidates::from(["REMARKS"]),
                    ..FieldFetchConfig::default()
                },
            )
            .optional(),
        )
}

/// OLE DB providers
pub fn oledb() -> ProviderProfile {
    ProviderProfile::new("oledb", Dialect::Generic)
        .with_description("OLE DB metadata provider")
        .with_switch_catalog(true)
        .with_databases(
            CollectionSource::new(
                "Catalogs",
                RestrictionLayout::empty(),
                NamespaceFetchConfig::new(["CATALOG_NAME"]),
            )
            .optional(),
        )
        .with_schemas(CollectionSource::new(
            "Tables",
            RestrictionLayout::standard(4),
            NamespaceFetchConfig::new(["TABLE_SCHEMA"]),
        ))
        .with_objects(CollectionSource::new(
            "Tables",
            RestrictionLayout::standard(4),
            ObjectFetchConfig::default().with_description(["DESCRIPTION"]),
        ))
        .with_fields(
            CollectionSource::new(
                "Columns",
                RestrictionLayout::standard(4),
                FieldFetchConfig {
                    size: ColumnCandidates::from(["CHARACTER_MAXIMUM_LENGTH"]),
                    precision: ColumnCandidates::from(["NUMERIC_PRECISION"]),
                    scale: ColumnCandidates::from(["NUMERIC_SCALE"]),
                    description: ColumnCandidates::from(["DESCRIPTION"]),
                    ..FieldFetchConfig::default()
                },
            )
            .optional(),
        )
        .with_foreign_keys(
            CollectionSource::new(
                "Foreign_Keys",
                RestrictionLayout::with_slots(6, Some(3), Some(4), Some(5)),
                ForeignKeyFetchConfig {
                    pk_database: ColumnCandidates::from(["PK_TABLE_CATALOG"]),
                    pk_schema: ColumnCandidates::from(["PK_TABLE_SCHEMA"]),
                    pk_object: ColumnCandidates::from(["PK_TABLE_NAME"]),
                    pk_field: ColumnCandidates::from(["PK_COLUMN_NAME"]),
                    fk_field: ColumnCandidates::from(["FK_COLUMN_NAME"]),
                    ordinal: ColumnCandidates::from(["ORDINAL"]),
                    ..ForeignKeyFetchConfig::default()
                },
            )
            .optional(),
        )
}

/// Microsoft SQL Server (SqlClient collections)
pub fn mssql() -> ProviderProfile {
    let schemas = |collection: &str| {
        CollectionSource::new(
            collection,
            RestrictionLayout::standard(1),
            NamespaceFetchConfig::new(["TABLE_SCHEMA"]),
        )
    };
    ProviderProfile::new("mssql", Dialect::MsSql)
        .with_description("MSSQL metadata provider")
        .with_databases(CollectionSource::new(
            "Databases",
            RestrictionLayout::empty(),
            NamespaceFetchConfig::new(["database_name"]),
        ))
        .with_schemas(schemas("Tables"))
        .with_schemas(schemas("Views"))
        .with_objects(CollectionSource::new(
            "Tables",
            RestrictionLayout::standard(2),
            ObjectFetchConfig::default()
                .with_classification(
                    Classification::new()
                        .with(ObjectKind::Table, &["BASE TABLE"])
                        .with(ObjectKind::View, &["VIEW"]),
                )
                .with_description(ColumnCandidates::none()),
        ))
        .with_fields(
            CollectionSource::new(
                "Columns",
                RestrictionLayout::standard(3),
                FieldFetchConfig {
                    nullable: NullableRule {
                        column: ColumnCandidates::from(["IS_NULLABLE"]),
                        sentinel: Some("YES".to_string()),
                    },
                    server_type: ColumnCandidates::from(["DATA_TYPE"]),
                    size: ColumnCandidates::from(["CHARACTER_MAXIMUM_LENGTH"]),
                    precision: ColumnCandidates::from(["NUMERIC_PRECISION"]),
                    scale: ColumnCandidates::from(["NUMERIC_SCALE"]),
                    default_value: ColumnCandidates::from(["COLUMN_DEFAULT"]),
                    ..FieldFetchConfig::default()
                },
            )
            .optional(),
        )
        .with_foreign_keys(
            CollectionSource::new(
                "ForeignKeys",
                RestrictionLayout::standard(4),
                ForeignKeyFetchConfig::default(),
            )
            .optional(),
        )
}

/// MySQL Connector/NET collections
pub fn mysql() -> ProviderProfile {
    ProviderProfile::new("mysql", Dialect::MySql)
        .with_description("MySQL metadata provider")
        .with_databases(CollectionSource::new(
            "Databases",
            RestrictionLayout::empty(),
            NamespaceFetchConfig::new(["DATABASE_NAME", "SCHEMA_NAME"]),
        ))
        .with_objects(CollectionSource::new(
            "Tables",
            RestrictionLayout::with_slots(4, Some(1), None, None),
            ObjectFetchConfig::default().with_classification(
                Classification::new()
                    .with(ObjectKind::Table, &["BASE TABLE"])
                    .with(ObjectKind::SystemTable, &["SYSTEM TABLE", "SYSTEM VIEW"]),
            ),
        ))
        .with_objects(
            CollectionSource::new(
                "Views",
                RestrictionLayout::with_slots(4, Some(1), None, None),
                ObjectFetchConfig::default()
                    .with_kind_column(ColumnCandidates::none())
                    .with_default_kind(ObjectKind::View),
            )
            .optional(),
        )
        .with_foreign_keys(
            CollectionSource::new(
                "Foreign Key Columns",
                RestrictionLayout::with_slots(4, Some(1), None, Some(2)),
                ForeignKeyFetchConfig {
                    key_id: ColumnCandidates::from(["CONSTRAINT_NAME"]),
                    pk_database: ColumnCandidates::from(["REFERENCED_TABLE_SCHEMA"]),
                    pk_schema: ColumnCandidates::none(),
                    pk_object: ColumnCandidates::from(["REFERENCED_TABLE_NAME"]),
                    pk_field: ColumnCandidates::from(["REFERENCED_COLUMN_NAME"]),
                    fk_field: ColumnCandidates::from(["COLUMN_NAME"]),
                    ordinal: ColumnCandidates::from(["ORDINAL_POSITION"]),
                    trim_strings: false,
                },
            )
            .optional(),
        )
}

/// System.Data.SQLite collections
pub fn sqlite() -> ProviderProfile {
    ProviderProfile::new("sqlite", Dialect::Sqlite)
        .with_description("SQLite metadata provider")
        .with_databases(
            CollectionSource::new(
                "Catalogs",
                RestrictionLayout::empty(),
                NamespaceFetchConfig::new(["CATALOG_NAME", "TABLE_CATALOG"]),
            )
            .optional(),
        )
        .with_objects(CollectionSource::new(
            "Tables",
            RestrictionLayout::with_slots(4, Some(0), None, None),
            ObjectFetchConfig::default().with_classification(
                Classification::new()
                    .with(ObjectKind::Table, &["TABLE", "table", "BASE TABLE"])
                    .with(ObjectKind::SystemTable, &["SYSTEM_TABLE", "SYSTEM TABLE"])
                    .with(ObjectKind::View, &["VIEW"])
                    .with(ObjectKind::SystemView, &["SYSTEM VIEW"])
                    .with(ObjectKind::Synonym, &["ALIAS"]),
            ),
        ))
        .with_objects(
            CollectionSource::new(
                "Views",
                RestrictionLayout::with_slots(4, Some(0), None, None),
                ObjectFetchConfig::default()
                    .with_kind_column(ColumnCandidates::none())
                    .with_default_kind(ObjectKind::View),
            )
            .optional(),
        )
        .with_foreign_keys(
            CollectionSource::new(
                "ForeignKeys",
                RestrictionLayout::with_slots(4, Some(0), None, Some(2)),
                ForeignKeyFetchConfig {
                    key_id: ColumnCandidates::from(["CONSTRAINT_NAME"]),
                    pk_database: ColumnCandidates::from(["FKEY_TO_CATALOG"]),
                    pk_schema: ColumnCandidates::none(),
                    pk_object: ColumnCandidates::from(["FKEY_TO_TABLE"]),
                    pk_field: ColumnCandidates::from(["FKEY_TO_COLUMN"]),
                    fk_field: ColumnCandidates::from(["FKEY_FROM_COLUMN"]),
                    ordinal: ColumnCandidates::from(["FKEY_FROM_ORDINAL_POSITION"]),
                    trim_strings: false,
                },
            )
            .optional(),
        )
        .with_referencing(
            CollectionSource::new(
                "ForeignKeys",
                RestrictionLayout::with_slots(4, Some(0), None, None),
                ReferencingFetchConfig {
                    database: ColumnCandidates::from(["TABLE_CATALOG"]),
                    schema: ColumnCandidates::none(),
                    object: ColumnCandidates::from(["TABLE_NAME"]),
                    trim_strings: false,
                },
            )
            .optional(),
        )
}

/// Firebird ADO.NET provider (CHAR-padded names)
pub fn firebird() -> ProviderProfile {
    ProviderProfile::new("firebird", Dialect::Firebird)
        .with_description("Firebird metadata provider")
        .with_objects(CollectionSource::new(
            "Tables",
            RestrictionLayout::empty(),
            ObjectFetchConfig::default()
                .with_classification(
                    Classification::new()
                        .with(ObjectKind::Table, &["TABLE"])
                        .with(ObjectKind::SystemTable, &["SYSTEM_TABLE"])
                        .with(ObjectKind::View, &["VIEW"]),
                )
                .with_trim_strings(true),
        ))
        .with_objects(
            CollectionSource::new(
                "Procedures",
                RestrictionLayout::empty(),
                ObjectFetchConfig::default()
                    .with_name(["PROCEDURE_NAME"])
                    .with_kind_column(ColumnCandidates::none())
                    .with_default_kind(ObjectKind::Procedure)
                    .with_system_flag(SystemFlagRule::new(["IS_SYSTEM_PROCEDURE"], "1"))
                    .with_trim_strings(true),
            )
            .optional(),
        )
        .with_foreign_keys(
            CollectionSource::new(
                "ForeignKeyColumns",
                RestrictionLayout::with_slots(4, None, None, Some(2)),
                ForeignKeyFetchConfig {
                    key_id: ColumnCandidates::from(["CONSTRAINT_NAME"]),
                    pk_database: ColumnCandidates::none(),
                    pk_schema: ColumnCandidates::none(),
                    pk_object: ColumnCandidates::from(["REFERENCED_TABLE_NAME"]),
                    pk_field: ColumnCandidates::from(["REFERENCED_COLUMN_NAME"]),
                    fk_field: ColumnCandidates::from(["COLUMN_NAME"]),
                    ordinal: ColumnCandidates::from(["ORDINAL_POSITION"]),
                    trim_strings: true,
                },
            )
            .optional(),
        )
}

/// IBM DB2 .NET provider
pub fn db2() -> ProviderProfile {
    ProviderProfile::new("db2", Dialect::Db2)
        .with_description("DB2 metadata provider")
        .with_schemas(CollectionSource::new(
            "Schemas",
            RestrictionLayout::empty(),
            NamespaceFetchConfig::new(["TABLE_SCHEMA", "SCHEMA_NAME"]).with_trim(),
        ))
        .with_objects(CollectionSource::new(
            "Tables",
            RestrictionLayout::with_slots(3, None, Some(1), None),
            ObjectFetchConfig::default()
                .with_classification(
                    Classification::new()
                        .with(ObjectKind::Table, &["TABLE"])
                        .with(ObjectKind::SystemTable, &["SYSTEM TABLE"])
                        .with(ObjectKind::View, &["VIEW"])
                        .with(ObjectKind::Synonym, &["ALIAS", "SYNONYM"]),
                )
                .with_trim_strings(true),
        ))
        .with_objects(
            CollectionSource::new(
                "Procedures",
                RestrictionLayout::with_slots(3, None, Some(1), None),
                ObjectFetchConfig::default()
                    .with_name(["PROCEDURE_NAME"])
                    .with_kind_column(ColumnCandidates::none())
                    .with_default_kind(ObjectKind::Procedure)
                    .with_trim_strings(true),
            )
            .optional(),
        )
        .with_foreign_keys(
            CollectionSource::new(
                "ForeignKeys",
                RestrictionLayout::with_slots(6, None, Some(4), Some(5)),
                ForeignKeyFetchConfig {
                    trim_strings: true,
                    ..ForeignKeyFetchConfig::default()
                },
            )
            .optional(),
        )
}

/// VistaDB 5 (single-file database, no namespaces)
pub fn vistadb() -> ProviderProfile {
    ProviderProfile::new("vistadb", Dialect::VistaDb)
        .with_description("VistaDB metadata provider")
        .with_objects(CollectionSource::new(
            "Tables",
            RestrictionLayout::empty(),
            ObjectFetchConfig::default().with_classification(
                Classification::new()
                    .with(ObjectKind::Table, &["BASE TABLE", "TABLE"])
                    .with(ObjectKind::SystemTable, &["SYSTEM_TABLE"]),
            ),
        ))
        .with_objects(
            CollectionSource::new(
                "Views",
                RestrictionLayout::empty(),
                ObjectFetchConfig::default()
                    .with_kind_column(ColumnCandidates::none())
                    .with_default_kind(ObjectKind::View),
            )
            .optional(),
        )
        .with_foreign_keys(
            CollectionSource::new(
                "ForeignKeys",
                RestrictionLayout::with_slots(4, None, None, Some(2)),
                ForeignKeyFetchConfig {
                    key_id: ColumnCandidates::from(["CONSTRAINT_NAME"]),
                    pk_object: ColumnCandidates::from(["REFERENCED_TABLE_NAME"]),
                    pk_field: ColumnCandidates::from(["REFERENCED_COLUMN_NAME"]),
                    fk_field: ColumnCandidates::from(["COLUMN_NAME"]),
                    ordinal: ColumnCandidates::from(["ORDINAL_POSITION"]),
                    ..ForeignKeyFetchConfig::default()
                },
            )
            .optional(),
        )
}
