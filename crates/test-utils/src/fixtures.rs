// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Test fixtures: catalog collections shaped like real driver output
//!
//! Two small backends are modelled:
//!
//! - `shop_snapshot`: an ADO.NET-style backend with `Tables` and
//!   `ForeignKeys` collections (the `universal` profile's vocabulary)
//! - `mssql_snapshot`: a SqlClient-style backend with `Databases`,
//!   `Tables`, `Views` and `Columns` (the `mssql` profile's vocabulary)

use unified_sql_metadata_catalog::{CatalogSnapshot, ColumnDescriptor, RowSet, Value};

/// Sample row-sets and snapshots for testing
pub struct RowSetFixtures;

impl RowSetFixtures {
    // ===== Universal (ADO.NET GetSchema) =====

    /// `Tables` collection spanning two catalogs
    pub fn universal_tables() -> RowSet {
        RowSet::new(["TABLE_CAT", "TABLE_SCHEM", "TABLE_NAME", "TABLE_TYPE", "REMARKS"])
            .with_row(["shop", "dbo", "Emp", "TABLE", "Employees"])
            .with_row(["shop", "dbo", "Dept", "TABLE", ""])
            .with_row(["shop", "dbo", "VEmp", "VIEW", ""])
            .with_row(["shop", "sales", "Orders", "BASE TABLE", ""])
            .with_row(["shop", "sys", "objects", "SYSTEM VIEW", ""])
            .with_row(["hr", "dbo", "Staff", "TABLE", ""])
    }

    /// `ForeignKeys` collection: `Emp.dept_id -> Dept.id`
    pub fn universal_foreign_keys() -> RowSet {
        RowSet::new([
            "PKTABLE_CAT",
            "PKTABLE_SCHEM",
            "PKTABLE_NAME",
            "PKCOLUMN_NAME",
            "FKTABLE_CAT",
            "FKTABLE_SCHEM",
            "FKTABLE_NAME",
            "FKCOLUMN_NAME",
            "KEY_SEQ",
            "FK_NAME",
        ])
        .with_row([
            Value::from("shop"),
            Value::from("dbo"),
            Value::from("Dept"),
            Value::from("id"),
            Value::from("shop"),
            Value::from("dbo"),
            Value::from("Emp"),
            Value::from("dept_id"),
            Value::Int(1),
            Value::from("FK_Emp_Dept"),
        ])
    }

    /// Column descriptors returned by a schema-only `SELECT` on `Emp`
    pub fn emp_descriptors() -> RowSet {
        RowSet::new([
            ColumnDescriptor::new("id").with_type("int").with_nullable(false),
            ColumnDescriptor::new("name").with_type("varchar").with_size(50),
            ColumnDescriptor::new("dept_id").with_type("int"),
        ])
        .with_row([Value::Int(1), Value::from("Ann"), Value::Int(10)])
    }

    /// Column descriptors returned by a schema-only `SELECT` on `Dept`
    pub fn dept_descriptors() -> RowSet {
        RowSet::new([
            ColumnDescriptor::new("id").with_type("int").with_nullable(false),
            ColumnDescriptor::new("title").with_type("varchar").with_size(80),
        ])
    }

    /// Backend answering the `universal` profile, active catalog `shop`
    pub fn shop_snapshot() -> CatalogSnapshot {
        CatalogSnapshot::new()
            .with_active_catalog("shop")
            .with_catalogs(["hr"])
            .with_collection(
                "Tables",
                &[Some("TABLE_CAT"), Some("TABLE_SCHEM"), Some("TABLE_NAME"), Some("TABLE_TYPE")],
                Self::universal_tables(),
            )
            .with_collection(
                "ForeignKeys",
                &[
                    Some("PKTABLE_CAT"),
                    Some("PKTABLE_SCHEM"),
                    Some("PKTABLE_NAME"),
                    Some("FKTABLE_CAT"),
                    Some("FKTABLE_SCHEM"),
                    Some("FKTABLE_NAME"),
                ],
                Self::universal_foreign_keys(),
            )
            .with_query(
                r#"SELECT * FROM "shop"."dbo"."Emp" WHERE 1=0"#,
                Self::emp_descriptors(),
            )
            .with_query(
                r#"SELECT * FROM "shop"."dbo"."Dept" WHERE 1=0"#,
                Self::dept_descriptors(),
            )
    }

    // ===== MSSQL (SqlClient GetSchema) =====

    pub fn mssql_databases() -> RowSet {
        RowSet::new(["database_name", "dbid"])
            .with_row([Value::from("master"), Value::Int(1)])
            .with_row([Value::from("shop"), Value::Int(5)])
    }

    pub fn mssql_tables() -> RowSet {
        RowSet::new(["TABLE_CATALOG", "TABLE_SCHEMA", "TABLE_NAME", "TABLE_TYPE"])
            .with_row(["shop", "dbo", "Emp", "BASE TABLE"])
            .with_row(["shop", "dbo", "VEmp", "VIEW"])
            .with_row(["shop", "dbo", "Legacy", "EXTERNAL"])
            .with_row(["shop", "audit", "Log", "BASE TABLE"])
            .with_row(["master", "dbo", "spt_values", "BASE TABLE"])
    }

    pub fn mssql_views() -> RowSet {
        RowSet::new(["TABLE_CATALOG", "TABLE_SCHEMA", "TABLE_NAME"])
            .with_row(["shop", "reporting", "Summary"])
    }

    /// `Columns` rows for `shop.dbo.Emp`, deliberately out of ordinal order
    pub fn mssql_columns() -> RowSet {
        RowSet::new([
            "TABLE_CATALOG",
            "TABLE_SCHEMA",
            "TABLE_NAME",
            "COLUMN_NAME",
            "ORDINAL_POSITION",
            "IS_NULLABLE",
            "DATA_TYPE",
            "CHARACTER_MAXIMUM_LENGTH",
            "NUMERIC_PRECISION",
            "NUMERIC_SCALE",
            "COLUMN_DEFAULT",
        ])
        .with_row([
            Value::from("shop"),
            Value::from("dbo"),
            Value::from("Emp"),
            Value::from("salary"),
            Value::Int(3),
            Value::from("YES"),
            Value::from("decimal"),
            Value::Null,
            Value::Int(10),
            Value::Int(2),
            Value::Null,
        ])
        .with_row([
            Value::from("shop"),
            Value::from("dbo"),
            Value::from("Emp"),
            Value::from("id"),
            Value::Int(1),
            Value::from("NO"),
            Value::from("int"),
            Value::Null,
            Value::Int(10),
            Value::Int(0),
            Value::Null,
        ])
        .with_row([
            Value::from("shop"),
            Value::from("dbo"),
            Value::from("Emp"),
            Value::from("name"),
            Value::Int(2),
            Value::from("YES"),
            Value::from("nvarchar"),
            Value::Int(50),
            Value::Null,
            Value::Null,
            Value::from("('')"),
        ])
    }

    /// Backend answering the `mssql` profile, active catalog `master`
    pub fn mssql_snapshot() -> CatalogSnapshot {
        let table_columns = [
            Some("TABLE_CATALOG"),
            Some("TABLE_SCHEMA"),
            Some("TABLE_NAME"),
            Some("TABLE_TYPE"),
        ];
        CatalogSnapshot::new()
            .with_active_catalog("master")
            .with_catalogs(["shop"])
            .with_collection("Databases", &[Some("database_name")], Self::mssql_databases())
            .with_collection("Tables", &table_columns, Self::mssql_tables())
            .with_collection("Views", &table_columns[..3], Self::mssql_views())
            .with_collection(
                "Columns",
                &[
                    Some("TABLE_CATALOG"),
                    Some("TABLE_SCHEMA"),
                    Some("TABLE_NAME"),
                    Some("COLUMN_NAME"),
                ],
                Self::mssql_columns(),
            )
    }
}
