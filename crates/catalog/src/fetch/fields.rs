// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Field fetcher
//!
//! Builds an object's field sequence from a columns listing or from the
//! column descriptors of a schema-only result. Loading always replaces the
//! whole sequence.

use unified_sql_metadata_model::{Field, MetadataObject};

use super::mapper::RowMapper;
use crate::config::{FieldFetchConfig, NullableRule};
use crate::rowset::{ColumnDescriptor, RowSet};

/// Replace `object`'s fields with the columns listed in `rowset`.
///
/// Rows are re-sorted by the reported ordinal (rows without one keep their
/// relative order after the others). Reported ordinals are kept as given,
/// including 0-based ones; only a missing or repeated ordinal is replaced by
/// the next free position, so the result is strictly ascending. Rows without a name and repeated names are dropped.
/// Returns the number of fields loaded.
pub fn fetch_fields(rowset: &RowSet, config: &FieldFetchConfig, object: &mut MetadataObject) -> usize {
    object.clear_fields();

    let mapper = RowMapper::new(rowset, config.trim_strings);
    let Some(name_column) = mapper.resolve(&config.name) else {
        return 0;
    };
    let ordinal_column = mapper.resolve(&config.ordinal);
    let nullable_column = mapper.resolve(&config.nullable.column);
    let type_column = mapper.resolve(&config.server_type);
    let size_column = mapper.resolve(&config.size);
    let precision_column = mapper.resolve(&config.precision);
    let scale_column = mapper.resolve(&config.scale);
    let default_column = mapper.resolve(&config.default_value);
    let description_column = mapper.resolve(&config.description);

    let mut order: Vec<(usize, Option<i64>)> = (0..mapper.row_count())
        .map(|row| (row, mapper.int(row, ordinal_column)))
        .collect();
    // Stable: equal ordinals keep row order, missing ordinals go last
    order.sort_by_key(|(_, ordinal)| (ordinal.is_none(), *ordinal));

    let mut fields: Vec<Field> = Vec::with_capacity(order.len());
    let mut last: Option<i64> = None;
    for (row, reported) in order {
        let Some(name) = mapper.text(row, Some(name_column)).filter(|n| !n.is_empty()) else {
            continue;
        };
        if fields.iter().any(|f| f.name == name) {
            continue;
        }

        let ordinal = match (reported, last) {
            (Some(ordinal), None) => ordinal,
            (Some(ordinal), Some(last)) if ordinal > last => ordinal,
            (_, Some(last)) => last + 1,
            (None, None) => 1,
        };
        last = Some(ordinal);

        fields.push(Field {
            name,
            ordinal,
            nullable: read_nullable(&mapper, row, nullable_column, &config.nullable),
            server_type: mapper.text(row, type_column).unwrap_or_default(),
            size: mapper.int(row, size_column),
            precision: mapper.int(row, precision_column),
            scale: mapper.int(row, scale_column),
            default_value: mapper.text(row, default_column),
            description: mapper.text(row, description_column).filter(|d| !d.is_empty()),
        });
    }

    let count = fields.len();
    object.replace_fields(fields);
    count
}

fn read_nullable(
    mapper: &RowMapper<'_>,
    row: usize,
    column: Option<usize>,
    rule: &NullableRule,
) -> bool {
    match &rule.sentinel {
        Some(sentinel) => mapper
            .text(row, column)
            .map(|value| value.trim().eq_ignore_ascii_case(sentinel))
            .unwrap_or(true),
        None => mapper.bool(row, column).unwrap_or(true),
    }
}

/// Fields described by a schema-only result's columns, in column order
pub fn fields_from_descriptors(columns: &[ColumnDescriptor]) -> Vec<Field> {
    let mut fields: Vec<Field> = Vec::with_capacity(columns.len());
    for column in columns {
        if column.name.is_empty() || fields.iter().any(|f| f.name == column.name) {
            continue;
        }
        fields.push(Field {
            name: column.name.clone(),
            ordinal: fields.len() as i64 + 1,
            nullable: column.nullable,
            server_type: column.type_name.clone(),
            size: column.size,
            precision: column.precision,
            scale: column.scale,
            default_value: None,
            description: None,
        });
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ColumnCandidates;
    use crate::rowset::Value;
    use unified_sql_metadata_model::ObjectKind;

    fn names(object: &MetadataObject) -> Vec<&str> {
        object.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_out_of_order_rows_are_sorted() {
        let rs = RowSet::new(["COLUMN_NAME", "ORDINAL_POSITION", "TYPE_NAME"])
            .with_row([Value::from("c"), Value::Int(3), Value::from("int")])
            .with_row([Value::from("a"), Value::Int(1), Value::from("int")])
            .with_row([Value::from("b"), Value::from("2"), Value::from("varchar")]);
        let mut object = MetadataObject::new("t", ObjectKind::Table);
        assert_eq!(fetch_fields(&rs, &FieldFetchConfig::default(), &mut object), 3);
        assert_eq!(names(&object), vec!["a", "b", "c"]);
        let ordinals: Vec<_> = object.fields.iter().map(|f| f.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }

    #[test]
    fn test_ordinals_forced_strictly_ascending() {
        let rs = RowSet::new(["COLUMN_NAME", "ORDINAL_POSITION"])
            .with_row([Value::from("x"), Value::Int(1)])
            .with_row([Value::from("y"), Value::Int(1)])
            .with_row([Value::from("z"), Value::Null]);
        let mut object = MetadataObject::new("t", ObjectKind::Table);
        fetch_fields(&rs, &FieldFetchConfig::default(), &mut object);
        let ordinals: Vec<_> = object.fields.iter().map(|f| f.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
        assert_eq!(names(&object), vec!["x", "y", "z"]);
    }

    #[test]
    fn test_zero_based_ordinals_are_kept() {
        let rs = RowSet::new(["COLUMN_NAME", "ORDINAL_POSITION"])
            .with_row([Value::from("name"), Value::Int(1)])
            .with_row([Value::from("id"), Value::Int(0)])
            .with_row([Value::from("note"), Value::Null]);
        let mut object = MetadataObject::new("t", ObjectKind::Table);
        assert_eq!(fetch_fields(&rs, &FieldFetchConfig::default(), &mut object), 3);
        assert_eq!(names(&object), vec!["id", "name", "note"]);
        let ordinals: Vec<_> = object.fields.iter().map(|f| f.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2]);
    }

    #[test]
    fn test_reload_replaces_fields() {
        let mut object = MetadataObject::new("t", ObjectKind::Table)
            .with_fields(vec![Field::new("stale", 1)]);
        let rs = RowSet::new(["COLUMN_NAME"]).with_row(["fresh"]);
        fetch_fields(&rs, &FieldFetchConfig::default(), &mut object);
        assert_eq!(names(&object), vec!["fresh"]);

        let unnamed = RowSet::new(["SOMETHING_ELSE"]).with_row(["x"]);
        assert_eq!(fetch_fields(&unnamed, &FieldFetchConfig::default(), &mut object), 0);
        assert!(object.fields.is_empty());
    }

    #[test]
    fn test_sentinel_nullability_and_attributes() {
        let rs = RowSet::new([
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
            Value::from("name"),
            Value::Int(2),
            Value::from("YES"),
            Value::from("nvarchar"),
            Value::Int(50),
            Value::Null,
            Value::Null,
            Value::from("('')"),
        ]);
        let config = FieldFetchConfig {
            nullable: NullableRule {
                column: ColumnCandidates::from(["IS_NULLABLE"]),
                sentinel: Some("YES".to_string()),
            },
            server_type: ColumnCandidates::from(["DATA_TYPE"]),
            ..FieldFetchConfig::default()
        };
        let mut object = MetadataObject::new("t", ObjectKind::Table);
        fetch_fields(&rs, &config, &mut object);

        let id = object.field("id").unwrap();
        assert!(!id.nullable);
        assert_eq!(id.server_type, "int");
        assert_eq!(id.precision, Some(10));
        assert_eq!(id.size, None);

        let name = object.field("name").unwrap();
        assert!(name.nullable);
        assert_eq!(name.size, Some(50));
        assert_eq!(name.default_value.as_deref(), Some("('')"));
    }

    #[test]
    fn test_flag_nullability_defaults_to_true() {
        let rs = RowSet::new(["COLUMN_NAME", "NULLABLE"])
            .with_row([Value::from("a"), Value::Int(0)])
            .with_row([Value::from("b"), Value::Null]);
        let mut object = MetadataObject::new("t", ObjectKind::Table);
        fetch_fields(&rs, &FieldFetchConfig::default(), &mut object);
        assert!(!object.field("a").unwrap().nullable);
        assert!(object.field("b").unwrap().nullable);
    }

    #[test]
    fn test_fields_from_descriptors() {
        let columns = vec![
            ColumnDescriptor::new("id").with_type("int").with_nullable(false),
            ColumnDescriptor::new("amount").with_type("decimal").with_precision(10, 2),
            ColumnDescriptor::new("id"),
        ];
        let fields = fields_from_descriptors(&columns);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].ordinal, 2);
        assert_eq!(fields[1].scale, Some(2));
        assert!(!fields[0].nullable);
    }
}
