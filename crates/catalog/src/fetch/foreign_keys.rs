// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Foreign-key fetcher
//!
//! Groups a foreign-key column listing into composite keys owned by the
//! referencing object, and lists objects that reference a given one.

use unified_sql_metadata_model::{ForeignKey, ForeignKeyColumn, MetadataObject, QualifiedName};

use super::mapper::RowMapper;
use crate::config::{ForeignKeyFetchConfig, ReferencingFetchConfig};
use crate::rowset::RowSet;

struct KeyGroup {
    key: ForeignKey,
    last_ordinal: Option<i64>,
}

/// Replace `object`'s foreign keys with the keys listed in `rowset`.
///
/// Rows sharing a key identifier form one key. Without an identifier,
/// contiguous rows pointing at the same object with strictly increasing
/// ordinals form one key; an ordinal that does not increase starts a new
/// one. Referenced objects are kept as names and resolved lazily.
/// Returns the number of keys loaded.
pub fn fetch_foreign_keys(
    rowset: &RowSet,
    config: &ForeignKeyFetchConfig,
    object: &mut MetadataObject,
) -> usize {
    object.replace_foreign_keys(Vec::new());

    let mapper = RowMapper::new(rowset, config.trim_strings);
    let (Some(pk_object), Some(pk_field), Some(fk_field)) = (
        mapper.resolve(&config.pk_object),
        mapper.resolve(&config.pk_field),
        mapper.resolve(&config.fk_field),
    ) else {
        return 0;
    };
    let key_id_column = mapper.resolve(&config.key_id);
    let pk_database = mapper.resolve(&config.pk_database);
    let pk_schema = mapper.resolve(&config.pk_schema);
    let ordinal_column = mapper.resolve(&config.ordinal);

    let non_empty = |value: Option<String>| value.filter(|v| !v.is_empty());

    let mut groups: Vec<KeyGroup> = Vec::new();
    for row in 0..mapper.row_count() {
        let (Some(referenced_object), Some(referenced_field), Some(referencing_field)) = (
            non_empty(mapper.text(row, Some(pk_object))),
            non_empty(mapper.text(row, Some(pk_field))),
            non_empty(mapper.text(row, Some(fk_field))),
        ) else {
            continue;
        };
        let referenced = QualifiedName {
            database: non_empty(mapper.text(row, pk_database)),
            schema: non_empty(mapper.text(row, pk_schema)),
            object: referenced_object,
        };
        let key_id = non_empty(mapper.text(row, key_id_column));
        let ordinal = mapper.int(row, ordinal_column);

        let index = match &key_id {
            Some(id) => groups
                .iter()
                .position(|g| g.key.key_id.as_deref() == Some(id.as_str())),
            None => groups.last().and_then(|current| {
                let continues = current.key.key_id.is_none()
                    && current.key.referenced == referenced
                    && matches!((current.last_ordinal, ordinal), (Some(last), Some(next)) if next > last);
                continues.then_some(groups.len() - 1)
            }),
        };
        let group = match index {
            Some(index) => &mut groups[index],
            None => {
                let mut key = ForeignKey::new(referenced);
                key.key_id = key_id;
                groups.push(KeyGroup {
                    key,
                    last_ordinal: None,
                });
                let last = groups.len() - 1;
                &mut groups[last]
            }
        };

        let column_ordinal = ordinal.unwrap_or(group.key.columns.len() as i64 + 1);
        group.key.columns.push(ForeignKeyColumn {
            ordinal: column_ordinal,
            referencing_field,
            referenced_field,
        });
        group.last_ordinal = ordinal;
    }

    let keys: Vec<ForeignKey> = groups
        .into_iter()
        .map(|mut group| {
            group.key.columns.sort_by_key(|c| c.ordinal);
            group.key
        })
        .collect();
    let count = keys.len();
    object.replace_foreign_keys(keys);
    count
}

/// Qualified names of the objects listed as referencing, without repeats
pub fn fetch_referencing(rowset: &RowSet, config: &ReferencingFetchConfig) -> Vec<QualifiedName> {
    let mapper = RowMapper::new(rowset, config.trim_strings);
    let Some(object_column) = mapper.resolve(&config.object) else {
        return Vec::new();
    };
    let database_column = mapper.resolve(&config.database);
    let schema_column = mapper.resolve(&config.schema);

    let mut names: Vec<QualifiedName> = Vec::new();
    for row in 0..mapper.row_count() {
        let Some(object) = mapper.text(row, Some(object_column)).filter(|o| !o.is_empty()) else {
            continue;
        };
        let name = QualifiedName {
            database: mapper.text(row, database_column).filter(|d| !d.is_empty()),
            schema: mapper.text(row, schema_column).filter(|s| !s.is_empty()),
            object,
        };
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}
