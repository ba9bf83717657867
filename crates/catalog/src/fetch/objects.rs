// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Object fetcher
//!
//! Turns a table/view/procedure listing into `MetadataObject` entities,
//! classifying each row through the configured tag table.

use unified_sql_metadata_model::{MetadataList, MetadataObject, ObjectKind};

use super::mapper::{RowMapper, parse_bool};
use crate::config::{ObjectFetchConfig, SystemFlagRule};
use crate::rowset::RowSet;

/// Merge the objects listed in `rowset` into `objects`.
///
/// Rows without a name are dropped; rows with a missing or unknown tag get
/// the configured default kind. Existing objects keep their kind; only a
/// missing description is filled in. Returns how many objects were added.
pub fn fetch_objects(
    rowset: &RowSet,
    config: &ObjectFetchConfig,
    objects: &mut MetadataList<MetadataObject>,
) -> usize {
    let mapper = RowMapper::new(rowset, config.trim_strings);
    let Some(name_column) = mapper.resolve(&config.name) else {
        return 0;
    };
    let kind_column = mapper.resolve(&config.kind);
    let description_column = mapper.resolve(&config.description);
    let system_column = config
        .system_flag
        .as_ref()
        .and_then(|rule| mapper.resolve(&rule.column));

    let mut added = 0;
    for row in 0..mapper.row_count() {
        let Some(name) = mapper.text(row, Some(name_column)).filter(|n| !n.is_empty()) else {
            continue;
        };

        let mut kind = classify_tag(config, mapper.text(row, kind_column).as_deref());
        let system = match (&config.system_flag, system_column) {
            (Some(rule), Some(_)) => mapper
                .text(row, system_column)
                .is_some_and(|value| flag_matches(rule, &value)),
            _ => false,
        };
        if system {
            kind = kind.to_system();
        }
        let description = mapper.text(row, description_column).filter(|d| !d.is_empty());

        let (object, created) =
            objects.find_or_insert_with(&name, || MetadataObject::new(name.clone(), kind));
        if created {
            object.system = system || kind.is_system();
            added += 1;
        }
        if object.description.is_none() {
            object.description = description;
        }
    }
    added
}

fn flag_matches(rule: &SystemFlagRule, value: &str) -> bool {
    if value.trim().eq_ignore_ascii_case(rule.value.trim()) {
        return true;
    }
    matches!(
        (parse_bool(value), parse_bool(&rule.value)),
        (Some(a), Some(b)) if a == b
    )
}

/// Kind for a raw tag; missing or unknown tags get the default kind
pub fn classify_tag(config: &ObjectFetchConfig, tag: Option<&str>) -> ObjectKind {
    tag.and_then(|t| config.classification.classify(t))
        .unwrap_or(config.default_kind)
}
