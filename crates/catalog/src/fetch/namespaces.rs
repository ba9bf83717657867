// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Namespace fetcher
//!
//! Turns name listings into `Database`/`Schema` entities. Names can come
//! from row-sets or be pooled from several collections first; either way
//! they are materialized in one pass.

use tracing::debug;
use unified_sql_metadata_model::{MetadataList, Namespace};

use super::mapper::RowMapper;
use crate::config::NamespaceFetchConfig;
use crate::rowset::RowSet;

/// Append the names found in `rowset` to `names`.
///
/// NULL rows are skipped and names already pooled are not repeated, so the
/// pool keeps row order across several collections.
pub fn collect_names(rowset: &RowSet, config: &NamespaceFetchConfig, names: &mut Vec<String>) {
    let mapper = RowMapper::new(rowset, config.trim_strings);
    let Some(column) = mapper.resolve(&config.name) else {
        debug!(
            "No name column among {:?} in namespace listing",
            config.name.names()
        );
        return;
    };
    for row in 0..mapper.row_count() {
        if let Some(name) = mapper.text(row, Some(column))
            && !names.contains(&name)
        {
            names.push(name);
        }
    }
}

/// Materialize pooled names into `list`, returning how many were added.
///
/// A pool holding a single empty name means the backend has no real
/// namespace at this level; nothing is created then.
pub fn load_names<N: Namespace>(list: &mut MetadataList<N>, names: &[String]) -> usize {
    if names.len() <= 1 && names.iter().all(|n| n.is_empty()) {
        return 0;
    }
    names
        .iter()
        .filter(|name| list.insert(N::named((*name).clone())))
        .count()
}

/// Collect and materialize in one step
pub fn fetch_namespaces<N: Namespace>(
    rowset: &RowSet,
    config: &NamespaceFetchConfig,
    list: &mut MetadataList<N>,
) -> usize {
    let mut names = Vec::new();
    collect_names(rowset, config, &mut names);
    load_names(list, &names)
}

/// Mark `name` as the default sibling, creating it if needed.
///
/// Other siblings lose their default flag so at most one default remains.
/// Returns `true` when the entity had to be created.
pub fn mark_sole_default<N: Namespace>(list: &mut MetadataList<N>, name: &str) -> bool {
    for item in list.iter_mut() {
        if item.name() != name {
            item.set_default(false);
        }
    }
    let (item, created) = list.find_or_insert_with(name, || N::named(name.to_string()));
    item.set_default(true);
    created
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowset::Value;
    use unified_sql_metadata_model::{Database, Schema};

    fn listing(names: &[Option<&str>]) -> RowSet {
        let mut rs = RowSet::new(["TABLE_SCHEMA", "TABLE_NAME"]);
        for name in names {
            rs.push_row([Value::from(*name), Value::from("t")]);
        }
        rs
    }

    #[test]
    fn test_duplicates_and_nulls_skipped() {
        let rs = listing(&[Some("dbo"), None, Some("sales"), Some("dbo")]);
        let mut schemas: MetadataList<Schema> = MetadataList::new();
        let added = fetch_namespaces(&rs, &NamespaceFetchConfig::schemas(), &mut schemas);
        assert_eq!(added, 2);
        assert_eq!(schemas.names(), vec!["dbo", "sales"]);
    }

    #[test]
    fn test_reload_merges() {
        let rs = listing(&[Some("dbo"), Some("sales")]);
        let config = NamespaceFetchConfig::schemas();
        let mut schemas: MetadataList<Schema> = MetadataList::new();
        fetch_namespaces(&rs, &config, &mut schemas);
        let added = fetch_namespaces(&rs, &config, &mut schemas);
        assert_eq!(added, 0);
        assert_eq!(schemas.len(), 2);
    }

    #[test]
    fn test_single_empty_name_is_not_materialized() {
        let rs = listing(&[Some(""), Some("")]);
        let mut schemas: MetadataList<Schema> = MetadataList::new();
        assert_eq!(fetch_namespaces(&rs, &NamespaceFetchConfig::schemas(), &mut schemas), 0);
        assert!(schemas.is_empty());
    }

    #[test]
    fn test_names_pooled_across_collections() {
        let config = NamespaceFetchConfig::schemas();
        let mut names = Vec::new();
        collect_names(&listing(&[Some("dbo")]), &config, &mut names);
        collect_names(&listing(&[Some("views_only"), Some("dbo")]), &config, &mut names);
        assert_eq!(names, vec!["dbo".to_string(), "views_only".to_string()]);
    }

    #[test]
    fn test_missing_name_column_yields_nothing() {
        let rs = RowSet::new(["OTHER"]).with_row([Value::from("x")]);
        let mut databases: MetadataList<Database> = MetadataList::new();
        assert_eq!(fetch_namespaces(&rs, &NamespaceFetchConfig::databases(), &mut databases), 0);
    }

    #[test]
    fn test_mark_sole_default() {
        let mut databases: MetadataList<Database> = MetadataList::new();
        databases.insert(Database::new("a"));
        assert!(!mark_sole_default(&mut databases, "a"));
        assert!(mark_sole_default(&mut databases, "b"));
        let defaults: Vec<_> = databases.iter().filter(|d| d.default).map(|d| d.name.as_str()).collect();
        assert_eq!(defaults, vec!["b"]);
    }
}
