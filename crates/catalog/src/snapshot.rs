// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Static snapshot adapter
//!
//! A [`ConnectivityAdapter`] answering from a predefined catalog snapshot
//! instead of a live database. Snapshots are plain YAML or JSON, so a
//! backend's catalog collections can be captured once and replayed offline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use unified_sql_metadata_catalog::{CatalogSnapshot, ConnectionSession, StaticAdapter};
//!
//! let snapshot = CatalogSnapshot::from_yaml_str(&std::fs::read_to_string("shop.yaml")?)?;
//! let session = ConnectionSession::new(StaticAdapter::new(snapshot));
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapter::{Command, ConnectionState, ConnectivityAdapter};
use crate::error::{AdapterError, AdapterResult, CatalogResult};
use crate::rowset::RowSet;

/// One captured catalog collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEntry {
    pub name: String,
    /// Only visible while this catalog is active; `None` means always visible
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    /// Column filtered by each restriction slot; `None` ignores the slot
    #[serde(default)]
    pub restriction_columns: Vec<Option<String>>,
    pub rowset: RowSet,
}

/// One captured statement result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryEntry {
    pub sql: String,
    pub rowset: RowSet,
}

/// Serializable catalog snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_catalog: Option<String>,
    /// Catalogs the connection may switch to
    #[serde(default)]
    pub catalogs: Vec<String>,
    #[serde(default = "default_switchable")]
    pub switchable: bool,
    #[serde(default)]
    pub collections: Vec<CollectionEntry>,
    #[serde(default)]
    pub queries: Vec<QueryEntry>,
}

fn default_switchable() -> bool {
    true
}

impl CatalogSnapshot {
    pub fn new() -> Self {
        Self {
            switchable: true,
            ..Self::default()
        }
    }

    pub fn with_active_catalog(mut self, catalog: impl Into<String>) -> Self {
        let catalog = catalog.into();
        if !self.catalogs.contains(&catalog) {
            self.catalogs.push(catalog.clone());
        }
        self.active_catalog = Some(catalog);
        self
    }

    pub fn with_catalogs<I, S>(mut self, catalogs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for catalog in catalogs {
            let catalog = catalog.into();
            if !self.catalogs.contains(&catalog) {
                self.catalogs.push(catalog);
            }
        }
        self
    }

    /// Backend refuses to change catalogs
    pub fn without_catalog_switch(mut self) -> Self {
        self.switchable = false;
        self
    }

    /// Add a collection; `restriction_columns[i]` is filtered by restriction slot `i`
    pub fn with_collection(mut self, name: &str, restriction_columns: &[Option<&str>], rowset: RowSet) -> Self {
        self.collections.push(CollectionEntry {
            name: name.to_string(),
            catalog: None,
            restriction_columns: restriction_columns
                .iter()
                .map(|c| c.map(str::to_string))
                .collect(),
            rowset,
        });
        self
    }

    /// Add a collection only visible while `catalog` is active
    pub fn with_catalog_collection(
        mut self,
        catalog: &str,
        name: &str,
        restriction_columns: &[Option<&str>],
        rowset: RowSet,
    ) -> Self {
        self = self.with_collection(name, restriction_columns, rowset);
        if let Some(entry) = self.collections.last_mut() {
            entry.catalog = Some(catalog.to_string());
        }
        self
    }

    pub fn with_query(mut self, sql: &str, rowset: RowSet) -> Self {
        self.queries.push(QueryEntry {
            sql: sql.to_string(),
            rowset,
        });
        self
    }

    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Adapter replaying a [`CatalogSnapshot`]
#[derive(Debug, Clone)]
pub struct StaticAdapter {
    snapshot: CatalogSnapshot,
    active_catalog: Option<String>,
    state: ConnectionState,
}

impl StaticAdapter {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        let active_catalog = snapshot.active_catalog.clone();
        Self {
            snapshot,
            active_catalog,
            state: ConnectionState::Closed,
        }
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    fn ensure_open(&self) -> AdapterResult<()> {
        match self.state {
            ConnectionState::Open => Ok(()),
            _ => Err(AdapterError::Io("connection is not open".to_string())),
        }
    }

    fn visible(&self, entry: &CollectionEntry) -> bool {
        match &entry.catalog {
            Some(catalog) => self.active_catalog.as_ref() == Some(catalog),
            None => true,
        }
    }
}

impl ConnectivityAdapter for StaticAdapter {
    fn open(&mut self) -> AdapterResult<()> {
        self.state = ConnectionState::Open;
        Ok(())
    }

    fn close(&mut self) -> AdapterResult<()> {
        self.state = ConnectionState::Closed;
        self.active_catalog = self.snapshot.active_catalog.clone();
        Ok(())
    }

    fn state(&self) -> ConnectionState {
        self.state
    }

    fn active_catalog(&self) -> Option<String> {
        self.active_catalog.clone()
    }

    fn change_catalog(&mut self, name: &str) -> AdapterResult<()> {
        self.ensure_open()?;
        if !self.snapshot.switchable {
            return Err(AdapterError::CatalogSwitchUnsupported);
        }
        if !self.snapshot.catalogs.iter().any(|c| c == name) {
            return Err(AdapterError::Query(format!("unknown database '{}'", name)));
        }
        self.active_catalog = Some(name.to_string());
        Ok(())
    }

    fn execute(&mut self, command: &Command) -> AdapterResult<RowSet> {
        self.ensure_open()?;
        let sql = command.sql.trim();
        let entry = self
            .snapshot
            .queries
            .iter()
            .find(|q| q.sql.trim().eq_ignore_ascii_case(sql))
            .ok_or_else(|| AdapterError::Query(format!("cannot execute '{}'", sql)))?;

        let mut rowset = entry.rowset.clone();
        if command.schema_only {
            rowset.rows.clear();
        }
        Ok(rowset)
    }

    fn fetch_catalog_collection(
        &mut self,
        collection: &str,
        restrictions: &[Option<String>],
    ) -> AdapterResult<RowSet> {
        self.ensure_open()?;
        let mut entries = self
            .snapshot
            .collections
            .iter()
            .filter(|e| e.name.eq_ignore_ascii_case(collection))
            .peekable();
        let Some(first) = entries.peek().copied() else {
            return Err(AdapterError::UnsupportedCollection(collection.to_string()));
        };

        let Some(entry) = entries.find(|e| self.visible(e)) else {
            debug!(
                "Collection '{}' has no rows in catalog {:?}",
                collection, self.active_catalog
            );
            return Ok(RowSet {
                columns: first.rowset.columns.clone(),
                rows: Vec::new(),
            });
        };

        let mut rowset = entry.rowset.clone();
        let filters: Vec<(usize, &str)> = restrictions
            .iter()
            .enumerate()
            .filter_map(|(slot, value)| {
                let value = value.as_deref()?;
                let column = entry.restriction_columns.get(slot)?.as_deref()?;
                Some((rowset.column_index(column)?, value))
            })
            .collect();
        rowset.retain_rows(|row| {
            filters.iter().all(|(column, expected)| {
                row.get(*column).and_then(|v| v.as_text()).as_deref() == Some(*expected)
            })
        });
        Ok(rowset)
    }

    fn description(&self) -> String {
        format!(
            "static snapshot ({} collections)",
            self.snapshot.collections.len()
        )
    }
}
