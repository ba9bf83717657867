// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! Mock connectivity adapter for testing
//!
//! Serves row-sets from a [`CatalogSnapshot`] and records every call so tests
//! can assert what the loader asked the backend for. Failures and latency
//! can be injected up front through [`MockAdapterBuilder`] or later through
//! the [`MockHandle`] that stays with the test.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use tracing::debug;
use unified_sql_metadata_catalog::{
    AdapterError, AdapterResult, CatalogSnapshot, Command, ConnectionState, ConnectivityAdapter,
    RowSet, StaticAdapter,
};

/// One recorded adapter call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Open,
    Close,
    ChangeCatalog(String),
    Execute {
        sql: String,
        schema_only: bool,
    },
    Fetch {
        collection: String,
        restrictions: Vec<Option<String>>,
        /// Active catalog when the fetch ran
        catalog: Option<String>,
    },
}

#[derive(Debug, Default)]
struct Failures {
    open: Option<AdapterError>,
    queries: Option<AdapterError>,
    collections: HashMap<String, AdapterError>,
    catalog_switches: HashMap<String, AdapterError>,
}

#[derive(Debug, Default)]
struct Shared {
    calls: Mutex<Vec<MockCall>>,
    failures: Mutex<Failures>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    opens: AtomicUsize,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Scriptable in-memory adapter
#[derive(Debug)]
pub struct MockAdapter {
    inner: StaticAdapter,
    shared: Arc<Shared>,
    latency: Option<Duration>,
    broken: bool,
}

impl MockAdapter {
    fn record(&self, call: MockCall) {
        guard(&self.shared.calls).push(call);
    }

    /// Track overlapping calls around `body`
    fn tracked<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        let now = self.shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            thread::sleep(latency);
        }
        let result = body(self);
        self.shared.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn fail_with(&mut self, err: AdapterError) -> AdapterError {
        if err.is_io() {
            self.broken = true;
        }
        err
    }
}

impl ConnectivityAdapter for MockAdapter {
    fn open(&mut self) -> AdapterResult<()> {
        self.record(MockCall::Open);
        if let Some(err) = guard(&self.shared.failures).open.clone() {
            return Err(err);
        }
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        self.broken = false;
        self.inner.open()
    }

    fn close(&mut self) -> AdapterResult<()> {
        self.record(MockCall::Close);
        self.broken = false;
        self.inner.close()
    }

    fn state(&self) -> ConnectionState {
        if self.broken {
            ConnectionState::Broken
        } else {
            self.inner.state()
        }
    }

    fn active_catalog(&self) -> Option<String> {
        self.inner.active_catalog()
    }

    fn change_catalog(&mut self, name: &str) -> AdapterResult<()> {
        self.record(MockCall::ChangeCatalog(name.to_string()));
        let injected = guard(&self.shared.failures).catalog_switches.get(name).cloned();
        if let Some(err) = injected {
            return Err(self.fail_with(err));
        }
        self.inner.change_catalog(name)
    }

    fn execute(&mut self, command: &Command) -> AdapterResult<RowSet> {
        self.record(MockCall::Execute {
            sql: command.sql.clone(),
            schema_only: command.schema_only,
        });
        self.tracked(|adapter| {
            let injected = guard(&adapter.shared.failures).queries.clone();
            if let Some(err) = injected {
                return Err(adapter.fail_with(err));
            }
            adapter.inner.execute(command)
        })
    }

    fn fetch_catalog_collection(
        &mut self,
        collection: &str,
        restrictions: &[Option<String>],
    ) -> AdapterResult<RowSet> {
        self.record(MockCall::Fetch {
            collection: collection.to_string(),
            restrictions: restrictions.to_vec(),
            catalog: self.inner.active_catalog(),
        });
        self.tracked(|adapter| {
            let injected = guard(&adapter.shared.failures)
                .collections
                .get(&collection.to_ascii_lowercase())
                .cloned();
            if let Some(err) = injected {
                debug!("Mock adapter failing '{}' with {}", collection, err);
                return Err(adapter.fail_with(err));
            }
            adapter.inner.fetch_catalog_collection(collection, restrictions)
        })
    }

    fn description(&self) -> String {
        "mock adapter".to_string()
    }
}

/// Test-side view of a [`MockAdapter`] after it moved into a session
#[derive(Debug, Clone)]
pub struct MockHandle {
    shared: Arc<Shared>,
}

impl MockHandle {
    /// Every call recorded so far
    pub fn calls(&self) -> Vec<MockCall> {
        guard(&self.shared.calls).clone()
    }

    pub fn clear_calls(&self) {
        guard(&self.shared.calls).clear();
    }

    /// Recorded collection fetches as `(collection, restrictions, catalog)`
    pub fn fetches(&self) -> Vec<(String, Vec<Option<String>>, Option<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Fetch {
                    collection,
                    restrictions,
                    catalog,
                } => Some((collection, restrictions, catalog)),
                _ => None,
            })
            .collect()
    }

    /// Recorded statements
    pub fn queries(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::Execute { sql, .. } => Some(sql),
                _ => None,
            })
            .collect()
    }

    /// Recorded catalog switches, in order
    pub fn catalog_switches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                MockCall::ChangeCatalog(name) => Some(name),
                _ => None,
            })
            .collect()
    }

    /// Number of backend round trips (fetches and statements)
    pub fn round_trips(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, MockCall::Fetch { .. } | MockCall::Execute { .. }))
            .count()
    }

    /// Successful opens
    pub fn opens(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in flight at once
    pub fn max_concurrency(&self) -> usize {
        self.shared.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn fail_collection(&self, collection: &str, err: AdapterError) {
        guard(&self.shared.failures)
            .collections
            .insert(collection.to_ascii_lowercase(), err);
    }

    pub fn fail_catalog_switch(&self, catalog: &str, err: AdapterError) {
        guard(&self.shared.failures)
            .catalog_switches
            .insert(catalog.to_string(), err);
    }

    pub fn fail_queries(&self, err: AdapterError) {
        guard(&self.shared.failures).queries = Some(err);
    }

    pub fn fail_open(&self, err: AdapterError) {
        guard(&self.shared.failures).open = Some(err);
    }

    /// Remove every injected failure
    pub fn clear_failures(&self) {
        *guard(&self.shared.failures) = Failures::default();
    }
}

/// Builder for creating mock adapters with a fluent API
#[derive(Debug, Default)]
pub struct MockAdapterBuilder {
    snapshot: CatalogSnapshot,
    latency: Option<Duration>,
    failures: Failures,
}

impl MockAdapterBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self {
            snapshot: CatalogSnapshot::new(),
            ..Self::default()
        }
    }

    /// Serve everything from `snapshot`
    pub fn with_snapshot(mut self, snapshot: CatalogSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn with_collection(mut self, name: &str, restriction_columns: &[Option<&str>], rowset: RowSet) -> Self {
        self.snapshot = self.snapshot.with_collection(name, restriction_columns, rowset);
        self
    }

    pub fn with_query(mut self, sql: &str, rowset: RowSet) -> Self {
        self.snapshot = self.snapshot.with_query(sql, rowset);
        self
    }

    /// Sleep this long inside every fetch and statement
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn failing_collection(mut self, collection: &str, err: AdapterError) -> Self {
        self.failures
            .collections
            .insert(collection.to_ascii_lowercase(), err);
        self
    }

    pub fn failing_catalog_switch(mut self, catalog: &str, err: AdapterError) -> Self {
        self.failures.catalog_switches.insert(catalog.to_string(), err);
        self
    }

    pub fn failing_open(mut self, err: AdapterError) -> Self {
        self.failures.open = Some(err);
        self
    }

    /// Build the adapter and the handle that observes it
    pub fn build(self) -> (MockAdapter, MockHandle) {
        let shared = Arc::new(Shared {
            failures: Mutex::new(self.failures),
            ..Shared::default()
        });
        let adapter = MockAdapter {
            inner: StaticAdapter::new(self.snapshot),
            shared: Arc::clone(&shared),
            latency: self.latency,
            broken: false,
        };
        (adapter, MockHandle { shared })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> RowSet {
        RowSet::new(["TABLE_CAT", "TABLE_NAME"])
            .with_row(["shop", "orders"])
            .with_row(["hr", "staff"])
    }

    #[test]
    fn test_records_fetches() {
        let (mut adapter, handle) = MockAdapterBuilder::new()
            .with_collection("Tables", &[Some("TABLE_CAT")], tables())
            .build();
        adapter.open().unwrap();

        let rows = adapter
            .fetch_catalog_collection("Tables", &[Some("hr".to_string())])
            .unwrap();
        assert_eq!(rows.row_count(), 1);
        assert_eq!(handle.opens(), 1);
        assert_eq!(
            handle.fetches(),
            vec![("Tables".to_string(), vec![Some("hr".to_string())], None)]
        );
        assert_eq!(handle.round_trips(), 1);
        assert_eq!(handle.max_concurrency(), 1);
    }

    #[test]
    fn test_injected_io_failure_breaks_connection() {
        let (mut adapter, handle) = MockAdapterBuilder::new()
            .with_collection("Tables", &[], tables())
            .build();
        adapter.open().unwrap();

        handle.fail_collection("tables", AdapterError::Io("reset".to_string()));
        assert!(adapter.fetch_catalog_collection("Tables", &[]).is_err());
        assert_eq!(adapter.state(), ConnectionState::Broken);

        handle.clear_failures();
        adapter.close().unwrap();
        adapter.open().unwrap();
        assert!(adapter.fetch_catalog_collection("Tables", &[]).is_ok());
        assert_eq!(handle.opens(), 2);
    }

    #[test]
    fn test_failing_open() {
        let (mut adapter, handle) = MockAdapterBuilder::new()
            .failing_open(AdapterError::Io("refused".to_string()))
            .build();
        assert!(adapter.open().is_err());
        assert_eq!(handle.opens(), 0);
        assert_eq!(handle.calls(), vec![MockCall::Open]);
    }
}
