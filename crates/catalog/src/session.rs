// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Scoped connection session
//!
//! Wraps one connectivity adapter and enforces the rules every catalog
//! request follows:
//!
//! - **Lazy connect**: [`ActiveSession::ensure_connected`] opens the
//!   connection on first use and is idempotent afterwards.
//! - **Failure state**: an I/O error moves the session to
//!   [`SessionState::Failed`], closes the adapter and leaves it
//!   [`SessionState::Disconnected`]. There is no silent reconnect inside a
//!   request.
//! - **Catalog switch**: [`ActiveSession::with_catalog`] switches the active
//!   catalog, runs a body, and switches back on every return path.
//! - **Serialization**: [`ConnectionSession::lock`] hands out the only access
//!   to the adapter, so at most one operation is in flight per connection.
//!
//! ## State machine
//!
//! ```text
//! Disconnected -> Connecting -> Connected -> Disconnecting -> Disconnected
//!                                   |
//!                                   +-> Failed -> Disconnected
//! ```

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};
use unified_sql_metadata_model::{MetadataLevel, MetadataScope, SyntaxProvider};

use crate::adapter::{Command, ConnectionState, ConnectivityAdapter};
use crate::config::RestrictionLayout;
use crate::error::{AdapterError, CatalogError, CatalogResult, OptionalFetchError};
use crate::rowset::RowSet;

/// Session lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
    /// An I/O error occurred; observable only while the session tears down
    Failed,
}

/// A live connection shared between threads.
///
/// All access goes through [`ConnectionSession::lock`]; the guard must be
/// held for the whole of an operation (connect, restriction build, catalog
/// switch, fetch and restore).
pub struct ConnectionSession {
    inner: Mutex<ActiveSession>,
}

impl ConnectionSession {
    pub fn new(adapter: impl ConnectivityAdapter + 'static) -> Self {
        Self {
            inner: Mutex::new(ActiveSession::new(Some(Box::new(adapter)))),
        }
    }

    /// A session without a connection; every load fails with
    /// [`CatalogError::NoConnectionConfigured`] until one is supplied
    pub fn unconfigured() -> Self {
        Self {
            inner: Mutex::new(ActiveSession::new(None)),
        }
    }

    pub fn with_command_timeout(self, timeout: Option<Duration>) -> Self {
        self.lock().command_timeout = timeout;
        self
    }

    /// Exclusive access to the connection.
    ///
    /// A poisoned lock is recovered: the session state is updated before any
    /// call that could panic, so it stays consistent.
    pub fn lock(&self) -> MutexGuard<'_, ActiveSession> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock().state()
    }
}

impl std::fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("state", &self.state())
            .finish()
    }
}

/// The session as seen while holding the lock
pub struct ActiveSession {
    adapter: Option<Box<dyn ConnectivityAdapter>>,
    state: SessionState,
    last_failure: Option<String>,
    command_timeout: Option<Duration>,
    warnings: Vec<CatalogError>,
}

impl ActiveSession {
    fn new(adapter: Option<Box<dyn ConnectivityAdapter>>) -> Self {
        Self {
            adapter,
            state: SessionState::Disconnected,
            last_failure: None,
            command_timeout: None,
            warnings: Vec::new(),
        }
    }

    /// Supply (or replace) the connection; the previous one is closed
    pub fn set_adapter(&mut self, adapter: impl ConnectivityAdapter + 'static) {
        self.disconnect();
        self.adapter = Some(Box::new(adapter));
        self.state = SessionState::Disconnected;
        self.last_failure = None;
    }

    pub fn set_command_timeout(&mut self, timeout: Option<Duration>) {
        self.command_timeout = timeout;
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Message of the I/O error that last tore the connection down
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.adapter.is_some()
    }

    fn adapter_mut(&mut self) -> CatalogResult<&mut Box<dyn ConnectivityAdapter>> {
        self.adapter
            .as_mut()
            .ok_or(CatalogError::NoConnectionConfigured)
    }

    /// Connect unless already connected
    pub fn ensure_connected(&mut self) -> CatalogResult<()> {
        let adapter = self
            .adapter
            .as_mut()
            .ok_or(CatalogError::NoConnectionConfigured)?;

        match adapter.state() {
            ConnectionState::Open => {
                if self.state != SessionState::Connected {
                    debug!("Adapter already open, adopting connection");
                    self.state = SessionState::Connected;
                }
                return Ok(());
            }
            ConnectionState::Broken => {
                debug!("Adapter reports a broken connection, closing before reconnect");
                let _ = adapter.close();
            }
            ConnectionState::Closed => {}
        }

        self.state = SessionState::Connecting;
        match adapter.open() {
            Ok(()) => {
                info!("Connected to {}", adapter.description());
                self.state = SessionState::Connected;
                self.last_failure = None;
                Ok(())
            }
            Err(err) => {
                warn!("Failed to connect to {}: {}", adapter.description(), err);
                self.state = SessionState::Disconnected;
                self.last_failure = Some(err.to_string());
                Err(CatalogError::ConnectionFailed(err.to_string()))
            }
        }
    }

    /// Close the connection if it is open
    pub fn disconnect(&mut self) {
        let Some(adapter) = self.adapter.as_mut() else {
            return;
        };
        if self.state != SessionState::Connected && adapter.state() != ConnectionState::Open {
            self.state = SessionState::Disconnected;
            return;
        }
        self.state = SessionState::Disconnecting;
        if let Err(err) = adapter.close() {
            warn!("Error while closing connection: {}", err);
        }
        info!("Disconnected from {}", adapter.description());
        self.state = SessionState::Disconnected;
    }

    /// Catalog the connection currently operates in
    pub fn active_catalog(&self) -> Option<String> {
        self.adapter
            .as_ref()
            .and_then(|adapter| adapter.active_catalog())
            .filter(|name| !name.is_empty())
    }

    /// Tear the connection down after an I/O error
    fn note_adapter_error(&mut self, err: &AdapterError) {
        if !err.is_io() {
            return;
        }
        warn!("Connection failed: {}", err);
        self.state = SessionState::Failed;
        self.last_failure = Some(err.to_string());
        if let Some(adapter) = self.adapter.as_mut() {
            let _ = adapter.close();
        }
        self.state = SessionState::Disconnected;
    }

    /// Run `body` with `catalog` as the active catalog.
    ///
    /// Nothing is switched when `catalog` is empty or already active. The
    /// original catalog is restored on every return path; a failed restore
    /// is logged and kept in [`ActiveSession::take_warnings`] without
    /// replacing the body's result.
    ///
    /// A connection that reports no active catalog is never switched, since
    /// it could not be put back; `body` then runs unswitched and relies on
    /// the restrictions alone to scope its fetches.
    ///
    /// Backends that cannot switch run `body` in their current catalog. Such
    /// a backend may then answer for the wrong catalog; this cannot be told
    /// apart from an empty answer.
    pub fn with_catalog<T, F>(&mut self, catalog: Option<&str>, body: F) -> CatalogResult<T>
    where
        F: FnOnce(&mut ActiveSession) -> CatalogResult<T>,
    {
        let target = match catalog {
            Some(name) if !name.is_empty() => name,
            _ => return body(self),
        };
        self.ensure_connected()?;

        let original = match self.active_catalog() {
            Some(original) if original == target => return body(self),
            Some(original) => original,
            None => {
                debug!(
                    "No active catalog to restore, querying '{}' by restrictions only",
                    target
                );
                return body(self);
            }
        };

        match self.adapter_mut()?.change_catalog(target) {
            Ok(()) => debug!("Switched active catalog to '{}'", target),
            Err(AdapterError::CatalogSwitchUnsupported) => {
                debug!(
                    "Backend cannot switch catalogs, querying '{}' from the current one",
                    target
                );
                return body(self);
            }
            Err(err) => {
                self.note_adapter_error(&err);
                return Err(CatalogError::CatalogSwitchFailed {
                    catalog: target.to_string(),
                    message: err.to_string(),
                });
            }
        }

        let result = body(self);
        self.restore_catalog(&original);
        result
    }

    fn restore_catalog(&mut self, original: &str) {
        let restored = match self.adapter.as_mut() {
            Some(adapter) if self.state == SessionState::Connected => adapter
                .change_catalog(original)
                .map_err(|err| err.to_string()),
            _ => Err("connection is not open".to_string()),
        };
        match restored {
            Ok(()) => debug!("Restored active catalog '{}'", original),
            Err(message) => {
                warn!("Failed to restore catalog '{}': {}", original, message);
                self.warnings.push(CatalogError::CatalogSwitchFailed {
                    catalog: original.to_string(),
                    message,
                });
            }
        }
    }

    /// Execute a statement as a primary query
    pub fn execute_query(&mut self, sql: &str, schema_only: bool) -> CatalogResult<RowSet> {
        self.ensure_connected()?;
        let command = Command::new(sql)
            .with_timeout(self.command_timeout)
            .with_schema_only(schema_only);
        debug!("Executing query (schema_only={}): {}", schema_only, sql);
        let result = self.adapter_mut()?.execute(&command);
        result.map_err(|err| {
            self.note_adapter_error(&err);
            CatalogError::QueryExecutionFailed {
                message: err.to_string(),
                sql: sql.to_string(),
            }
        })
    }

    fn fetch_raw(
        &mut self,
        collection: &str,
        restrictions: &[Option<String>],
    ) -> CatalogResult<Result<RowSet, AdapterError>> {
        self.ensure_connected()?;
        debug!("Fetching collection '{}' with {:?}", collection, restrictions);
        let result = self
            .adapter_mut()?
            .fetch_catalog_collection(collection, restrictions);
        if let Err(err) = &result {
            self.note_adapter_error(err);
        }
        Ok(result)
    }

    /// Fetch a catalog collection whose failure must reach the caller
    pub fn fetch_collection(
        &mut self,
        collection: &str,
        restrictions: &[Option<String>],
    ) -> CatalogResult<RowSet> {
        self.fetch_raw(collection, restrictions)?
            .map_err(|err| CatalogError::CollectionFetchFailed {
                collection: collection.to_string(),
                message: err.to_string(),
            })
    }

    /// Fetch an enrichment collection.
    ///
    /// Only a missing connection is an error here; backend failures come
    /// back as an [`OptionalFetchError`] for the caller to record.
    pub fn fetch_optional_collection(
        &mut self,
        collection: &str,
        restrictions: &[Option<String>],
    ) -> CatalogResult<Result<RowSet, OptionalFetchError>> {
        let result = self.fetch_raw(collection, restrictions)?;
        Ok(result.map_err(|err| {
            let err = OptionalFetchError::from_adapter(collection, err);
            debug!("{}", err);
            err
        }))
    }

    /// Drain non-fatal problems recorded since the last call
    pub fn take_warnings(&mut self) -> Vec<CatalogError> {
        std::mem::take(&mut self.warnings)
    }
}

/// First level in `required` that the dialect supports but `scope` leaves
/// unnamed. A fetch under such a scope must be abandoned rather than run
/// unscoped.
pub fn missing_ancestor(
    dialect: &dyn SyntaxProvider,
    scope: &MetadataScope,
    required: &[MetadataLevel],
) -> Option<MetadataLevel> {
    required
        .iter()
        .copied()
        .find(|level| supports_level(dialect, *level) && scope_name(scope, *level).is_none())
}

fn supports_level(dialect: &dyn SyntaxProvider, level: MetadataLevel) -> bool {
    match level {
        MetadataLevel::Database => dialect.supports_catalogs(),
        MetadataLevel::Schema => dialect.supports_schemas(),
        _ => true,
    }
}

fn scope_name(scope: &MetadataScope, level: MetadataLevel) -> Option<&String> {
    match level {
        MetadataLevel::Database => scope.database.as_ref(),
        MetadataLevel::Schema => scope.schema.as_ref(),
        MetadataLevel::Object => scope.object.as_ref(),
        _ => None,
    }
}

/// Build the restriction vector for a scoped collection fetch.
///
/// Returns `None` when [`missing_ancestor`] finds an unknown required
/// level. Known scope parts are then placed at their layout slots; unknown
/// ones stay `None` ("no filter").
pub fn build_restrictions(
    dialect: &dyn SyntaxProvider,
    scope: &MetadataScope,
    layout: &RestrictionLayout,
    required: &[MetadataLevel],
) -> Option<Vec<Option<String>>> {
    if let Some(level) = missing_ancestor(dialect, scope, required) {
        debug!(
            "Abandoning fetch under '{}': {:?} is supported but unknown",
            scope, level
        );
        return None;
    }

    let mut restrictions = vec![None; layout.len];
    for level in [
        MetadataLevel::Database,
        MetadataLevel::Schema,
        MetadataLevel::Object,
    ] {
        if !supports_level(dialect, level) {
            continue;
        }
        if let (Some(slot), Some(name)) = (layout.slot(level), scope_name(scope, level))
            && let Some(cell) = restrictions.get_mut(slot)
        {
            *cell = Some(name.clone());
        }
    }
    Some(restrictions)
}
