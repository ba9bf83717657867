// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Connectivity adapter
//!
//! The capability interface every backend driver implements. The
//! normalization engine depends only on this trait, never on a concrete
//! backend.
//!
//! Calls are synchronous and block the calling thread. An adapter is not
//! expected to support overlapping calls; [`ConnectionSession`](crate::ConnectionSession)
//! serializes access.

use std::time::Duration;

use crate::error::AdapterResult;
use crate::rowset::RowSet;

/// Physical connection state as reported by the adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Open,
    /// The connection was lost and must be reopened
    Broken,
}

/// A statement prepared for execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub sql: String,
    /// Forwarded to the backend; `None` uses the driver default
    pub timeout: Option<Duration>,
    /// Only the result schema is requested, no rows
    pub schema_only: bool,
}

impl Command {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            timeout: None,
            schema_only: false,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_schema_only(mut self, schema_only: bool) -> Self {
        self.schema_only = schema_only;
        self
    }
}

/// Backend connectivity interface
pub trait ConnectivityAdapter: Send {
    /// Open the physical connection
    fn open(&mut self) -> AdapterResult<()>;

    /// Close the physical connection
    fn close(&mut self) -> AdapterResult<()>;

    fn state(&self) -> ConnectionState;

    /// Catalog the connection currently operates in, if the backend has one
    fn active_catalog(&self) -> Option<String>;

    /// Make `name` the active catalog.
    ///
    /// Backends that cannot switch return [`AdapterError::CatalogSwitchUnsupported`](crate::AdapterError::CatalogSwitchUnsupported).
    fn change_catalog(&mut self, name: &str) -> AdapterResult<()>;

    /// Execute a statement
    fn execute(&mut self, command: &Command) -> AdapterResult<RowSet>;

    /// Fetch a named catalog collection filtered by a restriction vector.
    ///
    /// A `None` slot means "no filter at this position".
    fn fetch_catalog_collection(
        &mut self,
        collection: &str,
        restrictions: &[Option<String>],
    ) -> AdapterResult<RowSet>;

    /// Human-readable backend description for logs
    fn description(&self) -> String {
        "connectivity adapter".to_string()
    }
}
