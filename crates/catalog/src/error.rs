// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Error types for catalog metadata loading
//!
//! Three layers of errors:
//!
//! - [`AdapterError`]: what a connectivity adapter reports
//! - [`CatalogError`]: structured errors surfaced to the caller of a load
//! - [`OptionalFetchError`]: failures of optional sources, recorded but never escalated

use serde::Serialize;
use thiserror::Error;

/// Result type alias for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Result type alias for adapter calls
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Errors that can occur during catalog operations
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum CatalogError {
    /// No connectivity adapter was supplied to the session
    #[error("No connection configured")]
    NoConnectionConfigured,

    /// Opening the connection failed
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// A primary query failed
    #[error("Query execution failed: {message} (statement: {sql})")]
    QueryExecutionFailed { message: String, sql: String },

    /// A primary catalog collection could not be fetched
    #[error("Failed to fetch catalog collection '{collection}': {message}")]
    CollectionFetchFailed { collection: String, message: String },

    /// Switching to (or back from) a catalog failed
    #[error("Failed to switch to catalog '{catalog}': {message}")]
    CatalogSwitchFailed { catalog: String, message: String },

    /// Invalid profile or configuration
    #[error("Invalid catalog configuration: {0}")]
    ConfigurationError(String),

    /// Failed to serialize or deserialize configuration or snapshot data
    #[error("Failed to serialize catalog data: {0}")]
    SerializationError(String),

    /// The operation is not supported by this profile or backend
    #[error("Feature not supported: {0}")]
    NotSupported(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(err: serde_yaml::Error) -> Self {
        CatalogError::SerializationError(err.to_string())
    }
}

/// Errors reported by a connectivity adapter
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum AdapterError {
    /// The physical connection broke; the session must reconnect
    #[error("I/O error: {0}")]
    Io(String),

    /// The backend rejected the statement or collection request
    #[error("{0}")]
    Query(String),

    /// The backend does not implement this catalog collection
    #[error("Catalog collection '{0}' is not supported")]
    UnsupportedCollection(String),

    /// The backend cannot change its active catalog
    #[error("Changing the active catalog is not supported")]
    CatalogSwitchUnsupported,
}

impl AdapterError {
    /// Whether this error invalidates the connection
    pub fn is_io(&self) -> bool {
        matches!(self, AdapterError::Io(_))
    }
}

/// Failure of an optional (enrichment) source.
///
/// Loaders record these in their report and carry on with partial data.
#[derive(Debug, Error, Clone, PartialEq, Serialize)]
pub enum OptionalFetchError {
    /// The backend does not implement the collection
    #[error("Optional collection '{collection}' is unsupported")]
    Unsupported { collection: String },

    /// The collection exists but fetching it failed
    #[error("Optional collection '{collection}' failed: {message}")]
    Failed { collection: String, message: String },
}

impl OptionalFetchError {
    pub fn from_adapter(collection: &str, err: AdapterError) -> Self {
        match err {
            AdapterError::UnsupportedCollection(_) => OptionalFetchError::Unsupported {
                collection: collection.to_string(),
            },
            other => OptionalFetchError::Failed {
                collection: collection.to_string(),
                message: other.to_string(),
            },
        }
    }

    pub fn collection(&self) -> &str {
        match self {
            OptionalFetchError::Unsupported { collection }
            | OptionalFetchError::Failed { collection, .. } => collection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_failure_carries_statement() {
        let err = CatalogError::QueryExecutionFailed {
            message: "syntax error".to_string(),
            sql: "SELECT * FROM x".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("syntax error"));
        assert!(text.contains("SELECT * FROM x"));
    }

    #[test]
    fn test_optional_error_from_adapter() {
        let err = OptionalFetchError::from_adapter(
            "ForeignKeys",
            AdapterError::UnsupportedCollection("ForeignKeys".to_string()),
        );
        assert_eq!(
            err,
            OptionalFetchError::Unsupported {
                collection: "ForeignKeys".to_string()
            }
        );

        let err = OptionalFetchError::from_adapter("Columns", AdapterError::Query("boom".into()));
        assert_eq!(err.collection(), "Columns");
        assert!(matches!(err, OptionalFetchError::Failed { .. }));
    }

    #[test]
    fn test_errors_serialize() {
        let json = serde_json::to_string(&CatalogError::NoConnectionConfigured).unwrap();
        assert_eq!(json, "\"NoConnectionConfigured\"");
    }
}
