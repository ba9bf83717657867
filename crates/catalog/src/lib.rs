// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified SQL Metadata - Catalog Layer
//!
//! This crate turns the heterogeneous catalog listings of database backends
//! into the canonical metadata model of `unified-sql-metadata-model`.
//!
//! ## Architecture
//!
//! - **Adapters** ([`ConnectivityAdapter`]): the only thing that talks to a
//!   backend. They return [`RowSet`]s for catalog collections and statements.
//! - **Profiles** ([`ProviderProfile`]): immutable, serializable descriptions
//!   of which collections a backend exposes and which columns carry what.
//! - **Fetchers** ([`fetch`]): pure functions interpreting row-sets.
//! - **Sessions** ([`ConnectionSession`]): serialize access to one connection,
//!   connect lazily and switch/restore the active catalog around a fetch.
//! - **Loader** ([`MetadataLoader`]): ties the above together per level.
//! - **Registry** ([`ProviderRegistry`]): explicit, startup-built profile lookup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use unified_sql_metadata_catalog::{ConnectionSession, ProviderRegistry};
//! use unified_sql_metadata_model::{MetadataLevel, MetadataModel};
//!
//! let registry = ProviderRegistry::with_builtin_profiles();
//! let loader = registry.loader("mssql")?;
//! let session = ConnectionSession::new(my_adapter);
//!
//! let mut model = MetadataModel::new();
//! let report = loader.load_tree(&session, &mut model, MetadataLevel::Field);
//! for failure in &report.errors {
//!     eprintln!("{}: {}", failure.scope, failure.error);
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod profiles;
pub mod registry;
pub mod rowset;
pub mod session;
pub mod snapshot;

// Re-exports
pub use adapter::{Command, ConnectionState, ConnectivityAdapter};
pub use config::{
    Classification, ClassificationEntry, CollectionSource, ColumnCandidates, FieldFetchConfig,
    ForeignKeyFetchConfig, NamespaceFetchConfig, NullableRule, ObjectFetchConfig, ProviderProfile,
    ReferencingFetchConfig, RestrictionLayout, SystemFlagRule,
};
pub use error::{AdapterError, AdapterResult, CatalogError, CatalogResult, OptionalFetchError};
pub use loader::{LoadReport, MetadataLoader, SubtreeError, TreeLoadReport};
pub use registry::ProviderRegistry;
pub use rowset::{ColumnDescriptor, RowSet, Value};
pub use session::{
    ActiveSession, ConnectionSession, SessionState, build_restrictions, missing_ancestor,
};
pub use snapshot::{CatalogSnapshot, CollectionEntry, QueryEntry, StaticAdapter};
