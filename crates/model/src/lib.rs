// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Unified SQL Metadata - Canonical Model
//!
//! This crate defines the canonical, backend-independent object model that
//! catalog metadata is normalized into:
//!
//! ```text
//! Server? -> Database? -> Schema? -> Object -> Field
//!                                       \-> ForeignKey
//! ```
//!
//! Levels a backend does not support are simply absent from the hierarchy.
//! A backend without catalogs keeps its schemas directly under the root, a
//! backend with neither keeps its objects there.
//!
//! ## Modules
//!
//! - [`metadata`]: entities (`Database`, `Schema`, `MetadataObject`, `Field`, `ForeignKey`)
//!   and the [`MetadataModel`] root
//! - [`list`]: name-unique sibling collections with merge semantics
//! - [`name`]: qualified names and hierarchy scopes
//! - [`dialect`]: catalog/schema capability flags consumed by restriction building

pub mod dialect;
pub mod list;
pub mod metadata;
pub mod name;

// Re-export commonly used types
pub use dialect::{Dialect, SyntaxCapabilities, SyntaxProvider};
pub use list::{MetadataItem, MetadataList};
pub use metadata::{
    Database, Field, ForeignKey, ForeignKeyColumn, MetadataLevel, MetadataModel, MetadataObject,
    Namespace, NamespaceContents, ObjectKind, Schema, Server,
};
pub use name::{MetadataScope, QualifiedName};
