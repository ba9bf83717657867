// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Names and scopes
//!
//! [`MetadataScope`] addresses a position in the hierarchy by the names of its
//! ancestors. It is what restriction vectors are built from. `None` at a level
//! means "not known at this level".
//!
//! [`QualifiedName`] identifies an object by name only. Foreign keys use it to
//! point at objects that may not be loaded yet.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Position in the metadata hierarchy, identified by ancestor names
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataScope {
    pub server: Option<String>,
    pub database: Option<String>,
    pub schema: Option<String>,
    pub object: Option<String>,
}

impl MetadataScope {
    /// The root of the hierarchy
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = Some(server.into());
        self
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn with_object(mut self, object: impl Into<String>) -> Self {
        self.object = Some(object.into());
        self
    }

    /// Same scope without the object part
    pub fn container(&self) -> Self {
        Self {
            object: None,
            ..self.clone()
        }
    }

    /// Whether this scope points below a linked server
    pub fn is_remote(&self) -> bool {
        self.server.is_some()
    }
}

impl fmt::Display for MetadataScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.server, &self.database, &self.schema, &self.object]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .collect();
        if parts.is_empty() {
            write!(f, "<root>")
        } else {
            write!(f, "{}", parts.join("."))
        }
    }
}

/// Name-only reference to an object, possibly not loaded
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub object: String,
}

impl QualifiedName {
    pub fn new(object: impl Into<String>) -> Self {
        Self {
            database: None,
            schema: None,
            object: object.into(),
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Fill unreported namespace parts from the scope the name was read in.
    ///
    /// Backends commonly omit the catalog (and sometimes the schema) of a
    /// referenced table when it lives next to the referencing one.
    pub fn relative_to(&self, scope: &MetadataScope) -> Self {
        Self {
            database: self.database.clone().or_else(|| scope.database.clone()),
            schema: self.schema.clone().or_else(|| scope.schema.clone()),
            object: self.object.clone(),
        }
    }

    /// Scope that addresses this object in the model
    pub fn to_scope(&self) -> MetadataScope {
        MetadataScope {
            server: None,
            database: self.database.clone(),
            schema: self.schema.clone(),
            object: Some(self.object.clone()),
        }
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(database) = &self.database {
            write!(f, "{}.", database)?;
        }
        if let Some(schema) = &self.schema {
            write!(f, "{}.", schema)?;
        }
        write!(f, "{}", self.object)
    }
}
