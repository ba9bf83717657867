// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Dialect Capabilities
//!
//! This module describes which namespace levels a SQL dialect exposes.
//!
//! ## Design
//!
//! Metadata loading only needs two facts from a dialect:
//!
//! 1. **Catalog support**: does the backend have databases/catalogs above schemas?
//! 2. **Schema support**: does the backend group objects into schemas/owners?
//!
//! Both drive restriction building: when a level is supported, the ancestor of
//! that level must be known before a scoped catalog query may be issued.
//!
//! ## Capability Table
//!
//! | Dialect | Catalogs | Schemas |
//! |---------|----------|---------|
//! | Generic (ANSI) | yes | yes |
//! | MS SQL Server, Sybase, Informix, PostgreSQL | yes | yes |
//! | MySQL, SQLite | yes | no |
//! | Oracle, DB2 | no | yes |
//! | Firebird, Access, VistaDB | no | no |
//!
//! Hosts with exotic backends can use [`SyntaxCapabilities`] directly.

use serde::{Deserialize, Serialize};

/// Capability interface consumed by the metadata loader.
pub trait SyntaxProvider: Send + Sync {
    /// Whether the backend exposes a database/catalog level
    fn supports_catalogs(&self) -> bool;

    /// Whether the backend exposes a schema/owner level
    fn supports_schemas(&self) -> bool;

    /// Quote a single identifier part
    fn quote_identifier(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    /// Quote and join the parts of a qualified name
    fn qualified_name(&self, parts: &[&str]) -> String {
        parts
            .iter()
            .filter(|part| !part.is_empty())
            .map(|part| self.quote_identifier(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

/// Known SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum Dialect {
    /// ANSI SQL with catalogs and schemas
    #[default]
    Generic,
    /// Microsoft SQL Server
    MsSql,
    /// MySQL / MariaDB (databases act as catalogs)
    MySql,
    /// PostgreSQL
    PostgreSql,
    /// SQLite (attached databases act as catalogs)
    Sqlite,
    /// Oracle
    Oracle,
    /// IBM DB2
    Db2,
    /// Firebird / InterBase
    Firebird,
    /// IBM Informix
    Informix,
    /// SAP Sybase ASE
    Sybase,
    /// Microsoft Access
    Access,
    /// VistaDB
    VistaDb,
}

impl Dialect {
    /// Lowercase identifier used in configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::MsSql => "mssql",
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgresql",
            Dialect::Sqlite => "sqlite",
            Dialect::Oracle => "oracle",
            Dialect::Db2 => "db2",
            Dialect::Firebird => "firebird",
            Dialect::Informix => "informix",
            Dialect::Sybase => "sybase",
            Dialect::Access => "access",
            Dialect::VistaDb => "vistadb",
        }
    }

    /// Capability flags for this dialect
    pub fn capabilities(&self) -> SyntaxCapabilities {
        match self {
            Dialect::Generic
            | Dialect::MsSql
            | Dialect::PostgreSql
            | Dialect::Informix
            | Dialect::Sybase => SyntaxCapabilities::new(true, true),
            Dialect::MySql | Dialect::Sqlite => SyntaxCapabilities::new(true, false),
            Dialect::Oracle | Dialect::Db2 => SyntaxCapabilities::new(false, true),
            Dialect::Firebird | Dialect::Access | Dialect::VistaDb => {
                SyntaxCapabilities::new(false, false)
            }
        }
    }
}

impl SyntaxProvider for Dialect {
    fn supports_catalogs(&self) -> bool {
        self.capabilities().supports_catalogs
    }

    fn supports_schemas(&self) -> bool {
        self.capabilities().supports_schemas
    }

    fn quote_identifier(&self, identifier: &str) -> String {
        match self {
            Dialect::MsSql | Dialect::Sybase | Dialect::Access => {
                format!("[{}]", identifier.replace(']', "]]"))
            }
            Dialect::MySql => format!("`{}`", identifier.replace('`', "``")),
            _ => format!("\"{}\"", identifier.replace('"', "\"\"")),
        }
    }
}

/// Explicit capability flags for backends without a [`Dialect`] entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyntaxCapabilities {
    pub supports_catalogs: bool,
    pub supports_schemas: bool,
}

impl SyntaxCapabilities {
    pub fn new(supports_catalogs: bool, supports_schemas: bool) -> Self {
        Self {
            supports_catalogs,
            supports_schemas,
        }
    }
}

impl SyntaxProvider for SyntaxCapabilities {
    fn supports_catalogs(&self) -> bool {
        self.supports_catalogs
    }

    fn supports_schemas(&self) -> bool {
        self.supports_schemas
    }
}
