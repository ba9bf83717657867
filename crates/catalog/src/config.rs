// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Fetch configuration
//!
//! Immutable values describing how a backend's catalog collections map onto
//! the canonical model. A configuration is built once (in code, or loaded
//! from YAML/JSON) and passed by reference to the fetchers.
//!
//! ## Example
//!
//! ```yaml
//! name: custom
//! dialect: mssql
//! switch_catalog: true
//! schemas:
//!   - collection: Tables
//!     restrictions: { len: 4, database: 0 }
//!     config: { name: [TABLE_SCHEMA] }
//! objects:
//!   - collection: Tables
//!     restrictions: { len: 4, database: 0, schema: 1 }
//!     config:
//!       classification:
//!         - { kind: table, tags: [BASE TABLE] }
//!         - { kind: view, tags: [VIEW] }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use unified_sql_metadata_model::{Dialect, MetadataLevel, ObjectKind};

use crate::error::{CatalogError, CatalogResult};

/// Ordered candidate column names for one logical attribute.
///
/// The first candidate present in a row-set wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnCandidates(Vec<String>);

impl ColumnCandidates {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self(names.into_iter().map(Into::into).collect())
    }

    pub fn none() -> Self {
        Self::default()
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> From<[&str; N]> for ColumnCandidates {
    fn from(names: [&str; N]) -> Self {
        ColumnCandidates::new(names)
    }
}

/// Raw type tags that map to one object kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    pub kind: ObjectKind,
    pub tags: Vec<String>,
}

/// Mapping from object kind to the backend's type tags.
///
/// Entries are scanned in order with case-sensitive exact matching; the
/// first entry containing the tag wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classification {
    entries: Vec<ClassificationEntry>,
}

impl Classification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: ObjectKind, tags: &[&str]) -> Self {
        self.entries.push(ClassificationEntry {
            kind,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn classify(&self, tag: &str) -> Option<ObjectKind> {
        self.entries
            .iter()
            .find(|entry| entry.tags.iter().any(|t| t == tag))
            .map(|entry| entry.kind)
    }

    pub fn entries(&self) -> &[ClassificationEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tag vocabulary shared by ODBC/OLE DB style `Tables` collections
    pub fn standard() -> Self {
        Classification::new()
            .with(
                ObjectKind::Table,
                &["TABLE", "BASE TABLE", "LINK", "PASS-THROUGH"],
            )
            .with(ObjectKind::SystemTable, &["SYSTEM TABLE", "ACCESS TABLE"])
            .with(ObjectKind::View, &["VIEW"])
            .with(ObjectKind::SystemView, &["SYSTEM VIEW"])
            .with(ObjectKind::Synonym, &["ALIAS", "SYNONYM"])
    }
}

/// Configuration for database and schema name lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceFetchConfig {
    pub name: ColumnCandidates,
    pub trim_strings: bool,
}

impl NamespaceFetchConfig {
    pub fn new(name: impl Into<ColumnCandidates>) -> Self {
        Self {
            name: name.into(),
            trim_strings: false,
        }
    }

    pub fn with_trim(mut self) -> Self {
        self.trim_strings = true;
        self
    }

    /// Defaults for a database (catalog) listing
    pub fn databases() -> Self {
        Self::new([
            "TABLE_CATALOG",
            "TABLE_CAT",
            "CATALOG_NAME",
            "TABLE_QUALIFIER",
            "QUALIFIERNAME",
        ])
    }

    /// Defaults for a schema listing
    pub fn schemas() -> Self {
        Self::new(["TABLE_SCHEMA", "TABLE_SCHEM", "SCHEMA_NAME", "TABLE_OWNER", "OWNER"])
    }
}

impl Default for NamespaceFetchConfig {
    fn default() -> Self {
        Self::schemas()
    }
}

/// Marks rows as system objects when a column holds a given value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemFlagRule {
    pub column: ColumnCandidates,
    pub value: String,
}

impl SystemFlagRule {
    pub fn new(column: impl Into<ColumnCandidates>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Configuration for object listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectFetchConfig {
    pub name: ColumnCandidates,
    /// Column holding the raw type tag
    pub kind: ColumnCandidates,
    pub description: ColumnCandidates,
    pub classification: Classification,
    /// Kind for rows without a tag column or with an unknown tag
    pub default_kind: ObjectKind,
    pub system_flag: Option<SystemFlagRule>,
    pub trim_strings: bool,
}

impl Default for ObjectFetchConfig {
    fn default() -> Self {
        Self {
            name: ColumnCandidates::from(["TABLE_NAME", "TABLENAME", "OBJECT_NAME"]),
            kind: ColumnCandidates::from(["TABLE_TYPE", "TABLETYPE"]),
            description: ColumnCandidates::from(["REMARKS", "DESCRIPTION"]),
            classification: Classification::standard(),
            default_kind: ObjectKind::Table,
            system_flag: None,
            trim_strings: false,
        }
    }
}

impl ObjectFetchConfig {
    pub fn with_name(mut self, name: impl Into<ColumnCandidates>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_kind_column(mut self, kind: impl Into<ColumnCandidates>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<ColumnCandidates>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_default_kind(mut self, kind: ObjectKind) -> Self {
        self.default_kind = kind;
        self
    }

    pub fn with_system_flag(mut self, rule: SystemFlagRule) -> Self {
        self.system_flag = Some(rule);
        self
    }

    pub fn with_trim_strings(mut self, trim: bool) -> Self {
        self.trim_strings = trim;
        self
    }
}

/// How nullability is read from a columns listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NullableRule {
    pub column: ColumnCandidates,
    /// When set, a cell equal to this text (ignoring ASCII case) means nullable;
    /// otherwise the cell is read as a boolean flag
    pub sentinel: Option<String>,
}

impl Default for NullableRule {
    fn default() -> Self {
        Self {
            column: ColumnCandidates::from(["NULLABLE", "IS_NULLABLE"]),
            sentinel: None,
        }
    }
}

/// Configuration for column listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldFetchConfig {
    pub name: ColumnCandidates,
    pub ordinal: ColumnCandidates,
    pub nullable: NullableRule,
    pub server_type: ColumnCandidates,
    pub size: ColumnCandidates,
    pub precision: ColumnCandidates,
    pub scale: ColumnCandidates,
    pub default_value: ColumnCandidates,
    pub description: ColumnCandidates,
    pub trim_strings: bool,
}

impl Default for FieldFetchConfig {
    fn default() -> Self {
        Self {
            name: ColumnCandidates::from(["COLUMN_NAME"]),
            ordinal: ColumnCandidates::from(["ORDINAL_POSITION", "ORDINAL"]),
            nullable: NullableRule::default(),
            server_type: ColumnCandidates::from(["TYPE_NAME", "DATA_TYPE"]),
            size: ColumnCandidates::from(["COLUMN_SIZE", "CHARACTER_MAXIMUM_LENGTH"]),
            precision: ColumnCandidates::from(["NUMERIC_PRECISION"]),
            scale: ColumnCandidates::from(["DECIMAL_DIGITS", "NUMERIC_SCALE"]),
            default_value: ColumnCandidates::from(["COLUMN_DEF", "COLUMN_DEFAULT"]),
            description: ColumnCandidates::from(["REMARKS", "DESCRIPTION"]),
            trim_strings: false,
        }
    }
}

/// Configuration for foreign-key listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForeignKeyFetchConfig {
    /// Optional key-group identifier
    pub key_id: ColumnCandidates,
    pub pk_database: ColumnCandidates,
    pub pk_schema: ColumnCandidates,
    pub pk_object: ColumnCandidates,
    pub pk_field: ColumnCandidates,
    pub fk_field: ColumnCandidates,
    pub ordinal: ColumnCandidates,
    pub trim_strings: bool,
}

impl Default for ForeignKeyFetchConfig {
    fn default() -> Self {
        Self {
            key_id: ColumnCandidates::from(["FK_NAME", "CONSTRAINT_NAME"]),
            pk_database: ColumnCandidates::from(["PKTABLE_CAT", "PK_TABLE_CATALOG"]),
            pk_schema: ColumnCandidates::from(["PKTABLE_SCHEM", "PK_TABLE_SCHEMA"]),
            pk_object: ColumnCandidates::from(["PKTABLE_NAME", "PK_TABLE_NAME"]),
            pk_field: ColumnCandidates::from(["PKCOLUMN_NAME", "PK_COLUMN_NAME"]),
            fk_field: ColumnCandidates::from(["FKCOLUMN_NAME", "FK_COLUMN_NAME"]),
            ordinal: ColumnCandidates::from(["KEY_SEQ", "ORDINAL"]),
            trim_strings: false,
        }
    }
}

/// Configuration for "who references this object" listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferencingFetchConfig {
    pub database: ColumnCandidates,
    pub schema: ColumnCandidates,
    pub object: ColumnCandidates,
    pub trim_strings: bool,
}

impl Default for ReferencingFetchConfig {
    fn default() -> Self {
        Self {
            database: ColumnCandidates::from(["FKTABLE_CAT", "FK_TABLE_CATALOG"]),
            schema: ColumnCandidates::from(["FKTABLE_SCHEM", "FK_TABLE_SCHEMA"]),
            object: ColumnCandidates::from(["FKTABLE_NAME", "FK_TABLE_NAME"]),
            trim_strings: false,
        }
    }
}

/// Slot positions of each hierarchy level in a restriction vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionLayout {
    pub len: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<usize>,
}

impl Default for RestrictionLayout {
    fn default() -> Self {
        Self::standard(4)
    }
}

impl RestrictionLayout {
    /// Database, schema and object at slots 0, 1 and 2 (where they fit)
    pub fn standard(len: usize) -> Self {
        let slot = |i: usize| (i < len).then_some(i);
        Self {
            len,
            database: slot(0),
            schema: slot(1),
            object: slot(2),
        }
    }

    /// No restrictions at all
    pub fn empty() -> Self {
        Self {
            len: 0,
            database: None,
            schema: None,
            object: None,
        }
    }

    pub fn with_slots(
        len: usize,
        database: Option<usize>,
        schema: Option<usize>,
        object: Option<usize>,
    ) -> Self {
        Self {
            len,
            database,
            schema,
            object,
        }
    }

    pub fn slot(&self, level: MetadataLevel) -> Option<usize> {
        match level {
            MetadataLevel::Database => self.database,
            MetadataLevel::Schema => self.schema,
            MetadataLevel::Object => self.object,
            _ => None,
        }
    }

    fn validate(&self, collection: &str) -> CatalogResult<()> {
        for slot in [self.database, self.schema, self.object].into_iter().flatten() {
            if slot >= self.len {
                return Err(CatalogError::ConfigurationError(format!(
                    "restriction slot {} out of range for '{}' (len {})",
                    slot, collection, self.len
                )));
            }
        }
        Ok(())
    }
}

/// One catalog collection feeding one hierarchy level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "C: Serialize",
    deserialize = "C: Deserialize<'de> + Default"
))]
pub struct CollectionSource<C> {
    pub collection: String,
    #[serde(default)]
    pub restrictions: RestrictionLayout,
    /// Failures degrade to "no data from this source" instead of an error
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub config: C,
}

impl<C> CollectionSource<C> {
    pub fn new(collection: impl Into<String>, restrictions: RestrictionLayout, config: C) -> Self {
        Self {
            collection: collection.into(),
            restrictions,
            optional: false,
            config,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn validate(&self) -> CatalogResult<()> {
        if self.collection.trim().is_empty() {
            return Err(CatalogError::ConfigurationError(
                "collection name must not be empty".to_string(),
            ));
        }
        self.restrictions.validate(&self.collection)
    }
}

fn default_true() -> bool {
    true
}

/// Everything the loader needs to know about one backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub dialect: Dialect,
    /// Switch the active catalog around scoped fetches
    #[serde(default)]
    pub switch_catalog: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_timeout_secs: Option<u64>,
    #[serde(default)]
    pub databases: Vec<CollectionSource<NamespaceFetchConfig>>,
    #[serde(default)]
    pub schemas: Vec<CollectionSource<NamespaceFetchConfig>>,
    #[serde(default)]
    pub objects: Vec<CollectionSource<ObjectFetchConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<CollectionSource<FieldFetchConfig>>,
    /// Fall back to a schema-only `SELECT` when no columns listing yields fields
    #[serde(default = "default_true")]
    pub schema_only_fields: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_keys: Option<CollectionSource<ForeignKeyFetchConfig>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referencing: Option<CollectionSource<ReferencingFetchConfig>>,
}

impl ProviderProfile {
    pub fn new(name: impl Into<String>, dialect: Dialect) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            dialect,
            switch_catalog: false,
            command_timeout_secs: None,
            databases: Vec::new(),
            schemas: Vec::new(),
            objects: Vec::new(),
            fields: None,
            schema_only_fields: true,
            foreign_keys: None,
            referencing: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_switch_catalog(mut self, switch_catalog: bool) -> Self {
        self.switch_catalog = switch_catalog;
        self
    }

    pub fn with_command_timeout(mut self, secs: u64) -> Self {
        self.command_timeout_secs = Some(secs);
        self
    }

    pub fn with_databases(mut self, source: CollectionSource<NamespaceFetchConfig>) -> Self {
        self.databases.push(source);
        self
    }

    pub fn with_schemas(mut self, source: CollectionSource<NamespaceFetchConfig>) -> Self {
        self.schemas.push(source);
        self
    }

    pub fn with_objects(mut self, source: CollectionSource<ObjectFetchConfig>) -> Self {
        self.objects.push(source);
        self
    }

    pub fn with_fields(mut self, source: CollectionSource<FieldFetchConfig>) -> Self {
        self.fields = Some(source);
        self
    }

    pub fn with_schema_only_fields(mut self, enabled: bool) -> Self {
        self.schema_only_fields = enabled;
        self
    }

    pub fn with_foreign_keys(mut self, source: CollectionSource<ForeignKeyFetchConfig>) -> Self {
        self.foreign_keys = Some(source);
        self
    }

    pub fn with_referencing(mut self, source: CollectionSource<ReferencingFetchConfig>) -> Self {
        self.referencing = Some(source);
        self
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    /// Parse and validate a profile from YAML
    pub fn from_yaml_str(yaml: &str) -> CatalogResult<Self> {
        let profile: ProviderProfile = serde_yaml::from_str(yaml)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Parse and validate a profile from JSON
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        let profile: ProviderProfile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::ConfigurationError(
                "profile name must not be empty".to_string(),
            ));
        }
        if self.objects.is_empty() {
            return Err(CatalogError::ConfigurationError(format!(
                "profile '{}' has no object source",
                self.name
            )));
        }
        for source in self.databases.iter().chain(&self.schemas) {
            source.validate()?;
        }
        for source in &self.objects {
            source.validate()?;
        }
        if let Some(source) = &self.fields {
            source.validate()?;
        }
        if let Some(source) = &self.foreign_keys {
            source.validate()?;
        }
        if let Some(source) = &self.referencing {
            source.validate()?;
        }
        Ok(())
    }
}
