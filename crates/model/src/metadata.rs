// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Canonical metadata entities
//!
//! This module defines the entity graph every backend is normalized into.
//! Each entity is owned by its parent container; clearing or reloading a
//! level drops everything below it.

use serde::{Deserialize, Serialize};

use crate::list::{MetadataItem, MetadataList};
use crate::name::{MetadataScope, QualifiedName};

/// Hierarchy levels, ordered from the root down
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataLevel {
    Server,
    Database,
    Schema,
    Object,
    Field,
    ForeignKey,
}

/// Object classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    #[default]
    Table,
    SystemTable,
    View,
    SystemView,
    Synonym,
    Procedure,
}

impl ObjectKind {
    pub fn is_system(&self) -> bool {
        matches!(self, ObjectKind::SystemTable | ObjectKind::SystemView)
    }

    /// System counterpart of this kind (tables and views only)
    pub fn to_system(self) -> Self {
        match self {
            ObjectKind::Table => ObjectKind::SystemTable,
            ObjectKind::View => ObjectKind::SystemView,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Table => "table",
            ObjectKind::SystemTable => "system_table",
            ObjectKind::View => "view",
            ObjectKind::SystemView => "system_view",
            ObjectKind::Synonym => "synonym",
            ObjectKind::Procedure => "procedure",
        }
    }
}

/// Databases and schemas
pub trait Namespace: MetadataItem {
    const LEVEL: MetadataLevel;

    fn named(name: String) -> Self;

    fn is_default(&self) -> bool;

    fn set_default(&mut self, default: bool);
}

/// Children a server or the model root can hold directly
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceContents {
    pub databases: MetadataList<Database>,
    pub schemas: MetadataList<Schema>,
    pub objects: MetadataList<MetadataObject>,
}

/// Linked server in a multi-server topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    #[serde(default)]
    pub contents: NamespaceContents,
}

impl Server {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: NamespaceContents::default(),
        }
    }
}

impl MetadataItem for Server {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Database (catalog)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub schemas: MetadataList<Schema>,
    #[serde(default)]
    pub objects: MetadataList<MetadataObject>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: false,
            schemas: MetadataList::new(),
            objects: MetadataList::new(),
        }
    }
}

impl MetadataItem for Database {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Namespace for Database {
    const LEVEL: MetadataLevel = MetadataLevel::Database;

    fn named(name: String) -> Self {
        Database::new(name)
    }

    fn is_default(&self) -> bool {
        self.default
    }

    fn set_default(&mut self, default: bool) {
        self.default = default;
    }
}

/// Schema (owner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub objects: MetadataList<MetadataObject>,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: false,
            objects: MetadataList::new(),
        }
    }
}

impl MetadataItem for Schema {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Namespace for Schema {
    const LEVEL: MetadataLevel = MetadataLevel::Schema;

    fn named(name: String) -> Self {
        Schema::new(name)
    }

    fn is_default(&self) -> bool {
        self.default
    }

    fn set_default(&mut self, default: bool) {
        self.default = default;
    }
}

/// Table, view, synonym or procedure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataObject {
    pub name: String,
    pub kind: ObjectKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Reported as a system object by the backend
    #[serde(default)]
    pub system: bool,
    /// Ordered by ordinal; replaced as a whole on reload
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl MetadataObject {
    pub fn new(name: impl Into<String>, kind: ObjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
            description: None,
            system: false,
            fields: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_system(mut self, system: bool) -> Self {
        self.system = system;
        self
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.replace_fields(fields);
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Replace the whole field sequence, keeping it sorted by ordinal
    pub fn replace_fields(&mut self, mut fields: Vec<Field>) {
        fields.sort_by_key(|f| f.ordinal);
        self.fields = fields;
    }

    pub fn clear_fields(&mut self) {
        self.fields.clear();
    }

    pub fn replace_foreign_keys(&mut self, foreign_keys: Vec<ForeignKey>) {
        self.foreign_keys = foreign_keys;
    }
}

impl MetadataItem for MetadataObject {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Column of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    /// Position as reported by the backend, so 0-based backends keep their
    /// numbering; positions the backend did not report count up from 1
    pub ordinal: i64,
    pub nullable: bool,
    /// Raw type name as the backend spells it
    pub server_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, ordinal: i64) -> Self {
        Self {
            name: name.into(),
            ordinal,
            nullable: true,
            server_type: String::new(),
            size: None,
            precision: None,
            scale: None,
            default_value: None,
            description: None,
        }
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_server_type(mut self, server_type: impl Into<String>) -> Self {
        self.server_type = server_type.into();
        self
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_precision(mut self, precision: i64, scale: Option<i64>) -> Self {
        self.precision = Some(precision);
        self.scale = scale;
        self
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// One (referencing, referenced) column pair of a foreign key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKeyColumn {
    pub ordinal: i64,
    pub referencing_field: String,
    pub referenced_field: String,
}

/// Foreign key owned by the referencing object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    pub referenced: QualifiedName,
    /// Ordered by ordinal
    pub columns: Vec<ForeignKeyColumn>,
}

impl ForeignKey {
    pub fn new(referenced: QualifiedName) -> Self {
        Self {
            key_id: None,
            referenced,
            columns: Vec::new(),
        }
    }

    pub fn with_key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = Some(key_id.into());
        self
    }

    pub fn with_column(
        mut self,
        ordinal: i64,
        referencing_field: impl Into<String>,
        referenced_field: impl Into<String>,
    ) -> Self {
        self.columns.push(ForeignKeyColumn {
            ordinal,
            referencing_field: referencing_field.into(),
            referenced_field: referenced_field.into(),
        });
        self
    }

    pub fn referencing_fields(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|c| c.referencing_field.as_str())
            .collect()
    }

    /// Resolve the referenced object; `None` while it is not loaded.
    ///
    /// `scope` is where the owning object lives; unreported namespace parts
    /// of the reference are taken from it.
    pub fn referenced_object<'m>(
        &self,
        model: &'m MetadataModel,
        scope: &MetadataScope,
    ) -> Option<&'m MetadataObject> {
        model.object(&self.referenced.relative_to(scope).to_scope())
    }

    /// Resolve the referenced fields in column order; dangling entries are `None`
    pub fn referenced_fields<'m>(
        &self,
        model: &'m MetadataModel,
        scope: &MetadataScope,
    ) -> Vec<Option<&'m Field>> {
        let object = self.referenced_object(model, scope);
        self.columns
            .iter()
            .map(|c| object.and_then(|o| o.field(&c.referenced_field)))
            .collect()
    }
}

/// Root of the canonical model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataModel {
    pub servers: MetadataList<Server>,
    pub contents: NamespaceContents,
}

impl MetadataModel {
    pub fn new() -> Self {
        Self::default()
    }

    fn contents(&self, server: Option<&str>) -> Option<&NamespaceContents> {
        match server {
            Some(name) => self.servers.find(name).map(|s| &s.contents),
            None => Some(&self.contents),
        }
    }

    fn contents_mut(&mut self, server: Option<&str>) -> Option<&mut NamespaceContents> {
        match server {
            Some(name) => self.servers.find_mut(name).map(|s| &mut s.contents),
            None => Some(&mut self.contents),
        }
    }

    pub fn databases(&self, scope: &MetadataScope) -> Option<&MetadataList<Database>> {
        self.contents(scope.server.as_deref()).map(|c| &c.databases)
    }

    pub fn databases_mut(&mut self, scope: &MetadataScope) -> Option<&mut MetadataList<Database>> {
        self.contents_mut(scope.server.as_deref())
            .map(|c| &mut c.databases)
    }

    /// Schemas under `scope.database`, or directly under the root/server
    pub fn schemas(&self, scope: &MetadataScope) -> Option<&MetadataList<Schema>> {
        let contents = self.contents(scope.server.as_deref())?;
        match scope.database.as_deref() {
            Some(db) => contents.databases.find(db).map(|d| &d.schemas),
            None => Some(&contents.schemas),
        }
    }

    pub fn schemas_mut(&mut self, scope: &MetadataScope) -> Option<&mut MetadataList<Schema>> {
        let contents = self.contents_mut(scope.server.as_deref())?;
        match scope.database.as_deref() {
            Some(db) => contents.databases.find_mut(db).map(|d| &mut d.schemas),
            None => Some(&mut contents.schemas),
        }
    }

    /// Objects of the innermost namespace named by `scope`
    pub fn objects(&self, scope: &MetadataScope) -> Option<&MetadataList<MetadataObject>> {
        let contents = self.contents(scope.server.as_deref())?;
        match (scope.database.as_deref(), scope.schema.as_deref()) {
            (Some(db), Some(schema)) => contents
                .databases
                .find(db)?
                .schemas
                .find(schema)
                .map(|s| &s.objects),
            (Some(db), None) => contents.databases.find(db).map(|d| &d.objects),
            (None, Some(schema)) => contents.schemas.find(schema).map(|s| &s.objects),
            (None, None) => Some(&contents.objects),
        }
    }

    pub fn objects_mut(
        &mut self,
        scope: &MetadataScope,
    ) -> Option<&mut MetadataList<MetadataObject>> {
        let contents = self.contents_mut(scope.server.as_deref())?;
        match (scope.database.as_deref(), scope.schema.as_deref()) {
            (Some(db), Some(schema)) => contents
                .databases
                .find_mut(db)?
                .schemas
                .find_mut(schema)
                .map(|s| &mut s.objects),
            (Some(db), None) => contents.databases.find_mut(db).map(|d| &mut d.objects),
            (None, Some(schema)) => contents.schemas.find_mut(schema).map(|s| &mut s.objects),
            (None, None) => Some(&mut contents.objects),
        }
    }

    pub fn object(&self, scope: &MetadataScope) -> Option<&MetadataObject> {
        let name = scope.object.as_deref()?;
        self.objects(scope)?.find(name)
    }

    pub fn object_mut(&mut self, scope: &MetadataScope) -> Option<&mut MetadataObject> {
        let name = scope.object.as_deref()?;
        self.objects_mut(scope)?.find_mut(name)
    }

    /// Resolve a name-only reference
    pub fn resolve(&self, name: &QualifiedName) -> Option<&MetadataObject> {
        self.object(&name.to_scope())
    }

    /// Scopes of every loaded object, in hierarchy order
    pub fn object_scopes(&self) -> Vec<MetadataScope> {
        let mut scopes = Vec::new();
        collect_object_scopes(&self.contents, &MetadataScope::root(), &mut scopes);
        for server in &self.servers {
            let scope = MetadataScope::root().with_server(&server.name);
            collect_object_scopes(&server.contents, &scope, &mut scopes);
        }
        scopes
    }
}

fn collect_object_scopes(
    contents: &NamespaceContents,
    base: &MetadataScope,
    out: &mut Vec<MetadataScope>,
) {
    for database in &contents.databases {
        let db_scope = base.clone().with_database(&database.name);
        for schema in &database.schemas {
            let schema_scope = db_scope.clone().with_schema(&schema.name);
            push_objects(&schema.objects, &schema_scope, out);
        }
        push_objects(&database.objects, &db_scope, out);
    }
    for schema in &contents.schemas {
        let schema_scope = base.clone().with_schema(&schema.name);
        push_objects(&schema.objects, &schema_scope, out);
    }
    push_objects(&contents.objects, base, out);
}

fn push_objects(
    objects: &MetadataList<MetadataObject>,
    scope: &MetadataScope,
    out: &mut Vec<MetadataScope>,
) {
    out.extend(objects.iter().map(|o| scope.clone().with_object(&o.name)));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> MetadataModel {
        let mut model = MetadataModel::new();
        let mut hr = Database::new("hr");
        let mut public = Schema::new("public");
        public.objects.insert(
            MetadataObject::new("Dept", ObjectKind::Table)
                .with_fields(vec![Field::new("id", 1), Field::new("name", 2)]),
        );
        public.objects.insert(MetadataObject::new("Emp", ObjectKind::Table));
        hr.schemas.insert(public);
        model.contents.databases.insert(hr);
        model
    }

    #[test]
    fn test_object_kind_to_system() {
        assert_eq!(ObjectKind::Table.to_system(), ObjectKind::SystemTable);
        assert_eq!(ObjectKind::View.to_system(), ObjectKind::SystemView);
        assert_eq!(ObjectKind::Procedure.to_system(), ObjectKind::Procedure);
        assert!(ObjectKind::SystemView.is_system());
    }

    #[test]
    fn test_replace_fields_sorts_by_ordinal() {
        let mut object = MetadataObject::new("t", ObjectKind::Table);
        object.replace_fields(vec![Field::new("b", 2), Field::new("a", 1)]);
        let names: Vec<_> = object.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_navigate_by_scope() {
        let model = sample_model();
        let scope = MetadataScope::root().with_database("hr").with_schema("public");
        assert_eq!(model.objects(&scope).map(|o| o.len()), Some(2));
        assert!(model.object(&scope.clone().with_object("Emp")).is_some());
        assert!(model.objects(&MetadataScope::root().with_database("nope")).is_none());
    }

    #[test]
    fn test_foreign_key_resolution_and_dangling_reference() {
        let model = sample_model();
        let scope = MetadataScope::root().with_database("hr").with_schema("public");

        let fk = ForeignKey::new(QualifiedName::new("Dept")).with_column(1, "dept_id", "id");
        let object = fk.referenced_object(&model, &scope);
        assert_eq!(object.map(|o| o.name.as_str()), Some("Dept"));
        let fields = fk.referenced_fields(&model, &scope);
        assert_eq!(fields[0].map(|f| f.name.as_str()), Some("id"));

        let dangling = ForeignKey::new(QualifiedName::new("Payroll").with_schema("finance"))
            .with_column(1, "payroll_id", "id");
        assert!(dangling.referenced_object(&model, &scope).is_none());
        assert_eq!(dangling.referenced_fields(&model, &scope), vec![None]);
    }

    #[test]
    fn test_object_scopes() {
        let mut model = sample_model();
        model
            .contents
            .objects
            .insert(MetadataObject::new("loose", ObjectKind::View));
        let scopes = model.object_scopes();
        assert_eq!(scopes.len(), 3);
        assert_eq!(scopes[0].to_string(), "hr.public.Dept");
        assert_eq!(scopes[2].to_string(), "loose");
    }
}
