// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Metadata loader
//!
//! Populates one level of the canonical model at a time:
//!
//! 1. build the restriction vector from the target scope (abandoning the
//!    load when a supported ancestor is unknown)
//! 2. lock the session, connect if needed and switch catalog if the
//!    profile asks for it
//! 3. fetch every configured collection for the level
//! 4. feed the row-sets to the matching fetcher
//!
//! Primary sources escalate failures as [`CatalogError`] and leave the
//! level empty. Optional sources degrade to an [`OptionalFetchError`] in the
//! returned [`LoadReport`].

use std::sync::{Arc, MutexGuard};

use serde::Serialize;
use tracing::{debug, info, warn};
use unified_sql_metadata_model::{
    Database, MetadataLevel, MetadataModel, MetadataScope, QualifiedName, Schema, SyntaxProvider,
};

use crate::config::{CollectionSource, ProviderProfile};
use crate::error::{CatalogError, CatalogResult, OptionalFetchError};
use crate::fetch::{
    collect_names, fetch_fields, fetch_foreign_keys, fetch_objects, fetch_referencing,
    fields_from_descriptors, load_names, mark_sole_default,
};
use crate::rowset::RowSet;
use crate::session::{ActiveSession, ConnectionSession, build_restrictions, missing_ancestor};

/// Outcome of one successful level load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadReport {
    pub scope: MetadataScope,
    pub level: MetadataLevel,
    /// Entities added to the model (fields and keys: entities loaded)
    pub added: usize,
    /// The load was skipped without querying the backend
    pub abandoned: bool,
    /// Optional sources that contributed nothing
    pub fallbacks: Vec<OptionalFetchError>,
    /// Non-fatal problems such as a failed catalog restore
    pub warnings: Vec<CatalogError>,
}

impl LoadReport {
    fn new(scope: &MetadataScope, level: MetadataLevel) -> Self {
        Self {
            scope: scope.clone(),
            level,
            added: 0,
            abandoned: false,
            fallbacks: Vec::new(),
            warnings: Vec::new(),
        }
    }

    fn abandon(mut self) -> Self {
        self.abandoned = true;
        self
    }

    /// Whether any optional source fell back
    pub fn has_fallbacks(&self) -> bool {
        !self.fallbacks.is_empty()
    }
}

/// A failed subtree of a tree load
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubtreeError {
    pub scope: MetadataScope,
    pub level: MetadataLevel,
    pub error: CatalogError,
}

/// Outcome of [`MetadataLoader::load_tree`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TreeLoadReport {
    pub reports: Vec<LoadReport>,
    pub errors: Vec<SubtreeError>,
}

impl TreeLoadReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    fn record(&mut self, scope: &MetadataScope, level: MetadataLevel, result: CatalogResult<LoadReport>) -> bool {
        match result {
            Ok(report) => {
                self.reports.push(report);
                true
            }
            Err(error) => {
                warn!("Loading {:?} under '{}' failed: {}", level, scope, error);
                self.errors.push(SubtreeError {
                    scope: scope.clone(),
                    level,
                    error,
                });
                false
            }
        }
    }
}

/// Loads metadata for one provider profile
#[derive(Clone)]
pub struct MetadataLoader {
    profile: Arc<ProviderProfile>,
    syntax: Arc<dyn SyntaxProvider>,
}

impl std::fmt::Debug for MetadataLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataLoader")
            .field("profile", &self.profile.name)
            .finish()
    }
}

impl MetadataLoader {
    /// Loader using the profile's dialect for capability checks
    pub fn new(profile: Arc<ProviderProfile>) -> Self {
        let syntax: Arc<dyn SyntaxProvider> = Arc::new(profile.dialect);
        Self { profile, syntax }
    }

    /// Override the capability provider (for backends the dialect table does not cover)
    pub fn with_syntax_provider(mut self, syntax: Arc<dyn SyntaxProvider>) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn profile(&self) -> &ProviderProfile {
        &self.profile
    }

    pub fn syntax(&self) -> &dyn SyntaxProvider {
        self.syntax.as_ref()
    }

    /// Lock the session, applying the profile's command timeout unless the
    /// session carries its own
    fn lock<'s>(&self, session: &'s ConnectionSession) -> MutexGuard<'s, ActiveSession> {
        let mut active = session.lock();
        if active.command_timeout().is_none()
            && let Some(timeout) = self.profile.command_timeout()
        {
            active.set_command_timeout(Some(timeout));
        }
        active
    }

    /// Run `body` inside the scope's catalog when the profile switches catalogs
    fn in_catalog<T, F>(&self, active: &mut ActiveSession, scope: &MetadataScope, body: F) -> CatalogResult<T>
    where
        F: FnOnce(&mut ActiveSession) -> CatalogResult<T>,
    {
        if self.profile.switch_catalog && self.syntax.supports_catalogs() {
            active.with_catalog(scope.database.as_deref(), body)
        } else {
            body(active)
        }
    }

    /// Load the database list under `scope` (the root or a server)
    pub fn load_databases(
        &self,
        session: &ConnectionSession,
        model: &mut MetadataModel,
        scope: &MetadataScope,
    ) -> CatalogResult<LoadReport> {
        let mut report = LoadReport::new(scope, MetadataLevel::Database);
        if scope.is_remote() {
            debug!("Skipping databases of linked server '{}'", scope);
            return Ok(report.abandon());
        }
        if !self.syntax.supports_catalogs() {
            return Ok(report);
        }

        let mut active = self.lock(session);
        active.ensure_connected()?;

        let mut names = Vec::new();
        for source in &self.profile.databases {
            let restrictions = build_restrictions(self.syntax(), scope, &source.restrictions, &[])
                .unwrap_or_default();
            match fetch_source(&mut active, source, &restrictions, &mut report) {
                Ok(Some(rowset)) => collect_names(&rowset, &source.config, &mut names),
                Ok(None) => {}
                Err(err) => {
                    clear_databases(model, scope);
                    return Err(err);
                }
            }
        }
        let current = active.active_catalog();
        report.warnings.extend(active.take_warnings());
        drop(active);

        let databases = model
            .databases_mut(scope)
            .ok_or_else(|| missing_container(scope))?;
        report.added = load_names(databases, &names);
        if let Some(current) = current
            && mark_sole_default(databases, &current)
        {
            report.added += 1;
        }

        info!("Loaded {} new databases", report.added);
        Ok(report)
    }

    /// Load the schemas of `scope.database` (or of the root when catalogs are unsupported)
    pub fn load_schemas(
        &self,
        session: &ConnectionSession,
        model: &mut MetadataModel,
        scope: &MetadataScope,
    ) -> CatalogResult<LoadReport> {
        let report = LoadReport::new(scope, MetadataLevel::Schema);
        if scope.is_remote() {
            debug!("Skipping schemas of linked server '{}'", scope);
            return Ok(report.abandon());
        }
        if !self.syntax.supports_schemas() {
            return Ok(report);
        }
        let Some(restrictions) =
            self.restrictions_for(&self.profile.schemas, scope, &[MetadataLevel::Database])
        else {
            return Ok(report.abandon());
        };

        let mut report = report;
        let rowsets = self.fetch_level(session, scope, &self.profile.schemas, &restrictions, &mut report);
        let rowsets = match rowsets {
            Ok(rowsets) => rowsets,
            Err(err) => {
                if let Some(schemas) = model.schemas_mut(scope) {
                    schemas.clear();
                }
                return Err(err);
            }
        };

        let mut names = Vec::new();
        for (source, rowset) in &rowsets {
            collect_names(rowset, &source.config, &mut names);
        }
        ensure_namespaces(model, scope);
        let schemas = model
            .schemas_mut(scope)
            .ok_or_else(|| missing_container(scope))?;
        report.added = load_names(schemas, &names);

        info!("Loaded {} new schemas under '{}'", report.added, scope);
        Ok(report)
    }

    /// Load the objects (tables, views, procedures...) of the namespace named by `scope`
    pub fn load_objects(
        &self,
        session: &ConnectionSession,
        model: &mut MetadataModel,
        scope: &MetadataScope,
    ) -> CatalogResult<LoadReport> {
        let report = LoadReport::new(scope, MetadataLevel::Object);
        if scope.is_remote() {
            debug!("Skipping objects of linked server '{}'", scope);
            return Ok(report.abandon());
        }
        let Some(restrictions) = self.restrictions_for(
            &self.profile.objects,
            scope,
            &[MetadataLevel::Database, MetadataLevel::Schema],
        ) else {
            return Ok(report.abandon());
        };

        let mut report = report;
        let rowsets = self.fetch_level(session, scope, &self.profile.objects, &restrictions, &mut report);
        let rowsets = match rowsets {
            Ok(rowsets) => rowsets,
            Err(err) => {
                if let Some(objects) = model.objects_mut(scope) {
                    objects.clear();
                }
                return Err(err);
            }
        };

        ensure_namespaces(model, scope);
        let objects = model
            .objects_mut(scope)
            .ok_or_else(|| missing_container(scope))?;
        for (source, rowset) in &rowsets {
            report.added += fetch_objects(rowset, &source.config, objects);
        }

        info!("Loaded {} new objects under '{}'", report.added, scope);
        Ok(report)
    }

    /// Load the fields of the object addressed by `scope`.
    ///
    /// The columns collection is tried first; when it yields nothing, a
    /// schema-only `SELECT` against the object describes its columns.
    pub fn load_fields(
        &self,
        session: &ConnectionSession,
        model: &mut MetadataModel,
        scope: &MetadataScope,
    ) -> CatalogResult<LoadReport> {
        let mut report = LoadReport::new(scope, MetadataLevel::Field);
        if scope.is_remote() {
            debug!("Skipping fields of linked object '{}'", scope);
            return Ok(report.abandon());
        }
        // Both the columns listing and the schema-only query need the full path
        let required = [MetadataLevel::Database, MetadataLevel::Schema];
        if let Some(level) = missing_ancestor(self.syntax(), scope, &required) {
            debug!("Abandoning fields of '{}': {:?} is unknown", scope, level);
            return Ok(report.abandon());
        }
        let object = model.object_mut(scope).ok_or_else(|| missing_object(scope))?;

        let restrictions = self
            .profile
            .fields
            .as_ref()
            .and_then(|source| build_restrictions(self.syntax(), scope, &source.restrictions, &required));
        let schema_only_sql = self
            .profile
            .schema_only_fields
            .then(|| self.schema_only_query(scope, &object.name));

        let mut active = self.lock(session);
        let result = self.in_catalog(&mut active, scope, |active| {
            let mut loaded = 0;
            if let (Some(source), Some(restrictions)) = (&self.profile.fields, &restrictions)
                && let Some(rowset) = fetch_source(active, source, restrictions, &mut report)?
            {
                loaded = fetch_fields(&rowset, &source.config, object);
            }
            if loaded == 0
                && let Some(sql) = &schema_only_sql
            {
                debug!("No columns listing for '{}', describing it with a schema-only query", scope);
                let rowset = active.execute_query(sql, true)?;
                object.replace_fields(fields_from_descriptors(&rowset.columns));
                loaded = object.fields.len();
            }
            Ok(loaded)
        });
        report.warnings.extend(active.take_warnings());
        drop(active);

        match result {
            Ok(loaded) => {
                report.added = loaded;
                debug!("Loaded {} fields for '{}'", loaded, scope);
                Ok(report)
            }
            Err(err) => {
                if let Some(object) = model.object_mut(scope) {
                    object.clear_fields();
                }
                Err(err)
            }
        }
    }

    /// Load the foreign keys owned by the object addressed by `scope`
    pub fn load_foreign_keys(
        &self,
        session: &ConnectionSession,
        model: &mut MetadataModel,
        scope: &MetadataScope,
    ) -> CatalogResult<LoadReport> {
        let mut report = LoadReport::new(scope, MetadataLevel::ForeignKey);
        if scope.is_remote() {
            debug!("Skipping foreign keys of linked object '{}'", scope);
            return Ok(report.abandon());
        }
        let object = model.object_mut(scope).ok_or_else(|| missing_object(scope))?;
        let Some(source) = &self.profile.foreign_keys else {
            report.fallbacks.push(OptionalFetchError::Unsupported {
                collection: "foreign keys".to_string(),
            });
            return Ok(report);
        };
        let Some(restrictions) = build_restrictions(
            self.syntax(),
            scope,
            &source.restrictions,
            &[MetadataLevel::Database, MetadataLevel::Schema],
        ) else {
            return Ok(report.abandon());
        };

        let mut active = self.lock(session);
        let result = self.in_catalog(&mut active, scope, |active| {
            fetch_source(active, source, &restrictions, &mut report)
        });
        report.warnings.extend(active.take_warnings());
        drop(active);

        match result {
            Ok(Some(rowset)) => {
                report.added = fetch_foreign_keys(&rowset, &source.config, object);
                debug!("Loaded {} foreign keys for '{}'", report.added, scope);
                Ok(report)
            }
            Ok(None) => Ok(report),
            Err(err) => {
                object.replace_foreign_keys(Vec::new());
                Err(err)
            }
        }
    }

    /// Names of the objects whose foreign keys reference the object at `scope`
    pub fn referencing_objects(
        &self,
        session: &ConnectionSession,
        scope: &MetadataScope,
    ) -> CatalogResult<(Vec<QualifiedName>, LoadReport)> {
        let mut report = LoadReport::new(scope, MetadataLevel::ForeignKey);
        if scope.is_remote() {
            return Ok((Vec::new(), report.abandon()));
        }
        let Some(source) = &self.profile.referencing else {
            return Err(CatalogError::NotSupported(format!(
                "profile '{}' cannot list referencing objects",
                self.profile.name
            )));
        };
        let Some(restrictions) = build_restrictions(
            self.syntax(),
            scope,
            &source.restrictions,
            &[MetadataLevel::Object],
        ) else {
            return Ok((Vec::new(), report.abandon()));
        };

        let mut active = self.lock(session);
        let rowset = self.in_catalog(&mut active, scope, |active| {
            fetch_source(active, source, &restrictions, &mut report)
        });
        report.warnings.extend(active.take_warnings());
        drop(active);

        let names = match rowset? {
            Some(rowset) => fetch_referencing(&rowset, &source.config),
            None => Vec::new(),
        };
        report.added = names.len();
        Ok((names, report))
    }

    /// Populate the model from the root down to `depth`.
    ///
    /// Each subtree is loaded independently; a failure is recorded for that
    /// subtree and loading continues with its siblings.
    pub fn load_tree(
        &self,
        session: &ConnectionSession,
        model: &mut MetadataModel,
        depth: MetadataLevel,
    ) -> TreeLoadReport {
        let mut tree = TreeLoadReport::default();
        let root = MetadataScope::root();

        let database_scopes = if self.syntax.supports_catalogs() {
            let result = self.load_databases(session, model, &root);
            if !tree.record(&root, MetadataLevel::Database, result) {
                return tree;
            }
            child_scopes(model.databases(&root).map(|d| d.names()), |name| {
                root.clone().with_database(name)
            })
        } else {
            vec![root.clone()]
        };
        if depth < MetadataLevel::Schema {
            return tree;
        }

        for database_scope in database_scopes {
            let schema_scopes = if self.syntax.supports_schemas() {
                let result = self.load_schemas(session, model, &database_scope);
                if !tree.record(&database_scope, MetadataLevel::Schema, result) {
                    continue;
                }
                child_scopes(model.schemas(&database_scope).map(|s| s.names()), |name| {
                    database_scope.clone().with_schema(name)
                })
            } else {
                vec![database_scope.clone()]
            };
            if depth < MetadataLevel::Object {
                continue;
            }

            for schema_scope in schema_scopes {
                let result = self.load_objects(session, model, &schema_scope);
                if !tree.record(&schema_scope, MetadataLevel::Object, result) {
                    continue;
                }
                if depth < MetadataLevel::Field {
                    continue;
                }
                let object_scopes = child_scopes(model.objects(&schema_scope).map(|o| o.names()), |name| {
                    schema_scope.clone().with_object(name)
                });
                for object_scope in object_scopes {
                    let result = self.load_fields(session, model, &object_scope);
                    tree.record(&object_scope, MetadataLevel::Field, result);
                    if depth >= MetadataLevel::ForeignKey {
                        let result = self.load_foreign_keys(session, model, &object_scope);
                        tree.record(&object_scope, MetadataLevel::ForeignKey, result);
                    }
                }
            }
        }

        info!(
            "Tree load finished: {} levels loaded, {} failed",
            tree.reports.len(),
            tree.errors.len()
        );
        tree
    }

    fn restrictions_for<C>(
        &self,
        sources: &[CollectionSource<C>],
        scope: &MetadataScope,
        required: &[MetadataLevel],
    ) -> Option<Vec<Vec<Option<String>>>> {
        sources
            .iter()
            .map(|source| build_restrictions(self.syntax(), scope, &source.restrictions, required))
            .collect()
    }

    /// Fetch every source of a level under one lock and one catalog switch
    fn fetch_level<'s, C>(
        &self,
        session: &ConnectionSession,
        scope: &MetadataScope,
        sources: &'s [CollectionSource<C>],
        restrictions: &[Vec<Option<String>>],
        report: &mut LoadReport,
    ) -> CatalogResult<Vec<(&'s CollectionSource<C>, RowSet)>> {
        let mut active = self.lock(session);
        active.ensure_connected()?;
        let result = self.in_catalog(&mut active, scope, |active| {
            let mut rowsets = Vec::new();
            for (source, restrictions) in sources.iter().zip(restrictions) {
                if let Some(rowset) = fetch_source(active, source, restrictions, report)? {
                    rowsets.push((source, rowset));
                }
            }
            Ok(rowsets)
        });
        report.warnings.extend(active.take_warnings());
        result
    }

    fn schema_only_query(&self, scope: &MetadataScope, object: &str) -> String {
        let mut parts: Vec<&str> = Vec::new();
        if self.syntax.supports_catalogs()
            && let Some(database) = scope.database.as_deref()
        {
            parts.push(database);
        }
        if self.syntax.supports_schemas()
            && let Some(schema) = scope.schema.as_deref()
        {
            parts.push(schema);
        }
        parts.push(object);
        format!("SELECT * FROM {} WHERE 1=0", self.syntax.qualified_name(&parts))
    }
}

/// Fetch one source; optional failures are recorded in `report`
fn fetch_source<C>(
    active: &mut ActiveSession,
    source: &CollectionSource<C>,
    restrictions: &[Option<String>],
    report: &mut LoadReport,
) -> CatalogResult<Option<RowSet>> {
    if source.optional {
        match active.fetch_optional_collection(&source.collection, restrictions)? {
            Ok(rowset) => Ok(Some(rowset)),
            Err(err) => {
                report.fallbacks.push(err);
                Ok(None)
            }
        }
    } else {
        active
            .fetch_collection(&source.collection, restrictions)
            .map(Some)
    }
}

fn child_scopes<F>(names: Option<Vec<&str>>, make: F) -> Vec<MetadataScope>
where
    F: Fn(&str) -> MetadataScope,
{
    names
        .unwrap_or_default()
        .into_iter()
        .map(make)
        .collect()
}

/// Create the database/schema named by `scope` if the model lacks them
fn ensure_namespaces(model: &mut MetadataModel, scope: &MetadataScope) {
    if let Some(database) = &scope.database
        && let Some(databases) = model.databases_mut(scope)
    {
        databases.find_or_insert_with(database, || Database::new(database.clone()));
    }
    if let Some(schema) = &scope.schema
        && let Some(schemas) = model.schemas_mut(scope)
    {
        schemas.find_or_insert_with(schema, || Schema::new(schema.clone()));
    }
}

fn clear_databases(model: &mut MetadataModel, scope: &MetadataScope) {
    if let Some(databases) = model.databases_mut(scope) {
        databases.clear();
    }
}

fn missing_container(scope: &MetadataScope) -> CatalogError {
    CatalogError::ConfigurationError(format!("no container for '{}' in the model", scope))
}

fn missing_object(scope: &MetadataScope) -> CatalogError {
    CatalogError::ConfigurationError(format!("object '{}' is not loaded", scope))
}

