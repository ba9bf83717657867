// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::ProviderProfile;
use crate::error::{CatalogError, CatalogResult};
use crate::loader::MetadataLoader;
use crate::profiles;

/// Registry of available provider profiles
///
/// Built once at startup and passed by reference to whatever needs to
/// enumerate or select backends. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    /// Profiles keyed by lowercase name
    profiles: BTreeMap<String, Arc<ProviderProfile>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding every built-in profile
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use unified_sql_metadata_catalog::ProviderRegistry;
    ///
    /// let registry = ProviderRegistry::with_builtin_profiles();
    /// assert!(registry.contains("mssql"));
    /// ```
    pub fn with_builtin_profiles() -> Self {
        let mut registry = Self::new();
        for profile in profiles::builtin_profiles() {
            // Built-in profiles are valid by construction
            registry
                .profiles
                .insert(profile.name.to_ascii_lowercase(), Arc::new(profile));
        }
        registry
    }

    /// Register a profile, replacing any profile with the same name
    ///
    /// # Arguments
    ///
    /// * `profile` - The profile to add; it is validated first
    ///
    /// # Returns
    ///
    /// The previously registered profile of that name, if any
    pub fn register(&mut self, profile: ProviderProfile) -> CatalogResult<Option<Arc<ProviderProfile>>> {
        profile.validate()?;
        let key = profile.name.to_ascii_lowercase();
        debug!("Registering provider profile '{}'", profile.name);
        Ok(self.profiles.insert(key, Arc::new(profile)))
    }

    /// Lookup a profile by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<Arc<ProviderProfile>> {
        self.profiles.get(&name.to_ascii_lowercase()).cloned()
    }

    /// Check if a profile exists
    pub fn contains(&self, name: &str) -> bool {
        self.profiles.contains_key(&name.to_ascii_lowercase())
    }

    /// Registered profile names, sorted
    pub fn names(&self) -> Vec<&str> {
        self.profiles.values().map(|p| p.name.as_str()).collect()
    }

    pub fn remove(&mut self, name: &str) -> Option<Arc<ProviderProfile>> {
        self.profiles.remove(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Build a loader for the named profile
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotSupported`] when no profile has that name.
    pub fn loader(&self, name: &str) -> CatalogResult<MetadataLoader> {
        self.get(name)
            .map(MetadataLoader::new)
            .ok_or_else(|| CatalogError::NotSupported(format!("unknown provider profile '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unified_sql_metadata_model::Dialect;

    #[test]
    fn test_builtin_registry() {
        let registry = ProviderRegistry::with_builtin_profiles();
        assert_eq!(registry.len(), 9);
        assert!(registry.contains("MSSQL"));
        assert_eq!(registry.get("firebird").map(|p| p.dialect), Some(Dialect::Firebird));
        assert!(registry.names().contains(&"universal"));
    }

    #[test]
    fn test_register_replaces_and_validates() {
        let mut registry = ProviderRegistry::with_builtin_profiles();
        let mut custom = profiles::odbc();
        custom.description = "patched".to_string();
        let previous = registry.register(custom).unwrap();
        assert!(previous.is_some());
        assert_eq!(registry.get("odbc").unwrap().description, "patched");

        let invalid = ProviderProfile::new("empty", Dialect::Generic);
        assert!(registry.register(invalid).is_err());
        assert!(!registry.contains("empty"));
    }

    #[test]
    fn test_remove_and_unknown_loader() {
        let mut registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        registry.register(profiles::sqlite()).unwrap();
        assert!(registry.loader("sqlite").is_ok());
        assert!(registry.remove("SQLite").is_some());
        assert!(matches!(
            registry.loader("sqlite"),
            Err(CatalogError::NotSupported(_))
        ));
    }
}
