// Profile registry
// Central registry for looking up aircraft profiles by id

use super::builtin::{self, DEFAULT_PROFILE_ID};
use super::json::{JsonProfile, LoadError};
use super::types::Profile;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry for aircraft profiles
///
/// Filled once at startup and read-only afterwards. Lookups never fail:
/// unknown ids resolve to the default profile.
pub struct ProfileRegistry {
    by_id: BTreeMap<String, Arc<Profile>>,
    default_id: String,
}

impl ProfileRegistry {
    /// Create a registry holding only a default profile
    fn new() -> Self {
        let default = Arc::new(builtin::pmdg_777());
        let mut by_id = BTreeMap::new();
        by_id.insert(default.id.clone(), default);
        Self {
            by_id,
            default_id: DEFAULT_PROFILE_ID.to_string(),
        }
    }

    /// Create a registry with builtin profiles pre-loaded
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.load_builtins();
        registry
    }

    /// Load all builtin profiles
    pub fn load_builtins(&mut self) {
        for profile in builtin::all() {
            self.register(profile);
        }
    }

    /// Register a profile, replacing any profile with the same id
    pub fn register(&mut self, profile: Profile) {
        if self.by_id.contains_key(&profile.id) {
            debug!("Replacing profile {}", profile.id);
        }
        self.by_id.insert(profile.id.clone(), Arc::new(profile));
    }

    /// Choose which registered profile unknown ids fall back to
    ///
    /// Returns false (and keeps the current default) if `id` is not registered.
    pub fn set_default(&mut self, id: &str) -> bool {
        if self.by_id.contains_key(id) {
            self.default_id = id.to_string();
            true
        } else {
            false
        }
    }

    /// Resolve an aircraft id to its profile, falling back to the default
    pub fn resolve(&self, id: Option<&str>) -> Arc<Profile> {
        id.and_then(|id| self.find(id))
            .unwrap_or_else(|| self.default_profile())
    }

    /// Find profile by exact id
    pub fn find(&self, id: &str) -> Option<Arc<Profile>> {
        self.by_id.get(id).cloned()
    }

    /// The fallback profile
    pub fn default_profile(&self) -> Arc<Profile> {
        // `default_id` is only ever set to a registered id
        self.by_id
            .get(&self.default_id)
            .cloned()
            .unwrap_or_else(|| Arc::new(builtin::pmdg_777()))
    }

    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Get all registered profiles, sorted by id
    pub fn all_profiles(&self) -> Vec<Arc<Profile>> {
        self.by_id.values().cloned().collect()
    }

    /// Get the number of registered profiles
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Load a profile from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), LoadError> {
        let profile = JsonProfile::load_from_file(path)?;
        self.register(profile.into());
        Ok(())
    }

    /// Load all JSON profiles from a directory
    pub fn load_from_directory<P: AsRef<Path>>(&mut self, dir: P) -> Result<usize, LoadError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(LoadError::Io(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let mut count = 0;
        for entry in std::fs::read_dir(dir).map_err(|e| LoadError::Io(e.to_string()))? {
            let entry = entry.map_err(|e| LoadError::Io(e.to_string()))?;
            let path = entry.path();

            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match self.load_from_file(&path) {
                    Ok(()) => count += 1,
                    Err(e) => {
                        warn!(
                            "Failed to load profile from {}: {}",
                            path.display(),
                            e
                        );
                    }
                }
            }
        }

        Ok(count)
    }
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
