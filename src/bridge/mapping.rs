// Variable mapping document
// Key -> expression tables, shared or per aircraft profile

use super::expr::VariableExpr;
use crate::profile::LoadError;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// One `{key, lvar}` entry of the mapping document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariableDescriptor {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub lvar: String,
}

#[derive(Debug, Default, Deserialize)]
struct MappingDocument {
    #[serde(default)]
    vars: Vec<VariableDescriptor>,
    #[serde(default)]
    profiles: BTreeMap<String, Vec<VariableDescriptor>>,
}

/// Ordered key -> expression table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    entries: Vec<(String, VariableExpr)>,
}

impl VariableTable {
    fn from_descriptors(descriptors: Vec<VariableDescriptor>) -> Self {
        let mut entries: Vec<(String, VariableExpr)> = Vec::with_capacity(descriptors.len());
        for desc in descriptors {
            let key = desc.key.trim();
            if key.is_empty() || desc.lvar.trim().is_empty() {
                debug!("Skipping incomplete variable entry {:?}", desc);
                continue;
            }
            if entries.iter().any(|(k, _)| k == key) {
                warn!("Duplicate variable key '{}', keeping the first entry", key);
                continue;
            }
            entries.push((key.to_string(), VariableExpr::parse(&desc.lvar)));
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&VariableExpr> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, e)| e)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableExpr)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Entries whose value can be read back
    pub fn readable(&self) -> impl Iterator<Item = (&str, &VariableExpr)> {
        self.iter().filter(|(_, e)| e.is_readable())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All variable tables, loaded once at startup
#[derive(Debug, Clone, Default)]
pub struct VariableMap {
    shared: VariableTable,
    per_profile: BTreeMap<String, VariableTable>,
}

impl VariableMap {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the mapping document; a missing file yields an empty map
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        if !path.exists() {
            warn!("Variable mapping {} not found", path.display());
            return Ok(Self::empty());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoadError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let doc: MappingDocument =
            serde_json::from_str(json).map_err(|e| LoadError::Parse(e.to_string()))?;
        Ok(Self {
            shared: VariableTable::from_descriptors(doc.vars),
            per_profile: doc
                .profiles
                .into_iter()
                .map(|(id, vars)| (id, VariableTable::from_descriptors(vars)))
                .collect(),
        })
    }

    /// Table for a profile: its own when present, otherwise the shared one
    pub fn table(&self, profile: &str) -> &VariableTable {
        self.per_profile.get(profile).unwrap_or(&self.shared)
    }

    pub fn shared(&self) -> &VariableTable {
        &self.shared
    }

    /// Profile ids with their own table
    pub fn profile_ids(&self) -> impl Iterator<Item = &str> {
        self.per_profile.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "vars": [
            {"key": "FLAPS_OVERRIDE", "lvar": "L:FLAPS_TGT"},
            {"key": "GEAR_TOGGLE", "lvar": "(>K:GEAR_TOGGLE)"},
            {"key": "", "lvar": "L:IGNORED"},
            {"key": "FLAPS_OVERRIDE", "lvar": "L:DUPLICATE"}
        ],
        "profiles": {
            "fenix_a320": [{"key": "STROBE", "lvar": "L:S_OH_EXT_LT_STROBE"}]
        }
    }"#;

    #[test]
    fn test_shared_table() {
        let map = VariableMap::from_json(DOC).unwrap();
        let table = map.table("pmdg_777");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("FLAPS_OVERRIDE").unwrap().raw(), "L:FLAPS_TGT");
        assert_eq!(table.readable().count(), 1);
    }

    #[test]
    fn test_profile_table() {
        let map = VariableMap::from_json(DOC).unwrap();
        let table = map.table("fenix_a320");
        assert_eq!(table.len(), 1);
        assert!(table.get("FLAPS_OVERRIDE").is_none());
        assert_eq!(map.profile_ids().collect::<Vec<_>>(), vec!["fenix_a320"]);
    }

    #[test]
    fn test_missing_file_is_empty() {
        let map = VariableMap::load("/nonexistent/virjoy/lvars.json").unwrap();
        assert!(map.shared().is_empty());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            VariableMap::from_json("{\"vars\": 3}"),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lvars.json");
        std::fs::write(&path, DOC).unwrap();
        let map = VariableMap::load(&path).unwrap();
        assert_eq!(map.shared().len(), 2);
    }
}
