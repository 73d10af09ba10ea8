//! Read/write seed manifests: the unit declarations plus the relation metadata
//! of every record kind they produce.
//!
//! JSON and TOML are both accepted; the format is chosen by file extension.

use crate::relations::{RecordCatalog, RelationField};
use crate::unit::GenerationUnit;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const SEEDPLAN_DIR: &str = ".seedplan";
const MANIFEST_FILE: &str = "manifest.json";
const CURRENT_VERSION: &str = "1.0";

/// Units to plan and the record kinds they touch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: String,
    /// Units in declaration order. Order matters for tie-breaking.
    #[serde(default)]
    pub units: Vec<GenerationUnit>,
    /// Relation fields per record kind.
    #[serde(default)]
    pub record_kinds: BTreeMap<String, Vec<RelationField>>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            units: Vec::new(),
            record_kinds: BTreeMap::new(),
        }
    }
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relation metadata as a queryable catalog.
    pub fn catalog(&self) -> RecordCatalog {
        RecordCatalog::from(self.record_kinds.clone())
    }
}

/// Path to the default manifest for a project root.
pub fn manifest_file(project_root: &Path) -> PathBuf {
    project_root.join(SEEDPLAN_DIR).join(MANIFEST_FILE)
}

/// Validate a manifest's schema version.
pub fn validate_version(manifest: &Manifest) -> Result<()> {
    if manifest.version != CURRENT_VERSION {
        anyhow::bail!(
            "manifest version mismatch: expected {}, found {}",
            CURRENT_VERSION,
            manifest.version
        );
    }
    Ok(())
}

pub fn from_json(json: &str) -> Result<Manifest> {
    let manifest: Manifest =
        serde_json::from_str(json).context("failed to deserialize manifest from JSON")?;
    validate_version(&manifest)?;
    Ok(manifest)
}

pub fn from_toml(text: &str) -> Result<Manifest> {
    let manifest: Manifest =
        toml::from_str(text).context("failed to deserialize manifest from TOML")?;
    validate_version(&manifest)?;
    Ok(manifest)
}

pub fn to_json(manifest: &Manifest) -> Result<String> {
    serde_json::to_string_pretty(manifest).context("failed to serialize manifest to JSON")
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("toml"))
}

/// Load a manifest from disk.
pub fn load(path: &Path) -> Result<Manifest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read manifest from {}", path.display()))?;
    let manifest = if is_toml(path) {
        from_toml(&text)
    } else {
        from_json(&text)
    }
    .with_context(|| format!("invalid manifest {}", path.display()))?;

    tracing::debug!(
        units = manifest.units.len(),
        record_kinds = manifest.record_kinds.len(),
        "loaded manifest from {}",
        path.display()
    );
    Ok(manifest)
}

/// Save a manifest as JSON, creating parent directories if needed.
pub fn save(path: &Path, manifest: &Manifest) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    let json = to_json(manifest)?;
    fs::write(path, json)
        .with_context(|| format!("failed to write manifest to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relations::RelationSource;

    #[test]
    fn test_version_mismatch() {
        let err = from_json(r#"{"version": "0.1", "units": []}"#).unwrap_err();
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_toml_manifest() {
        let text = r#"
version = "1.0"

[[units]]
name = "Customer"
record_kind = "shop.customer"

[[units]]
name = "Order"
record_kind = "shop.order"
execution_priority = 2

[[record_kinds."shop.order"]]
field_name = "customer"
target_record_kind = "shop.customer"
"#;
        let manifest = from_toml(text).unwrap();
        assert_eq!(manifest.units.len(), 2);
        assert_eq!(manifest.units[1].execution_priority, 2);
        let rels = manifest.catalog().relations_of("shop.order").unwrap();
        assert_eq!(rels[0].field_name, "customer");
        assert!(!rels[0].nullable);
    }
}
