// src/requirements.rs

//! Requirements document loading
//!
//! The requirements file is an ordered YAML list of package entries. Each
//! entry expands into one descriptor per concrete version to build: a
//! pinned entry yields exactly one, an unpinned entry yields the newest
//! release from the index plus one per listed past version not already in
//! that entry's expansion.

use crate::error::{Error, Result};
use crate::index::ReleaseIndex;
use crate::package::Package;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// One raw entry of the requirements document
#[derive(Debug, Clone, Deserialize)]
pub struct RequirementEntry {
    pub name: String,
    #[serde(default)]
    pub pypi_name: Option<String>,
    #[serde(default, deserialize_with = "optional_version")]
    pub version: Option<String>,
    #[serde(default, deserialize_with = "version_list")]
    pub past_versions: Vec<String>,
    #[serde(default)]
    pub setup_options: Option<Value>,
    #[serde(default)]
    pub numpy_compiled_extensions: bool,
    #[serde(default)]
    pub python: Option<String>,
    #[serde(default)]
    pub numpy_build_restrictions: Option<String>,
    #[serde(default)]
    pub excluded_platforms: Vec<String>,
    #[serde(default)]
    pub include_extras: bool,
}

impl RequirementEntry {
    fn pypi_name(&self) -> &str {
        self.pypi_name.as_deref().unwrap_or(&self.name)
    }

    /// Build a descriptor for one concrete version, copying every optional
    /// field of the entry verbatim
    fn to_package(&self, version: String) -> Package {
        let mut package = Package::new(self.name.clone(), Some(version));
        package.pypi_name = self.pypi_name.clone();
        package.setup_options = self.setup_options.clone();
        package.numpy_compiled_extensions = self.numpy_compiled_extensions;
        package.python_requirements = self.python.clone();
        package.numpy_requirements = self.numpy_build_restrictions.clone();
        package.excluded_platforms = self.excluded_platforms.clone();
        package.include_extras = self.include_extras;
        package
    }
}

/// Version fields may be written as bare YAML scalars (`version: 1.2`),
/// which parse as numbers; coerce any scalar to its string form
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn optional_version<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(scalar_to_string))
}

fn version_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.iter().filter_map(scalar_to_string).collect())
}

/// Read and parse the requirements document into package descriptors
pub fn load(path: &Path, index: &dyn ReleaseIndex) -> Result<Vec<Package>> {
    let text = fs::read_to_string(path).map_err(|e| {
        Error::IoError(format!(
            "Failed to read requirements file {}: {}",
            path.display(),
            e
        ))
    })?;

    let entries: Vec<RequirementEntry> = serde_yaml::from_str(&text)
        .map_err(|e| Error::ParseError(format!("Invalid requirements document: {}", e)))?;

    debug!("Loaded {} requirement entries", entries.len());
    Ok(expand(entries, index))
}

/// Expand entries into one descriptor per concrete version.
///
/// For an unpinned entry the newest index release comes first; each past
/// version is added unless it already appears in this entry's version list.
/// An unpinned entry whose release listing comes back empty has no version
/// to build and is skipped with a warning.
pub fn expand(entries: Vec<RequirementEntry>, index: &dyn ReleaseIndex) -> Vec<Package> {
    let mut packages = Vec::new();

    for entry in entries {
        let mut versions: Vec<String> = Vec::new();

        match &entry.version {
            Some(version) => versions.push(version.clone()),
            None => {
                match index.releases(entry.pypi_name()).into_iter().next() {
                    Some(latest) => versions.push(latest),
                    None => {
                        warn!(
                            "No releases found for {}, skipping entry",
                            entry.pypi_name()
                        );
                        continue;
                    }
                }
                for past in &entry.past_versions {
                    if !versions.contains(past) {
                        versions.push(past.clone());
                    }
                }
            }
        }

        for version in versions {
            packages.push(entry.to_package(version));
        }
    }

    packages
}
