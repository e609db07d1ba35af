// src/package.rs

//! Package descriptor
//!
//! A [`Package`] combines one concrete version of a requirements entry with
//! the release metadata resolved from the index. Construction is eager and
//! cheap; the remote lookup happens in an explicit [`Package::resolve`] step
//! whose result is memoized for the life of the descriptor.

use crate::error::{Error, Result};
use crate::index::{ReleaseIndex, SOURCE_KIND};
use crate::template;
use serde_yaml::Value;
use std::path::Path;
use tracing::warn;

/// Interpreter tags used when a package carries no extra metadata
const DEFAULT_BUILD_PYTHONS: [&str; 2] = ["27", "35"];

/// Source archive of a resolved release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArchive {
    pub url: String,
    pub md5: String,
}

/// Release metadata resolved from the index.
///
/// `source` is `None` when the release publishes no source archive; that is
/// an expected condition, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub version: String,
    pub source: Option<SourceArchive>,
}

/// A package to be built, at one concrete version
#[derive(Debug, Clone)]
pub struct Package {
    /// Name as written in the requirements file; lower-cased for output
    /// paths by [`Package::conda_name`]
    pub name: String,
    /// Name on the index, when it differs from `name`
    pub pypi_name: Option<String>,
    /// Explicit version pin; `None` means build the newest release
    pub required_version: Option<String>,
    /// Opaque options passed through to build tooling
    pub setup_options: Option<Value>,
    pub numpy_compiled_extensions: bool,
    pub python_requirements: Option<String>,
    pub numpy_requirements: Option<String>,
    pub excluded_platforms: Vec<String>,
    pub include_extras: bool,
    resolved: Option<Resolved>,
    build_pythons: Option<Vec<String>>,
}

impl Package {
    /// Create a descriptor with no optional fields set
    pub fn new(name: impl Into<String>, required_version: Option<String>) -> Self {
        Self {
            name: name.into(),
            pypi_name: None,
            required_version: required_version.map(|v| v.trim().to_string()),
            setup_options: None,
            numpy_compiled_extensions: false,
            python_requirements: None,
            numpy_requirements: None,
            excluded_platforms: Vec::new(),
            include_extras: false,
            resolved: None,
            build_pythons: None,
        }
    }

    /// Name used for output paths; always lower-case so recipe directories
    /// are deterministic regardless of how the entry was spelled
    pub fn conda_name(&self) -> String {
        self.name.to_lowercase()
    }

    /// Name used to query the index; preserves the original case
    pub fn pypi_name(&self) -> &str {
        self.pypi_name.as_deref().unwrap_or(&self.name)
    }

    /// True when the pinned version carries an alphabetic tag (`1.0.dev0`,
    /// `2.0rc1`), the usual marker of a pre-release build
    pub fn is_dev(&self) -> bool {
        self.required_version
            .as_deref()
            .is_some_and(|v| v.chars().any(|c| c.is_ascii_alphabetic()))
    }

    /// Resolve version, source URL, and checksum from the index.
    ///
    /// Populated exactly once; later calls return without touching the
    /// index. A release without a source archive resolves with
    /// `source: None` after a logged notice. The only hard failure is a
    /// package with no pin whose release list comes back empty, since then
    /// there is no version to name the recipe after.
    pub fn resolve(&mut self, index: &dyn ReleaseIndex) -> Result<()> {
        if self.resolved.is_some() {
            return Ok(());
        }

        let version = match &self.required_version {
            Some(v) => v.clone(),
            None => index
                .releases(self.pypi_name())
                .into_iter()
                .next()
                .ok_or_else(|| {
                    Error::DownloadError(format!(
                        "no releases found on the index for '{}'",
                        self.pypi_name()
                    ))
                })?,
        };

        let source = index
            .release_artifacts(self.pypi_name(), &version)
            .into_iter()
            .find(|a| a.kind == SOURCE_KIND)
            .map(|a| SourceArchive {
                url: a.url,
                md5: a.md5.unwrap_or_default(),
            });

        if source.is_none() {
            warn!("No source found for {}: {}", self.pypi_name(), version);
        }

        self.resolved = Some(Resolved { version, source });
        Ok(())
    }

    /// Resolved release metadata, if [`Package::resolve`] has run
    pub fn resolved(&self) -> Option<&Resolved> {
        self.resolved.as_ref()
    }

    /// Resolved version string
    pub fn version(&self) -> Option<&str> {
        self.resolved.as_ref().map(|r| r.version.as_str())
    }

    /// Source archive URL, absent when the release has no source archive
    pub fn url(&self) -> Option<&str> {
        self.resolved
            .as_ref()
            .and_then(|r| r.source.as_ref())
            .map(|s| s.url.as_str())
    }

    /// MD5 checksum of the source archive
    pub fn md5(&self) -> Option<&str> {
        self.resolved
            .as_ref()
            .and_then(|r| r.source.as_ref())
            .map(|s| s.md5.as_str())
    }

    /// Last path segment of the source URL
    pub fn filename(&self) -> Option<&str> {
        self.url().map(|u| u.rsplit('/').next().unwrap_or(u))
    }

    /// Target interpreter tags for this package.
    ///
    /// Read from the `extra.pythons` section of the package's own
    /// `meta.yaml` template; anything that prevents reading it (no
    /// template, unparseable YAML, missing key) falls back to the fixed
    /// default list. Memoized per descriptor.
    pub fn build_pythons(&mut self, template_dir: &Path) -> Vec<String> {
        if let Some(pythons) = &self.build_pythons {
            return pythons.clone();
        }

        let pythons = self
            .extra_meta(template_dir)
            .and_then(|meta| python_tags(&meta))
            .unwrap_or_else(|| {
                DEFAULT_BUILD_PYTHONS
                    .iter()
                    .map(|p| p.to_string())
                    .collect()
            });

        self.build_pythons = Some(pythons.clone());
        pythons
    }

    /// Render and parse this package's generic metadata template
    fn extra_meta(&self, template_dir: &Path) -> Option<Value> {
        let rendered = template::render(self, "meta.yaml", template_dir).ok()?;
        serde_yaml::from_str(&rendered).ok()
    }
}

/// Extract `extra.pythons` as strings; index metadata may spell the tags
/// as numbers, so scalars are stringified for comparison downstream
fn python_tags(meta: &Value) -> Option<Vec<String>> {
    let tags = meta.get("extra")?.get("pythons")?.as_sequence()?;
    Some(
        tags.iter()
            .filter_map(|tag| match tag {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
    )
}
