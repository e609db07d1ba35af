// src/index/client.rs

//! HTTP client for the PyPI JSON index
//!
//! Wraps reqwest's blocking client around the `/pypi/{name}/json` endpoint.
//! One request answers both index queries: the project document carries the
//! full release map including per-release artifact lists.

use crate::error::{Error, Result};
use crate::index::{ReleaseArtifact, ReleaseIndex};
use crate::version;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Base URL of the PyPI JSON API
const PYPI_JSON_URL: &str = "https://pypi.org/pypi";

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Project document returned by the JSON index
#[derive(Debug, Deserialize)]
struct ProjectDocument {
    releases: HashMap<String, Vec<ArtifactEntry>>,
}

/// One artifact record inside a release list
#[derive(Debug, Deserialize)]
struct ArtifactEntry {
    packagetype: String,
    url: String,
    #[serde(default)]
    md5_digest: Option<String>,
    #[serde(default)]
    digests: Option<Digests>,
}

#[derive(Debug, Deserialize)]
struct Digests {
    #[serde(default)]
    md5: Option<String>,
}

impl ArtifactEntry {
    /// Prefer the digests map, fall back to the legacy top-level field
    fn md5(&self) -> Option<String> {
        self.digests
            .as_ref()
            .and_then(|d| d.md5.clone())
            .or_else(|| self.md5_digest.clone())
    }
}

/// Blocking client for the PyPI JSON index
pub struct PypiClient {
    client: Client,
    base_url: String,
}

impl PypiClient {
    /// Create a client against the public index
    pub fn new() -> Result<Self> {
        Self::with_base_url(PYPI_JSON_URL)
    }

    /// Create a client against an alternate index base URL
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch and parse the project document for a package.
    ///
    /// A single attempt is made; any transport, HTTP, or parse failure is
    /// returned as a [`Error::DownloadError`].
    fn project(&self, name: &str) -> Result<ProjectDocument> {
        let url = format!("{}/{}/json", self.base_url, name);
        debug!("Fetching project document from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::DownloadError(format!("Failed to fetch {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::DownloadError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        response
            .json()
            .map_err(|e| Error::DownloadError(format!("Failed to parse index JSON: {e}")))
    }
}

impl ReleaseIndex for PypiClient {
    fn releases(&self, name: &str) -> Vec<String> {
        match self.project(name) {
            Ok(doc) => {
                let mut versions: Vec<String> = doc.releases.into_keys().collect();
                version::sort_newest_first(&mut versions);
                debug!("Index lists {} releases for {}", versions.len(), name);
                versions
            }
            Err(e) => {
                warn!("Release listing for {} failed: {}", name, e);
                Vec::new()
            }
        }
    }

    fn release_artifacts(&self, name: &str, version: &str) -> Vec<ReleaseArtifact> {
        match self.project(name) {
            Ok(mut doc) => doc
                .releases
                .remove(version)
                .unwrap_or_default()
                .into_iter()
                .map(|entry| ReleaseArtifact {
                    md5: entry.md5(),
                    kind: entry.packagetype,
                    url: entry.url,
                })
                .collect(),
            Err(e) => {
                warn!("Artifact listing for {} {} failed: {}", name, version, e);
                Vec::new()
            }
        }
    }
}
