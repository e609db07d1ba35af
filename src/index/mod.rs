// src/index/mod.rs

//! Package index access
//!
//! The generator only needs two queries against the remote index: the list
//! of known releases for a package (newest first) and the downloadable
//! artifacts of one release. Both sit behind the [`ReleaseIndex`] trait so
//! the loader and orchestrator can be exercised against a stub in tests.
//!
//! Index failures are deliberately soft: a query that cannot be answered
//! returns an empty sequence and a warning, never an error. Each query is
//! attempted exactly once; there is no retry policy.

mod client;

pub use client::PypiClient;

/// Artifact kind of a buildable source archive on the index
pub const SOURCE_KIND: &str = "sdist";

/// One downloadable artifact of a release
#[derive(Debug, Clone)]
pub struct ReleaseArtifact {
    /// Artifact kind as reported by the index (`sdist`, `bdist_wheel`, ...)
    pub kind: String,
    /// Download URL
    pub url: String,
    /// MD5 digest of the artifact, when the index reports one
    pub md5: Option<String>,
}

/// Read-only view of the remote package index
pub trait ReleaseIndex {
    /// All known release versions of a package, sorted newest-first.
    ///
    /// Returns an empty list if the package is unknown or the index is
    /// unreachable.
    fn releases(&self, name: &str) -> Vec<String>;

    /// Downloadable artifacts of one release.
    ///
    /// Returns an empty list if the release has none or cannot be queried.
    fn release_artifacts(&self, name: &str, version: &str) -> Vec<ReleaseArtifact>;
}
