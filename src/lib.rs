// src/lib.rs

//! Extruder: conda recipe generation from templates and PyPI metadata
//!
//! A batch generator: read a YAML requirements list, resolve each package's
//! version, source URL, and checksum from the package index, render recipe
//! templates into per-version output directories, then patch the generated
//! metadata with extra python/numpy constraints.
//!
//! # Architecture
//!
//! - Sequential by design: one package, one template, one network call at
//!   a time; parallelism belongs to outer tooling if ever needed
//! - Explicit resolution: descriptors are built eagerly and resolved
//!   against the index in a separate, memoized step
//! - Pass-through templates: only the `version` and `md5` tokens are
//!   substituted, everything else survives for the downstream renderer

mod error;
pub mod generate;
pub mod index;
pub mod inject;
pub mod package;
pub mod requirements;
pub mod template;
pub mod version;

pub use error::{Error, Result};
pub use generate::{write_recipes, RECIPE_FOLDER, TEMPLATE_FOLDER};
pub use index::{PypiClient, ReleaseArtifact, ReleaseIndex};
pub use package::{Package, Resolved, SourceArchive};
pub use requirements::RequirementEntry;
pub use version::ReleaseVersion;
