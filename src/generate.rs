// src/generate.rs

//! Recipe generation orchestrator
//!
//! Drives the whole pipeline, strictly sequentially: resolve each package
//! descriptor against the index, render its templates into
//! `recipes/<name>-<version>/`, then inject extra requirement constraints
//! into the written metadata.
//!
//! Failure policy: a package without a metadata template is a fatal
//! configuration error that names the package; a package whose release
//! data cannot be resolved is logged and skipped; everything else
//! propagates.

use crate::error::{Error, Result};
use crate::index::ReleaseIndex;
use crate::inject;
use crate::package::Package;
use crate::template;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Default folder of recipe templates, one subdirectory per package
pub const TEMPLATE_FOLDER: &str = "recipe-templates";

/// Output folder for generated recipes
pub const RECIPE_FOLDER: &str = "recipes";

/// Template files in a package's template directory, hidden files excluded.
/// An unreadable directory yields an empty list; metadata selection still
/// runs and reports its own error.
fn template_files(package_template_dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(package_template_dir) else {
        return Vec::new();
    };
    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}

/// Pick the metadata template for a package: a version-specific
/// `meta-<version>.yaml` wins over the generic `meta.yaml`
fn select_meta_template(
    package: &Package,
    version: &str,
    package_template_dir: &Path,
) -> Result<String> {
    let versioned = format!("meta-{}.yaml", version);
    if package_template_dir.join(&versioned).is_file() {
        return Ok(versioned);
    }
    if package_template_dir.join("meta.yaml").is_file() {
        return Ok("meta.yaml".to_string());
    }
    Err(Error::ConfigError(format!(
        "no meta.yaml found for package '{}'",
        package.conda_name()
    )))
}

/// Generate one recipe directory per package descriptor
pub fn write_recipes(
    packages: &mut [Package],
    template_dir: &Path,
    recipe_root: &Path,
    index: &dyn ReleaseIndex,
) -> Result<()> {
    fs::create_dir_all(recipe_root).map_err(|e| {
        Error::IoError(format!(
            "Failed to create {}: {}",
            recipe_root.display(),
            e
        ))
    })?;

    for package in packages.iter_mut() {
        if let Err(e) = package.resolve(index) {
            warn!("Skipping {}: {}", package.conda_name(), e);
            continue;
        }
        let Some(version) = package.version().map(|v| v.to_string()) else {
            continue;
        };

        info!("Writing recipe for {}-{}.", package.conda_name(), version);

        let recipe_dir = recipe_root.join(format!("{}-{}", package.conda_name(), version));
        fs::create_dir_all(&recipe_dir).map_err(|e| {
            Error::IoError(format!("Failed to create {}: {}", recipe_dir.display(), e))
        })?;

        let package_template_dir = template_dir.join(package.conda_name());
        let templates = template_files(&package_template_dir);

        let meta_template = select_meta_template(package, &version, &package_template_dir)?;
        let rendered = template::render(package, &meta_template, template_dir)?;
        let meta_path = recipe_dir.join("meta.yaml");
        fs::write(&meta_path, rendered).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {}", meta_path.display(), e))
        })?;

        // Auxiliary files: everything except metadata templates
        for name in &templates {
            if name.contains("meta") {
                continue;
            }
            let rendered = template::render(package, name, template_dir)?;
            let out_path = recipe_dir.join(name);
            fs::write(&out_path, rendered).map_err(|e| {
                Error::IoError(format!("Failed to write {}: {}", out_path.display(), e))
            })?;
        }

        inject::inject(package, &recipe_dir)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ReleaseArtifact;
    use std::fs;

    struct StubIndex;

    impl ReleaseIndex for StubIndex {
        fn releases(&self, _name: &str) -> Vec<String> {
            vec!["1.0".to_string()]
        }

        fn release_artifacts(&self, _name: &str, version: &str) -> Vec<ReleaseArtifact> {
            vec![ReleaseArtifact {
                kind: "sdist".to_string(),
                url: format!("https://files.example/demo-{}.tar.gz", version),
                md5: Some("abc123".to_string()),
            }]
        }
    }

    fn write_template(template_dir: &Path, package: &str, name: &str, text: &str) {
        let dir = template_dir.join(package);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(name), text).unwrap();
    }

    #[test]
    fn test_missing_meta_template_is_fatal_and_names_package() {
        let template_dir = tempfile::tempdir().unwrap();
        let recipe_root = tempfile::tempdir().unwrap();
        write_template(template_dir.path(), "demo", "build.sh", "echo hi\n");

        let mut packages = vec![Package::new("demo", Some("1.0".to_string()))];
        let err = write_recipes(
            &mut packages,
            template_dir.path(),
            recipe_root.path(),
            &StubIndex,
        )
        .unwrap_err();

        match err {
            Error::ConfigError(msg) => assert!(msg.contains("demo")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }

    #[test]
    fn test_version_specific_meta_preferred() {
        let template_dir = tempfile::tempdir().unwrap();
        let recipe_root = tempfile::tempdir().unwrap();
        write_template(template_dir.path(), "demo", "meta.yaml", "generic\n");
        write_template(template_dir.path(), "demo", "meta-1.0.yaml", "versioned\n");

        let mut packages = vec![Package::new("demo", Some("1.0".to_string()))];
        write_recipes(
            &mut packages,
            template_dir.path(),
            recipe_root.path(),
            &StubIndex,
        )
        .unwrap();

        let meta = fs::read_to_string(recipe_root.path().join("demo-1.0/meta.yaml")).unwrap();
        assert_eq!(meta, "versioned\n");
    }

    #[test]
    fn test_auxiliary_files_rendered_and_meta_variants_skipped() {
        let template_dir = tempfile::tempdir().unwrap();
        let recipe_root = tempfile::tempdir().unwrap();
        write_template(template_dir.path(), "demo", "meta.yaml", "m\n");
        write_template(template_dir.path(), "demo", "meta-old.yaml", "old\n");
        write_template(template_dir.path(), "demo", "build.sh", "v={{ version }}\n");
        write_template(template_dir.path(), "demo", ".hidden", "x\n");

        let mut packages = vec![Package::new("demo", Some("1.0".to_string()))];
        write_recipes(
            &mut packages,
            template_dir.path(),
            recipe_root.path(),
            &StubIndex,
        )
        .unwrap();

        let recipe_dir = recipe_root.path().join("demo-1.0");
        assert_eq!(
            fs::read_to_string(recipe_dir.join("build.sh")).unwrap(),
            "v=1.0\n"
        );
        assert!(!recipe_dir.join("meta-old.yaml").exists());
        assert!(!recipe_dir.join(".hidden").exists());
    }

    #[test]
    fn test_existing_recipe_directory_is_reused() {
        let template_dir = tempfile::tempdir().unwrap();
        let recipe_root = tempfile::tempdir().unwrap();
        write_template(template_dir.path(), "demo", "meta.yaml", "m\n");
        fs::create_dir_all(recipe_root.path().join("demo-1.0")).unwrap();
        fs::write(recipe_root.path().join("demo-1.0/keep.txt"), "keep").unwrap();

        let mut packages = vec![Package::new("demo", Some("1.0".to_string()))];
        write_recipes(
            &mut packages,
            template_dir.path(),
            recipe_root.path(),
            &StubIndex,
        )
        .unwrap();

        // Pre-existing contents are left alone, not cleared
        assert_eq!(
            fs::read_to_string(recipe_root.path().join("demo-1.0/keep.txt")).unwrap(),
            "keep"
        );
    }
}
