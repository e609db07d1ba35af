// src/template.rs

//! Recipe template rendering
//!
//! Templates are conda recipe files that mix two kinds of placeholders:
//! the two this tool owns (`{{ version }}` and `{{ md5 }}`) and everything
//! else, which belongs to the downstream build system's own renderer
//! (`{{ compiler("c") }}`, environment lookups, and so on).
//!
//! The renderer therefore never evaluates a template language. It scans the
//! text for exactly the two recognized tokens and substitutes them; every
//! other byte of the template, placeholder syntax included, is emitted
//! verbatim. Pass-through is a guarantee by construction, not an
//! undefined-variable hook.

use crate::error::{Error, Result};
use crate::package::Package;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// The two tokens owned by this tool, with arbitrary inner spacing
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*(version|md5)\s*\}\}").unwrap());

/// Render one template file for a package.
///
/// The template is looked up at `template_root/<conda_name>/<name>`. A
/// missing file is reported as [`Error::TemplateNotFound`]; whether that is
/// fatal is the caller's decision.
pub fn render(package: &Package, name: &str, template_root: &Path) -> Result<String> {
    let path = template_root.join(package.conda_name()).join(name);
    if !path.is_file() {
        return Err(Error::TemplateNotFound(path.display().to_string()));
    }

    let text = fs::read_to_string(&path)
        .map_err(|e| Error::IoError(format!("Failed to read template {}: {}", path.display(), e)))?;

    Ok(substitute(
        &text,
        package.version().unwrap_or(""),
        package.md5().unwrap_or(""),
    ))
}

/// Substitute the `version` and `md5` tokens, leaving all other text alone
pub fn substitute(text: &str, version: &str, md5: &str) -> String {
    TOKEN_RE
        .replace_all(text, |caps: &Captures| {
            match &caps[1] {
                "version" => version,
                _ => md5,
            }
            .to_string()
        })
        .into_owned()
}
