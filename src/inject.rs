// src/inject.rs

//! Requirement injection into generated metadata
//!
//! Two dependencies get special treatment: build-time restrictions on
//! `python` and `numpy` may be tighter than what the package itself
//! declares, so the generator appends them to the rendered `meta.yaml`
//! after the fact.
//!
//! The document is patched line by line rather than re-serialized: every
//! line that is not part of the touched `requirements.build` /
//! `requirements.run` lists survives byte-for-byte, so comments and key
//! order are preserved. Inline flow lists (`build: [numpy]`) are rewritten
//! in block style when touched.

use crate::error::{Error, Result};
use crate::package::Package;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)(build|run):\s*(.*)$").unwrap());

/// Append python/numpy constraint lines to the recipe's metadata file.
///
/// No-op when the descriptor carries neither constraint.
pub fn inject(package: &Package, recipe_dir: &Path) -> Result<()> {
    let mut specs = Vec::new();
    if let Some(python) = &package.python_requirements {
        specs.push(format!("python {}", python));
    }
    if let Some(numpy) = &package.numpy_requirements {
        specs.push(format!("numpy {}", numpy));
    }
    if specs.is_empty() {
        return Ok(());
    }

    let meta_path = recipe_dir.join("meta.yaml");
    let text = fs::read_to_string(&meta_path).map_err(|e| {
        Error::IoError(format!("Failed to read {}: {}", meta_path.display(), e))
    })?;

    debug!(
        "Injecting {} constraint(s) into {}",
        specs.len(),
        meta_path.display()
    );
    let patched = append_requirements(&text, &specs)?;

    fs::write(&meta_path, patched)
        .map_err(|e| Error::IoError(format!("Failed to write {}: {}", meta_path.display(), e)))
}

/// Indentation width of a line, in characters
fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

fn is_blank_or_comment(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// A `build:` or `run:` section found inside the requirements block
struct Section {
    header_idx: usize,
    header_indent: usize,
    /// Text after the colon; non-empty for inline flow lists
    inline_rest: String,
    /// Index of the last `- item` line, if the section is in block style
    last_item_idx: Option<usize>,
    item_indent: usize,
}

/// Append `specs` to both the `build` and `run` lists of the top-level
/// `requirements` section, leaving every other line untouched.
fn append_requirements(text: &str, specs: &[String]) -> Result<String> {
    let had_final_newline = text.ends_with('\n');
    let mut lines: Vec<String> = text.lines().map(|l| l.to_string()).collect();

    let req_idx = lines
        .iter()
        .position(|l| {
            let trimmed = l.trim_end();
            trimmed == "requirements:" || trimmed.starts_with("requirements: #")
        })
        .ok_or_else(|| Error::ParseError("metadata has no requirements section".to_string()))?;
    let req_indent = indent_of(&lines[req_idx]);

    // Extent of the requirements block: everything more indented than the
    // requirements key itself, with blank and comment lines allowed inside
    let mut block_end = req_idx + 1;
    while block_end < lines.len() {
        let line = &lines[block_end];
        if is_blank_or_comment(line) || indent_of(line) > req_indent {
            block_end += 1;
        } else {
            break;
        }
    }

    let mut sections = Vec::new();
    for idx in (req_idx + 1)..block_end {
        let Some(caps) = SECTION_RE.captures(&lines[idx]) else {
            continue;
        };
        let header_indent = caps[1].len();
        if header_indent <= req_indent {
            continue;
        }
        // A list item like `- build:` is not a section header
        if lines[idx].trim_start().starts_with('-') {
            continue;
        }

        let mut inline_rest = caps[3].trim().to_string();
        // A trailing comment on the header is not an inline list
        if inline_rest.starts_with('#') {
            inline_rest.clear();
        }

        // Locate the block-style list items following the header
        let mut last_item_idx = None;
        let mut item_indent = header_indent + 2;
        let mut scan = idx + 1;
        while scan < block_end {
            let line = &lines[scan];
            if is_blank_or_comment(line) {
                scan += 1;
                continue;
            }
            if indent_of(line) <= header_indent {
                break;
            }
            if line.trim_start().starts_with('-') {
                if last_item_idx.is_none() {
                    item_indent = indent_of(line);
                }
                last_item_idx = Some(scan);
            }
            scan += 1;
        }

        sections.push(Section {
            header_idx: idx,
            header_indent,
            inline_rest,
            last_item_idx,
            item_indent,
        });
    }

    let found_build = sections.iter().any(|s| lines[s.header_idx].trim_start().starts_with("build"));
    let found_run = sections.iter().any(|s| lines[s.header_idx].trim_start().starts_with("run"));
    if !found_build || !found_run {
        return Err(Error::ParseError(
            "metadata requirements section is missing a build or run list".to_string(),
        ));
    }

    // Patch bottom-up so earlier indices stay valid
    sections.sort_by(|a, b| b.header_idx.cmp(&a.header_idx));
    for section in sections {
        if !section.inline_rest.is_empty() {
            rewrite_flow_section(&mut lines, &section, specs)?;
        } else {
            let insert_at = section.last_item_idx.unwrap_or(section.header_idx) + 1;
            let indent = " ".repeat(section.item_indent);
            for (offset, spec) in specs.iter().enumerate() {
                lines.insert(insert_at + offset, format!("{}- {}", indent, spec));
            }
        }
    }

    let mut out = lines.join("\n");
    if had_final_newline {
        out.push('\n');
    }
    Ok(out)
}

/// Convert an inline flow list (`build: [numpy, six]`) to block style with
/// the new entries appended
fn rewrite_flow_section(lines: &mut Vec<String>, section: &Section, specs: &[String]) -> Result<()> {
    let rest = &section.inline_rest;
    let (open, close) = match (rest.find('['), rest.rfind(']')) {
        (Some(open), Some(close)) if open < close => (open, close),
        _ => {
            return Err(Error::ParseError(format!(
                "unsupported requirements list syntax: {}",
                rest
            )));
        }
    };

    let key = lines[section.header_idx]
        .trim_start()
        .split(':')
        .next()
        .unwrap_or("")
        .to_string();
    let header_indent = " ".repeat(section.header_indent);
    let item_indent = " ".repeat(section.header_indent + 2);

    let mut replacement = vec![format!("{}{}:", header_indent, key)];
    for item in rest[open + 1..close].split(',') {
        let item = item.trim().trim_matches('"').trim_matches('\'');
        if !item.is_empty() {
            replacement.push(format!("{}- {}", item_indent, item));
        }
    }
    for spec in specs {
        replacement.push(format!("{}- {}", item_indent, spec));
    }

    lines.remove(section.header_idx);
    for (offset, line) in replacement.into_iter().enumerate() {
        lines.insert(section.header_idx + offset, line);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const META_BLOCK: &str = "\
package:
  name: demo
  version: 1.0

requirements:
  build:
    - numpy
    - setuptools
  run:
    - numpy

about:
  license: BSD
";

    #[test]
    fn test_append_to_block_lists() {
        let specs = vec!["python >=3.8".to_string()];
        let out = append_requirements(META_BLOCK, &specs).unwrap();

        let expected = "\
package:
  name: demo
  version: 1.0

requirements:
  build:
    - numpy
    - setuptools
    - python >=3.8
  run:
    - numpy
    - python >=3.8

about:
  license: BSD
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_python_before_numpy_spec_order() {
        let specs = vec!["python >=3.8".to_string(), "numpy <2.0".to_string()];
        let out = append_requirements(META_BLOCK, &specs).unwrap();

        let run_tail: Vec<&str> = out
            .lines()
            .skip_while(|l| l.trim() != "run:")
            .skip(1)
            .take(3)
            .map(|l| l.trim())
            .collect();
        assert_eq!(run_tail, vec!["- numpy", "- python >=3.8", "- numpy <2.0"]);
    }

    #[test]
    fn test_comments_and_order_preserved() {
        let text = "\
# top comment
requirements:
  build:
    - numpy  # pinned elsewhere
  run:
    - numpy
build:
  number: 0
";
        let specs = vec!["python >=3.8".to_string()];
        let out = append_requirements(text, &specs).unwrap();

        assert!(out.contains("# top comment"));
        assert!(out.contains("- numpy  # pinned elsewhere"));
        // The top-level build key after the requirements block is untouched
        assert!(out.contains("build:\n  number: 0"));
    }

    #[test]
    fn test_commented_section_header_treated_as_block() {
        let text = "\
requirements:
  build:  # build-time deps
    - numpy
  run:
    - numpy
";
        let specs = vec!["python >=3.8".to_string()];
        let out = append_requirements(text, &specs).unwrap();

        assert!(out.contains("build:  # build-time deps"));
        assert_eq!(out.matches("- python >=3.8").count(), 2);
    }

    #[test]
    fn test_flow_list_rewritten_in_block_style() {
        let text = "\
requirements:
  build: [numpy]
  run: [numpy, six]
";
        let specs = vec!["python >=3.8".to_string()];
        let out = append_requirements(text, &specs).unwrap();

        let expected = "\
requirements:
  build:
    - numpy
    - python >=3.8
  run:
    - numpy
    - six
    - python >=3.8
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_section_gets_items() {
        let text = "\
requirements:
  build:
  run:
    - numpy
";
        let specs = vec!["numpy <2.0".to_string()];
        let out = append_requirements(text, &specs).unwrap();

        let expected = "\
requirements:
  build:
    - numpy <2.0
  run:
    - numpy
    - numpy <2.0
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_missing_requirements_section_is_an_error() {
        let err = append_requirements("package:\n  name: demo\n", &["python >=3".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_missing_run_list_is_an_error() {
        let text = "requirements:\n  build:\n    - numpy\n";
        let err = append_requirements(text, &["python >=3".to_string()]).unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }

    #[test]
    fn test_inject_noop_without_constraints() {
        let recipe_dir = tempfile::tempdir().unwrap();
        // No meta.yaml exists; a no-op must not try to read it
        let package = Package::new("demo", Some("1.0".to_string()));
        assert!(inject(&package, recipe_dir.path()).is_ok());
    }

    #[test]
    fn test_inject_writes_patched_file() {
        let recipe_dir = tempfile::tempdir().unwrap();
        fs::write(recipe_dir.path().join("meta.yaml"), META_BLOCK).unwrap();

        let mut package = Package::new("demo", Some("1.0".to_string()));
        package.python_requirements = Some(">=3.8".to_string());
        inject(&package, recipe_dir.path()).unwrap();

        let patched = fs::read_to_string(recipe_dir.path().join("meta.yaml")).unwrap();
        assert_eq!(patched.matches("- python >=3.8").count(), 2);
    }
}
