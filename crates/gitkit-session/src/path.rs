//! Path checks shared by the session store and the command validator

use std::path::{Component, Path, PathBuf};

use crate::{Error, Result};

/// Returns true if any `/`- or `\`-separated segment of `value` is `..`.
///
/// Works on raw strings so that pathspecs git will interpret later are
/// checked exactly as the caller supplied them.
pub fn has_traversal(value: &str) -> bool {
    value.split(['/', '\\']).any(|segment| segment == "..")
}

/// Validate a working directory and return it as a `PathBuf`.
///
/// The path must be non-empty, absolute and free of `..` segments. Existence
/// is not checked here; the engine does that when it resolves the path for an
/// operation.
pub fn validate_working_directory(path: &str) -> Result<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyPath);
    }

    if has_traversal(trimmed) {
        return Err(Error::PathTraversal {
            path: trimmed.to_string(),
        });
    }

    let candidate = Path::new(trimmed);
    if !candidate.is_absolute() {
        return Err(Error::RelativePath {
            path: trimmed.to_string(),
        });
    }

    // Belt and braces for platforms where the string split misses a form
    if candidate
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        return Err(Error::PathTraversal {
            path: trimmed.to_string(),
        });
    }

    Ok(candidate.to_path_buf())
}
