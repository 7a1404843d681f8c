//! Relative paths inside the working tree

use crate::error::PlanError;
use std::ffi::OsString;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// A normalized path relative to the working tree root
///
/// Always `/`-separated, never empty, never absolute, no `.` or `..`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RelPath(String);

impl RelPath {
    pub fn new(raw: &str) -> Result<Self, PlanError> {
        normalize_path(Path::new(raw)).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First path component, which is the entry directly under the root
    pub fn top_level(&self) -> &str {
        self.0.split('/').next().unwrap_or(&self.0)
    }

    /// Resolve against a working tree root
    pub fn join_to(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl serde::Serialize for RelPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Normalize a path for use inside the working tree
///
/// - Converts to relative path with `/` separator
/// - Rejects `..` and absolute paths
/// - Removes `./` prefix
pub fn normalize_path(path: &Path) -> Result<String, PlanError> {
    let invalid = |reason| PlanError::Path {
        path: path.display().to_string(),
        reason,
    };

    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| invalid("not valid UTF-8"))?;
                parts.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir => return Err(invalid("must not contain '..'")),
            Component::RootDir | Component::Prefix(_) => {
                return Err(invalid("must be relative"))
            }
        }
    }

    if parts.is_empty() {
        return Err(invalid("is empty"));
    }

    Ok(parts.join("/"))
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest
///
/// Lets paths that do not exist yet (a root about to be created, a log
/// file about to be opened) be compared against ones that do. Falls back
/// to `path` unchanged when nothing along it resolves.
pub fn resolve_lenient(path: &Path) -> PathBuf {
    let mut missing: Vec<OsString> = Vec::new();
    let mut current = path.to_path_buf();
    loop {
        if let Ok(resolved) = current.canonicalize() {
            return missing.iter().rev().fold(resolved, |acc, part| acc.join(part));
        }
        match (current.parent(), current.file_name()) {
            (Some(parent), Some(name)) => {
                missing.push(name.to_os_string());
                current = if parent.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    parent.to_path_buf()
                };
            }
            _ => return path.to_path_buf(),
        }
    }
}

/// Whether two paths name the same location once resolved
pub fn same_location(a: &Path, b: &Path) -> bool {
    resolve_lenient(a) == resolve_lenient(b)
}
