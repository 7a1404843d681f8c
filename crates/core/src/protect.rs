//! Names the wiper and the reference sync must never touch

use crate::path::same_location;
use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::Path;

/// Always protected: version-control metadata and OS droppings
pub const BUILTIN_PROTECTED: [&str; 2] = [".git", ".DS_Store"];

/// Allow-list of top-level entry names under the working tree root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedSet {
    names: BTreeSet<String>,
}

impl ProtectedSet {
    /// Built-in names only
    pub fn builtin() -> Self {
        Self {
            names: BUILTIN_PROTECTED.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Built-in names plus the plan file itself when it lives directly
    /// under `root`, plus any extra names.
    pub fn for_run<I, S>(root: &Path, plan_file: Option<&Path>, extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::builtin();
        if let Some(plan_file) = plan_file {
            set.insert_if_under(root, plan_file);
        }
        for name in extra {
            set.insert(name);
        }
        set
    }

    /// Protect `file` by name when it sits directly under `root`
    ///
    /// Paths are resolved first, so `site/run.log` and `/abs/site` match.
    /// Returns whether the name was added.
    pub fn insert_if_under(&mut self, root: &Path, file: &Path) -> bool {
        let parent = match file.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        if !same_location(parent, root) {
            return false;
        }
        match file.file_name().and_then(OsStr::to_str) {
            Some(name) => {
                self.insert(name);
                true
            }
            None => false,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Check an entry by its file name as reported by `read_dir`
    pub fn contains_os(&self, name: &OsStr) -> bool {
        name.to_str().map(|n| self.contains(n)).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl Default for ProtectedSet {
    fn default() -> Self {
        Self::builtin()
    }
}
