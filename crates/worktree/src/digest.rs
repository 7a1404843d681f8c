//! Content fingerprint of a working tree

use crate::error::TreeError;
use bd_core::ProtectedSet;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Read every regular file under `root` keyed by `/`-separated relative path
///
/// Protected top-level entries are not descended into.
pub fn collect_files(
    root: &Path,
    protected: &ProtectedSet,
) -> Result<BTreeMap<String, Vec<u8>>, TreeError> {
    let mut files = BTreeMap::new();

    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !(e.depth() == 1 && protected.contains_os(e.file_name())));

    for entry in walker {
        let entry = entry.map_err(|source| TreeError::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let content = fs::read(entry.path()).map_err(|source| TreeError::Read {
            path: entry.path().to_path_buf(),
            source,
        })?;
        files.insert(rel, content);
    }

    Ok(files)
}

/// BLAKE3 over sorted (path, content) pairs, hex encoded
///
/// Two trees with the same files and bytes produce the same digest
/// regardless of timestamps or permissions.
pub fn tree_digest(root: &Path, protected: &ProtectedSet) -> Result<String, TreeError> {
    let files = collect_files(root, protected)?;
    let mut hasher = blake3::Hasher::new();
    for (path, content) in &files {
        hasher.update(&(path.len() as u64).to_le_bytes());
        hasher.update(path.as_bytes());
        hasher.update(&(content.len() as u64).to_le_bytes());
        hasher.update(content);
    }
    Ok(hasher.finalize().to_hex().to_string())
}
