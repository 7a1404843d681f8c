//! Clear a working tree down to its protected entries

use crate::error::EntryFault;
use bd_core::ProtectedSet;
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// What a wipe removed and what it could not
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WipeReport {
    pub removed: Vec<String>,
    pub faults: Vec<EntryFault>,
}

impl WipeReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Remove every entry directly under `root` that is not protected
///
/// Directories go recursively. A failure on one entry is logged and
/// recorded; the rest are still attempted. A missing root is already
/// wiped.
pub fn wipe(root: &Path, protected: &ProtectedSet) -> WipeReport {
    let mut report = WipeReport::default();

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Wipe skipped, {} does not exist", root.display());
            return report;
        }
        Err(e) => {
            warn!("Cannot list {}: {}", root.display(), e);
            report.faults.push(EntryFault::new(root.display().to_string(), e));
            return report;
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => names.push(entry.file_name()),
            Err(e) => report.faults.push(EntryFault::new("<unreadable>", e)),
        }
    }
    names.sort();

    for name in names {
        if protected.contains_os(&name) {
            continue;
        }
        let entry_name = name.to_string_lossy().into_owned();
        let path = root.join(&name);

        match remove_entry(&path) {
            Ok(true) => {
                info!("Removed folder: {}/", entry_name);
                report.removed.push(entry_name);
            }
            Ok(false) => {
                info!("Removed: {}", entry_name);
                report.removed.push(entry_name);
            }
            Err(e) => {
                warn!("Error removing {}: {}", entry_name, e);
                report.faults.push(EntryFault::new(entry_name, e));
            }
        }
    }

    report
}

/// Remove a file, symlink or directory tree. Returns whether it was a directory.
pub(crate) fn remove_entry(path: &Path) -> std::io::Result<bool> {
    let file_type = fs::symlink_metadata(path)?.file_type();
    if file_type.is_dir() {
        fs::remove_dir_all(path)?;
        Ok(true)
    } else {
        fs::remove_file(path)?;
        Ok(false)
    }
}
