//! One-way overlay of a reference tree onto the working tree
//!
//! Every top-level entry of the reference ends up in the working tree with
//! identical content. Entries that exist only in the working tree are left
//! in place: this is an overlay, not a mirror.

use crate::error::{EntryFault, TreeError};
use crate::wipe::remove_entry;
use bd_core::ProtectedSet;
use filetime::FileTime;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Top-level files copied
    pub copied_files: Vec<String>,
    /// Top-level directories replaced
    pub copied_dirs: Vec<String>,
    /// Top-level names skipped as protected
    pub skipped: Vec<String>,
    /// Total regular files written, including inside directories
    pub file_count: usize,
    pub faults: Vec<EntryFault>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }
}

/// Overlay `reference` onto `root`, skipping protected names
///
/// A missing reference is fatal. Failures on individual entries are
/// logged and recorded, and the remaining entries are still copied.
pub fn sync_from_reference(
    root: &Path,
    reference: &Path,
    skip: &ProtectedSet,
) -> Result<SyncReport, TreeError> {
    if !reference.is_dir() {
        return Err(TreeError::SourceMissing(reference.to_path_buf()));
    }

    info!("Copying all files from {}", reference.display());

    let mut names = fs::read_dir(reference)
        .map_err(|source| TreeError::Read {
            path: reference.to_path_buf(),
            source,
        })?
        .map(|entry| entry.map(|e| e.file_name()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(|source| TreeError::Read {
            path: reference.to_path_buf(),
            source,
        })?;
    names.sort();

    let mut report = SyncReport::default();

    for name in names {
        let entry_name = name.to_string_lossy().into_owned();
        if skip.contains_os(&name) {
            report.skipped.push(entry_name);
            continue;
        }

        let src = reference.join(&name);
        let dst = root.join(&name);

        let result = if src.is_dir() {
            replace_dir(&src, &dst).map(|count| {
                info!("Copied folder: {}/", entry_name);
                report.copied_dirs.push(entry_name.clone());
                count
            })
        } else {
            replace_file(&src, &dst).map(|()| {
                info!("Copied: {}", entry_name);
                report.copied_files.push(entry_name.clone());
                1
            })
        };

        match result {
            Ok(count) => report.file_count += count,
            Err(e) => {
                warn!("Error copying {}: {}", entry_name, e);
                report.faults.push(EntryFault::new(entry_name, e));
            }
        }
    }

    Ok(report)
}

/// Remove whatever sits at `dst`, then copy the `src` tree in its place
fn replace_dir(src: &Path, dst: &Path) -> io::Result<usize> {
    if fs::symlink_metadata(dst).is_ok() {
        remove_entry(dst)?;
    }
    copy_dir_all(src, dst)
}

fn replace_file(src: &Path, dst: &Path) -> io::Result<()> {
    if let Ok(meta) = fs::symlink_metadata(dst) {
        if meta.is_dir() {
            fs::remove_dir_all(dst)?;
        }
    }
    copy_file_preserving(src, dst)
}

/// Copy directory recursively, returning the number of files copied
fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<usize> {
    fs::create_dir_all(dst)?;
    let mut count = 0;

    for entry in WalkDir::new(src).follow_links(true).min_depth(1) {
        let entry = entry.map_err(io::Error::from)?;
        let rel = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            copy_file_preserving(entry.path(), &target)?;
            count += 1;
        }
    }

    Ok(count)
}

/// Copy content and permissions, then carry over access and modification times
fn copy_file_preserving(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst)?;
    let meta = fs::metadata(src)?;
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
}
