//! Apply one step's mutation to the working tree

use crate::error::TreeError;
use crate::sync::{sync_from_reference, SyncReport};
use bd_core::{FileChange, Mutation, ProtectedSet, RelPath};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Paths touched by a sparse mutation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub written: Vec<RelPath>,
    pub skipped: Vec<RelPath>,
}

/// Outcome of applying any mutation kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MutationReport {
    Sparse(ApplyReport),
    Unchanged,
    FullSync(SyncReport),
}

/// Write every non-placeholder entry, creating parent directories on demand
///
/// Paths not listed are left exactly as they are. The first filesystem
/// error aborts the whole mutation.
pub fn apply_sparse(
    root: &Path,
    files: &BTreeMap<RelPath, FileChange>,
) -> Result<ApplyReport, TreeError> {
    let mut report = ApplyReport::default();

    for (rel, change) in files {
        let content = match change {
            FileChange::Write(content) => content,
            FileChange::Skip => {
                debug!("Skipped placeholder: {}", rel);
                report.skipped.push(rel.clone());
                continue;
            }
        };

        let target = rel.join_to(root);
        if let Some(parent) = target.parent() {
            if !parent.is_dir() {
                fs::create_dir_all(parent).map_err(|source| TreeError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        fs::write(&target, content).map_err(|source| TreeError::Write {
            path: target.clone(),
            source,
        })?;
        info!("Written: {}", rel);
        report.written.push(rel.clone());
    }

    Ok(report)
}

/// Dispatch a mutation against the working tree
///
/// `reference` is only consulted for [`Mutation::FullSync`].
pub fn apply(
    root: &Path,
    mutation: &Mutation,
    reference: Option<&Path>,
    protected: &ProtectedSet,
) -> Result<MutationReport, TreeError> {
    match mutation {
        Mutation::Sparse(files) => apply_sparse(root, files).map(MutationReport::Sparse),
        Mutation::None => Ok(MutationReport::Unchanged),
        Mutation::FullSync => {
            let reference = reference.ok_or(TreeError::NoReference)?;
            sync_from_reference(root, reference, protected).map(MutationReport::FullSync)
        }
    }
}
