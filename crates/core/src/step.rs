//! Snapshot step definitions

use crate::path::RelPath;
use crate::timestamp::Timestamp;
use std::collections::BTreeMap;

/// New content for one path in a sparse mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    /// Overwrite the file with these bytes
    Write(Vec<u8>),
    /// Leave the path alone this step
    Skip,
}

/// How a step changes the working tree before it is committed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Overwrite only the named paths; everything else stays as it was
    Sparse(BTreeMap<RelPath, FileChange>),
    /// No filesystem action; the commit may be empty
    None,
    /// Overlay the reference tree onto the working tree (final step only)
    FullSync,
}

impl Mutation {
    pub fn kind(&self) -> &'static str {
        match self {
            Mutation::Sparse(_) => "sparse",
            Mutation::None => "none",
            Mutation::FullSync => "full-sync",
        }
    }

    pub fn is_full_sync(&self) -> bool {
        matches!(self, Mutation::FullSync)
    }
}

/// One planned commit in the synthesized history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotStep {
    pub timestamp: Timestamp,
    pub message: String,
    pub mutation: Mutation,
}

impl SnapshotStep {
    pub fn new(timestamp: Timestamp, message: impl Into<String>, mutation: Mutation) -> Self {
        Self {
            timestamp,
            message: message.into(),
            mutation,
        }
    }

    pub fn empty(timestamp: Timestamp, message: impl Into<String>) -> Self {
        Self::new(timestamp, message, Mutation::None)
    }

    pub fn full_sync(timestamp: Timestamp, message: impl Into<String>) -> Self {
        Self::new(timestamp, message, Mutation::FullSync)
    }

    /// Number of paths this step writes (placeholders excluded)
    pub fn write_count(&self) -> usize {
        match &self.mutation {
            Mutation::Sparse(files) => files
                .values()
                .filter(|c| matches!(c, FileChange::Write(_)))
                .count(),
            _ => 0,
        }
    }
}
