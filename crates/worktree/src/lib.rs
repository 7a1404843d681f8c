//! Working tree reconciliation for backdate
//!
//! This crate provides:
//! - Wipe down to a protected allow-list
//! - Sparse, additive file mutations
//! - One-way overlay from a reference tree
//! - Content digests for comparing trees across runs
//!
//! Every operation takes the working tree root explicitly.

pub mod digest;
pub mod error;
pub mod mutate;
pub mod sync;
pub mod wipe;

// Re-exports
pub use digest::{collect_files, tree_digest};
pub use error::{EntryFault, TreeError};
pub use mutate::{apply, apply_sparse, ApplyReport, MutationReport};
pub use sync::{sync_from_reference, SyncReport};
pub use wipe::{wipe, WipeReport};
