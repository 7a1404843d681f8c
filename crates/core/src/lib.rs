//! Core data model for backdate
//!
//! This crate provides:
//! - Snapshot steps and their mutations
//! - Validated, immutable plans (builder + TOML loader)
//! - Civil timestamps
//! - Working-tree relative paths and the protected allow-list

pub mod error;
pub mod manifest;
pub mod path;
pub mod plan;
pub mod protect;
pub mod step;
pub mod timestamp;

// Re-exports
pub use error::PlanError;
pub use manifest::{load_plan, parse_plan, EXAMPLE_PLAN};
pub use path::{normalize_path, resolve_lenient, same_location, RelPath};
pub use plan::{Plan, PlanBuilder, PlanSettings};
pub use protect::{ProtectedSet, BUILTIN_PROTECTED};
pub use step::{FileChange, Mutation, SnapshotStep};
pub use timestamp::Timestamp;
