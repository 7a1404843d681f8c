//! The ordered plan of snapshot steps
//!
//! A plan is built once, validated, and never changed afterwards. It can
//! come from a TOML plan file (see [`crate::manifest`]) or be assembled in
//! code with [`PlanBuilder`]:
//!
//! ```
//! use bd_core::Plan;
//!
//! let plan = Plan::builder()
//!     .step("2026-02-01 18:15:00", "init").write("a.txt", "1")
//!     .step("2026-02-01 20:45:00", "update").write("a.txt", "2").write("b.txt", "x")
//!     .sync("2026-02-02 09:00:00", "final")
//!     .build()
//!     .unwrap();
//! assert_eq!(plan.len(), 3);
//! ```

use crate::error::PlanError;
use crate::path::RelPath;
use crate::protect::ProtectedSet;
use crate::step::{FileChange, Mutation, SnapshotStep};
use crate::timestamp::Timestamp;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Run-level settings that travel with a plan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanSettings {
    /// Reference tree consulted by the final full sync
    pub reference: Option<PathBuf>,
    /// Extra top-level names exempt from wipe and sync
    pub protected: Vec<String>,
    /// Directories created empty right after the repository is initialized
    pub scaffold_dirs: Vec<RelPath>,
}

/// A complete, validated sequence of snapshot steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<SnapshotStep>,
    settings: PlanSettings,
}

impl Plan {
    /// Validate and wrap an ordered list of steps
    pub fn new(steps: Vec<SnapshotStep>, settings: PlanSettings) -> Result<Self, PlanError> {
        let plan = Self { steps, settings };
        plan.validate()?;
        Ok(plan)
    }

    pub fn builder() -> PlanBuilder {
        PlanBuilder::default()
    }

    pub fn steps(&self) -> &[SnapshotStep] {
        &self.steps
    }

    pub fn settings(&self) -> &PlanSettings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Replace the reference tree location
    pub fn with_reference(mut self, reference: PathBuf) -> Self {
        self.settings.reference = Some(reference);
        self
    }

    /// Indices of steps whose timestamp is earlier than the step before them
    ///
    /// Purely informational. Step order is what defines history.
    pub fn non_monotonic_steps(&self) -> Vec<usize> {
        self.steps
            .windows(2)
            .enumerate()
            .filter(|(_, pair)| pair[1].timestamp < pair[0].timestamp)
            .map(|(i, _)| i + 1)
            .collect()
    }

    /// Reject any sparse path whose first component is protected
    pub fn check_protected(&self, protected: &ProtectedSet) -> Result<(), PlanError> {
        for (index, step) in self.steps.iter().enumerate() {
            if let Mutation::Sparse(files) = &step.mutation {
                for path in files.keys() {
                    let top = path.top_level();
                    if protected.contains(top) {
                        return Err(PlanError::ProtectedPath {
                            step: index + 1,
                            path: path.to_string(),
                            name: top.to_string(),
                        });
                    }
                }
            }
        }
        for dir in &self.settings.scaffold_dirs {
            if protected.contains(dir.top_level()) {
                return Err(PlanError::ProtectedPath {
                    step: 0,
                    path: dir.to_string(),
                    name: dir.top_level().to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), PlanError> {
        let last = self.steps.len().checked_sub(1).ok_or(PlanError::Empty)?;

        for (index, step) in self.steps.iter().enumerate() {
            if step.message.trim().is_empty() {
                return Err(PlanError::EmptyMessage { step: index + 1 });
            }
            if step.mutation.is_full_sync() && index != last {
                return Err(PlanError::SyncNotTerminal { step: index + 1 });
            }
        }

        if !self.steps[last].mutation.is_full_sync() {
            return Err(PlanError::MissingFinalSync);
        }

        let mut protected = ProtectedSet::builtin();
        for name in &self.settings.protected {
            protected.insert(name.clone());
        }
        self.check_protected(&protected)
    }
}

/// Collect raw `(path, change)` pairs into a sparse mutation
///
/// Paths are normalized first, so `./a.txt` and `a.txt` collide.
pub fn sparse_from_pairs<I>(step: usize, pairs: I) -> Result<Mutation, PlanError>
where
    I: IntoIterator<Item = (String, FileChange)>,
{
    let mut files = BTreeMap::new();
    for (raw, change) in pairs {
        let path = RelPath::new(&raw)?;
        if files.contains_key(&path) {
            return Err(PlanError::DuplicatePath {
                step,
                path: path.to_string(),
            });
        }
        files.insert(path, change);
    }
    Ok(Mutation::Sparse(files))
}

#[derive(Debug)]
struct PendingStep {
    timestamp: String,
    message: String,
    files: Vec<(String, FileChange)>,
    sync: bool,
}

/// Fluent builder for [`Plan`]
///
/// Errors are deferred until [`PlanBuilder::build`].
#[derive(Debug, Default)]
pub struct PlanBuilder {
    pending: Vec<PendingStep>,
    prebuilt: BTreeMap<usize, SnapshotStep>,
    settings: PlanSettings,
    scaffold_raw: Vec<String>,
    misuse: Option<String>,
}

impl PlanBuilder {
    /// Start a new step; add files with [`write`](Self::write) and
    /// [`skip`](Self::skip). A step without files commits the tree as is.
    pub fn step(mut self, timestamp: &str, message: impl Into<String>) -> Self {
        self.pending.push(PendingStep {
            timestamp: timestamp.to_string(),
            message: message.into(),
            files: Vec::new(),
            sync: false,
        });
        self
    }

    /// Final step: overlay the reference tree
    pub fn sync(mut self, timestamp: &str, message: impl Into<String>) -> Self {
        self.pending.push(PendingStep {
            timestamp: timestamp.to_string(),
            message: message.into(),
            files: Vec::new(),
            sync: true,
        });
        self
    }

    /// Append an already constructed step
    pub fn push(mut self, step: SnapshotStep) -> Self {
        let index = self.pending.len();
        self.pending.push(PendingStep {
            timestamp: step.timestamp.to_string(),
            message: step.message.clone(),
            files: Vec::new(),
            sync: step.mutation.is_full_sync(),
        });
        self.prebuilt.insert(index, step);
        self
    }

    pub fn write(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, FileChange::Write(content.into()))
    }

    pub fn skip(self, path: &str) -> Self {
        self.add_file(path, FileChange::Skip)
    }

    pub fn reference(mut self, reference: impl Into<PathBuf>) -> Self {
        self.settings.reference = Some(reference.into());
        self
    }

    pub fn protect(mut self, name: impl Into<String>) -> Self {
        self.settings.protected.push(name.into());
        self
    }

    pub fn scaffold(mut self, dir: &str) -> Self {
        self.scaffold_raw.push(dir.to_string());
        self
    }

    pub fn build(self) -> Result<Plan, PlanError> {
        if let Some(reason) = self.misuse {
            return Err(PlanError::InvalidStep { step: 0, reason });
        }

        let mut settings = self.settings;
        for dir in &self.scaffold_raw {
            settings.scaffold_dirs.push(RelPath::new(dir)?);
        }

        let mut prebuilt = self.prebuilt;
        let mut steps = Vec::with_capacity(self.pending.len());
        for (index, pending) in self.pending.into_iter().enumerate() {
            if let Some(step) = prebuilt.remove(&index) {
                steps.push(step);
                continue;
            }
            let number = index + 1;
            let timestamp: Timestamp = pending.timestamp.parse()?;
            let mutation = if pending.sync {
                Mutation::FullSync
            } else if pending.files.is_empty() {
                Mutation::None
            } else {
                sparse_from_pairs(number, pending.files)?
            };
            steps.push(SnapshotStep::new(timestamp, pending.message, mutation));
        }

        Plan::new(steps, settings)
    }

    fn add_file(mut self, path: &str, change: FileChange) -> Self {
        let index = self.pending.len();
        match self.pending.last_mut() {
            Some(step) if step.sync || self.prebuilt.contains_key(&(index - 1)) => {
                self.misuse.get_or_insert_with(|| {
                    format!("cannot add '{path}' to step {index}: files belong to sparse steps")
                });
            }
            Some(step) => step.files.push((path.to_string(), change)),
            None => {
                self.misuse
                    .get_or_insert_with(|| format!("'{path}' added before any step"));
            }
        }
        self
    }
}
