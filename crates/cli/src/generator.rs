//! History generation: drive a plan end to end
//!
//! ```text
//! Uninitialized ──initialize──▶ Wiped ──step 1..n-1──▶ Applying(i)
//!                                                         │
//!                                       final full sync ──▶ Reconciled ──commit──▶ Committed
//! ```
//!
//! Each step's mutation is fully applied before anything is staged, and
//! steps run strictly in plan order. Version-control failures are recorded
//! in the [`RunReport`] and the run continues; filesystem errors while
//! writing a step abort it.

use crate::report::{RunReport, StepReport};
use bd_core::{resolve_lenient, Plan, PlanError, ProtectedSet, SnapshotStep};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};
use vcs::{CommitRequest, VcsError, VersionControl};
use worktree::{TreeError, WipeReport};

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error(
        "no reference tree configured. Set `reference` under [settings] in the plan or pass --reference"
    )]
    NoReference,

    #[error(
        "source directory not found: {}. Create it and place the finished project there first",
        .0.display()
    )]
    SourceMissing(PathBuf),

    #[error(
        "reference tree {} overlaps the working tree {}. It would be wiped before the final sync; move it outside",
        .reference.display(),
        .root.display()
    )]
    ReferenceOverlapsRoot { reference: PathBuf, root: PathBuf },

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("failed to prepare {}: {source}", .path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("step {step} ({message}): {source}")]
    Mutation {
        step: usize,
        message: String,
        #[source]
        source: TreeError,
    },

    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error("this generator has already run (state: {0:?})")]
    AlreadyRan(GeneratorState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorState {
    Uninitialized,
    Wiped,
    /// 1-based index of the step being applied
    Applying(usize),
    Reconciled,
    Committed,
}

/// Progress notifications emitted during [`HistoryGenerator::run_with`]
#[derive(Debug)]
pub enum Progress<'a> {
    Wiped(&'a WipeReport),
    StepStarted {
        index: usize,
        total: usize,
        step: &'a SnapshotStep,
    },
    StepFinished(&'a StepReport),
}

pub struct HistoryGenerator<V: VersionControl> {
    root: PathBuf,
    vcs: V,
    protected: ProtectedSet,
    state: GeneratorState,
}

impl<V: VersionControl> HistoryGenerator<V> {
    pub fn new(root: impl Into<PathBuf>, vcs: V, protected: ProtectedSet) -> Self {
        Self {
            root: root.into(),
            vcs,
            protected,
            state: GeneratorState::Uninitialized,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> GeneratorState {
        self.state
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn run(&mut self, plan: &Plan) -> Result<RunReport, GeneratorError> {
        self.run_with(plan, |_| {})
    }

    /// Execute every step of `plan` in order, reporting progress to `observer`
    pub fn run_with<F>(&mut self, plan: &Plan, mut observer: F) -> Result<RunReport, GeneratorError>
    where
        F: FnMut(Progress<'_>),
    {
        if self.state != GeneratorState::Uninitialized {
            return Err(GeneratorError::AlreadyRan(self.state));
        }

        // Everything that can be checked up front is checked before the
        // first byte on disk changes.
        let reference = plan
            .settings()
            .reference
            .clone()
            .ok_or(GeneratorError::NoReference)?;
        if !reference.is_dir() {
            return Err(GeneratorError::SourceMissing(reference));
        }
        let resolved_reference = resolve_lenient(&reference);
        let resolved_root = resolve_lenient(&self.root);
        if resolved_reference.starts_with(&resolved_root) || resolved_root.starts_with(&resolved_reference) {
            return Err(GeneratorError::ReferenceOverlapsRoot {
                reference,
                root: self.root.clone(),
            });
        }
        plan.check_protected(&self.protected)?;

        fs::create_dir_all(&self.root).map_err(|source| GeneratorError::Prepare {
            path: self.root.clone(),
            source,
        })?;

        info!("Initializing new git repository in {}", self.root.display());
        let init = self.vcs.initialize(&self.root)?;

        info!("Clearing project folder");
        let wipe = worktree::wipe(&self.root, &self.protected);
        self.state = GeneratorState::Wiped;
        observer(Progress::Wiped(&wipe));

        for dir in &plan.settings().scaffold_dirs {
            let path = dir.join_to(&self.root);
            fs::create_dir_all(&path).map_err(|source| GeneratorError::Prepare { path, source })?;
        }

        let total = plan.len();
        let mut steps = Vec::with_capacity(total);
        for (offset, step) in plan.steps().iter().enumerate() {
            let index = offset + 1;
            observer(Progress::StepStarted { index, total, step });
            let report = self.run_step(index, step, &reference)?;
            observer(Progress::StepFinished(&report));
            steps.push(report);
        }
        self.state = GeneratorState::Committed;

        let recorded_commits = self.vcs.commit_count(&self.root)?;
        match recorded_commits {
            Some(n) if n != total => warn!("Planned {} commits but the log holds {}", total, n),
            Some(n) => info!("Git history generation complete: {} commits", n),
            None => warn!("Could not verify the number of recorded commits"),
        }

        Ok(RunReport {
            root: self.root.clone(),
            reference,
            init,
            wipe,
            steps,
            intended_commits: total,
            recorded_commits,
        })
    }

    fn run_step(
        &mut self,
        index: usize,
        step: &SnapshotStep,
        reference: &Path,
    ) -> Result<StepReport, GeneratorError> {
        self.state = GeneratorState::Applying(index);
        debug!(index, kind = step.mutation.kind(), "applying step");

        let mutation = worktree::apply(&self.root, &step.mutation, Some(reference), &self.protected)
            .map_err(|source| GeneratorError::Mutation {
                step: index,
                message: step.message.clone(),
                source,
            })?;
        if step.mutation.is_full_sync() {
            self.state = GeneratorState::Reconciled;
        }

        let stage = self.vcs.stage_all(&self.root)?;
        let commit = self.vcs.commit(
            &self.root,
            &CommitRequest {
                message: step.message.clone(),
                timestamp: step.timestamp,
                allow_empty: true,
            },
        )?;

        let tree_digest = match worktree::tree_digest(&self.root, &self.protected) {
            Ok(digest) => Some(digest),
            Err(e) => {
                warn!("Could not digest tree after step {}: {}", index, e);
                None
            }
        };

        Ok(StepReport {
            index,
            message: step.message.clone(),
            timestamp: step.timestamp,
            mutation,
            stage,
            commit,
            tree_digest,
        })
    }
}
