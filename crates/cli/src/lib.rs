//! Backdate library surface
//!
//! The orchestrator and its run report live here so integration tests can
//! drive a full run without going through the binary.

pub mod generator;
pub mod logging;
pub mod report;

pub use generator::{GeneratorError, GeneratorState, HistoryGenerator, Progress};
pub use report::{RunReport, StepReport, ToolFailure};
