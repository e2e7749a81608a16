//! Pipeline module.
//!
//! Orchestrates one run: load, engineer, split, fit, evaluate, select,
//! explain and persist.

pub mod progress;
mod runner;

pub use progress::{ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate};
pub use runner::{PipelineRunner, run_pipeline};
