//! Progress reporting for the modeling pipeline.
//!
//! The runner announces each stage as it starts. Callers that want to follow
//! along (a progress bar, a log sink) attach a [`ProgressReporter`].
//!
//! # Example
//!
//! ```rust,ignore
//! use housing_prices::{PipelineRunner, ClosureProgressReporter};
//! use std::sync::Arc;
//!
//! let result = PipelineRunner::from_config_path("config/project.yaml")?
//!     .with_progress(Arc::new(ClosureProgressReporter::new(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })))
//!     .run()?;
//! ```

use serde::{Deserialize, Serialize};

/// Stages of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    LoadingData,
    EngineeringFeatures,
    Splitting,
    Training,
    Evaluating,
    Explaining,
    Reporting,
    Complete,
}

impl PipelineStage {
    /// Stages that do work, in execution order.
    pub const ORDER: [PipelineStage; 7] = [
        Self::LoadingData,
        Self::EngineeringFeatures,
        Self::Splitting,
        Self::Training,
        Self::Evaluating,
        Self::Explaining,
        Self::Reporting,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::LoadingData => "Loading Data",
            Self::EngineeringFeatures => "Engineering Features",
            Self::Splitting => "Splitting Train/Test",
            Self::Training => "Training Models",
            Self::Evaluating => "Evaluating Models",
            Self::Explaining => "Explaining Best Model",
            Self::Reporting => "Writing Reports",
            Self::Complete => "Complete",
        }
    }

    /// Fraction of the run finished when this stage starts.
    pub fn base_progress(&self) -> f32 {
        match Self::ORDER.iter().position(|s| s == self) {
            Some(index) => index as f32 / Self::ORDER.len() as f32,
            None => 1.0,
        }
    }
}

/// A stage transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub stage: PipelineStage,
    /// Overall progress in `[0, 1]`.
    pub progress: f32,
    pub message: String,
}

impl ProgressUpdate {
    pub fn new(stage: PipelineStage, message: impl Into<String>) -> Self {
        Self {
            stage,
            progress: stage.base_progress(),
            message: message.into(),
        }
    }

    pub fn complete(message: impl Into<String>) -> Self {
        Self::new(PipelineStage::Complete, message)
    }
}

/// Receives progress updates from a running pipeline.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
