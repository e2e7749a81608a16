//! End-to-end pipeline runner.

use crate::config::{Settings, load_settings};
use crate::data::{load_raw_data, make_train_test_split, split_features_targets};
use crate::error::{EvaluationError, Result, ResultExt};
use crate::explain::{PermutationOptions, extract_feature_importances, plot_feature_importance};
use crate::features::{build_preprocessor, engineer_domain_features, get_feature_names};
use crate::models::{build_model_registry, evaluate_models, fit_models, select_best_model};
use crate::pipeline::progress::{PipelineStage, ProgressReporter, ProgressUpdate};
use crate::reporting::write_metrics_report;
use crate::types::PipelineResult;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Runs the whole modeling workflow once for a fixed set of settings.
///
/// # Example
///
/// ```rust,ignore
/// use housing_prices::{PipelineRunner, load_settings};
///
/// let settings = load_settings("config/project.yaml")?;
/// let result = PipelineRunner::new(settings).run()?;
/// println!("best model: {}", result.best_model);
/// ```
pub struct PipelineRunner {
    settings: Settings,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

static_assertions::assert_impl_all!(PipelineRunner: Send);

impl PipelineRunner {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            progress_reporter: None,
        }
    }

    /// Load settings from `path` and build a runner.
    pub fn from_config_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_settings(path)?))
    }

    /// Attach a progress reporter.
    pub fn with_progress(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Execute every stage. The metrics file is written last, so a failed
    /// run never leaves a partial report behind.
    pub fn run(&self) -> Result<PipelineResult> {
        let start = Instant::now();
        info!("Starting pipeline for project '{}'", self.settings.project_name);

        match self.run_internal() {
            Ok(result) => {
                info!(
                    "Pipeline finished in {:.2}s; best model: {}",
                    start.elapsed().as_secs_f64(),
                    result.best_model
                );
                self.report_progress(ProgressUpdate::complete("Pipeline completed successfully"));
                Ok(result)
            }
            Err(e) => {
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    fn enter(&self, stage: PipelineStage) {
        info!("{}...", stage.display_name());
        self.report_progress(ProgressUpdate::new(stage, stage.display_name()));
    }

    fn run_internal(&self) -> Result<PipelineResult> {
        let settings = &self.settings;

        self.enter(PipelineStage::LoadingData);
        let raw = load_raw_data(settings)?;

        self.enter(PipelineStage::EngineeringFeatures);
        let engineered =
            engineer_domain_features(&raw).context("While engineering domain features")?;
        let (features, target) = split_features_targets(&engineered, &settings.target_column)?;

        self.enter(PipelineStage::Splitting);
        let split = make_train_test_split(&features, &target, settings)?;
        info!(
            "Train rows: {}, test rows: {}",
            split.train_x.height(),
            split.test_x.height()
        );

        self.enter(PipelineStage::Training);
        let preprocessor = build_preprocessor(&split.train_x, &settings.categorical_columns);
        debug!(
            "Preprocessing {} numeric and {} categorical columns",
            preprocessor.schema().numeric.len(),
            preprocessor.schema().categorical.len()
        );
        let mut registry = build_model_registry(&preprocessor, settings);
        fit_models(&mut registry, &split.train_x, &split.train_y)?;

        self.enter(PipelineStage::Evaluating);
        let metrics = evaluate_models(&registry, &split.test_x, &split.test_y)?;
        let (best_model, best_metrics) = select_best_model(&metrics)?;
        info!("Best model: {} (rmse {:.4})", best_model, best_metrics.rmse);

        self.enter(PipelineStage::Explaining);
        let best = registry
            .get(&best_model)
            .ok_or(EvaluationError::EmptyMetrics)?;
        let feature_names = get_feature_names(&best.preprocessor)?;
        let importances = extract_feature_importances(
            best,
            &feature_names,
            Some((&split.test_x, &split.test_y)),
            PermutationOptions::from(settings),
        )?;
        debug!("Computed {} feature importances", importances.len());

        let figure_path = settings
            .figures_directory()
            .context("Creating figures directory")?
            .join(format!("{best_model}_feature_importance.png"));
        let feature_figure_path =
            plot_feature_importance(&importances, settings.top_feature_count, &figure_path)?;

        self.enter(PipelineStage::Reporting);
        settings
            .report_directory()
            .context("Creating report directory")?;
        let metrics_path = write_metrics_report(&settings.metrics_path(), &best_model, &metrics)?;

        Ok(PipelineResult {
            metrics,
            best_model,
            feature_figure_path,
            metrics_path,
        })
    }
}

/// Load settings from `config_path` and run the pipeline once.
pub fn run_pipeline(config_path: impl AsRef<Path>) -> Result<PipelineResult> {
    PipelineRunner::from_config_path(config_path)?.run()
}
