//! CLI entry point for the housing price modeling pipeline.

use anyhow::{Context, Result};
use clap::Parser;
use housing_prices::{
    ClosureProgressReporter, DEFAULT_CONFIG_PATH, HousingError, PipelineResult, PipelineRunner,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Train and compare housing price regression models",
    long_about = "Loads the housing dataset named in the YAML config, engineers features, \
                  trains an elastic net and a histogram gradient boosting model, and writes \
                  held-out metrics plus a feature importance chart for the best one.\n\n\
                  EXAMPLES:\n  \
                  # Use config/project.yaml\n  \
                  housing-prices\n\n  \
                  # Custom config, machine-readable summary\n  \
                  housing-prices -c configs/experiment.yaml --json"
)]
struct Args {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Print the run summary as JSON on stdout instead of a human-readable summary
    ///
    /// Disables all logging so stdout only carries the JSON document.
    #[arg(long)]
    json: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled entirely.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    if let Err(err) = run(&args) {
        eprintln!("Pipeline failed: {err:#}");
        let code = err
            .downcast_ref::<HousingError>()
            .map_or(1, HousingError::exit_code);
        std::process::exit(code);
    }
}

fn run(args: &Args) -> Result<()> {
    let mut runner = PipelineRunner::from_config_path(&args.config)?;

    if !args.quiet && !args.json {
        runner = runner.with_progress(Arc::new(ClosureProgressReporter::new(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        })));
    }

    let result = runner.run()?;

    if args.json {
        let summary =
            serde_json::to_string_pretty(&result).context("Serializing pipeline summary")?;
        println!("{summary}");
        return Ok(());
    }

    print_summary(&result);
    Ok(())
}

/// Print the human-readable run summary.
///
/// Uses `println!` so the summary shows regardless of log level.
fn print_summary(result: &PipelineResult) {
    println!("✅ Pipeline finished");
    println!("Best model: {}", result.best_model);
    if let Some(best) = result.best_metrics() {
        println!(
            "  r2={:.4}  mae={:.2}  rmse={:.2}  mape={:.4}",
            best.r2, best.mae, best.rmse, best.mape
        );
    }
    println!("Metrics written to: {}", result.metrics_path.display());
    println!(
        "Feature importance saved to: {}",
        result.feature_figure_path.display()
    );
}
