//! Horizontal bar chart of the strongest features.

use crate::error::{ExplainabilityError, HousingError, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const CHART_TITLE: &str = "Top Drivers of California Housing Prices";
pub const X_AXIS_LABEL: &str = "Importance (arbitrary units)";

const CHART_SIZE: (u32, u32) = (1600, 800);
const BAR_COLOR: RGBColor = RGBColor(0x2a, 0x9d, 0x8f);

/// The `top_n` highest scores in descending order. Equal scores keep their
/// input order.
pub fn top_features(importances: &[(String, f64)], top_n: usize) -> Vec<(String, f64)> {
    let mut sorted = importances.to_vec();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));
    sorted.truncate(top_n);
    sorted
}

/// Render the `top_n` features as a PNG at `output_path`, longest bar on
/// top, each labelled with its value to three decimals.
///
/// Parent directories are created. If text cannot be rendered (no usable
/// system font) the chart is written with bars only.
pub fn plot_feature_importance(
    importances: &[(String, f64)],
    top_n: usize,
    output_path: &Path,
) -> Result<PathBuf> {
    if importances.is_empty() || top_n == 0 {
        return Err(ExplainabilityError::EmptyImportances.into());
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let bars = top_features(importances, top_n);
    debug!("Plotting {} of {} features", bars.len(), importances.len());

    if let Err(reason) = render(&bars, output_path, true) {
        warn!(
            "Could not render chart text ({}); writing bars without labels",
            reason
        );
        render(&bars, output_path, false).map_err(HousingError::Chart)?;
    }

    info!("Feature importance chart saved to: {}", output_path.display());
    Ok(output_path.to_path_buf())
}

fn render(bars: &[(String, f64)], path: &Path, with_text: bool) -> std::result::Result<(), String> {
    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(|e| e.to_string())?;

    let n = bars.len();
    let max = bars.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let x_max = if max > 0.0 { max * 1.15 } else { 1.0 };
    // Slot 0 is the bottom of the chart; the largest score goes on top.
    let slot = |rank: usize| n - 1 - rank;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if with_text {
        builder
            .caption(CHART_TITLE, ("sans-serif", 36).into_font())
            .x_label_area_size(60)
            .y_label_area_size(360);
    }
    let mut chart = builder
        .build_cartesian_2d(0.0..x_max, (0..n).into_segmented())
        .map_err(|e| e.to_string())?;

    if with_text {
        let label = |value: &SegmentValue<usize>| match value {
            SegmentValue::CenterOf(k) | SegmentValue::Exact(k) if *k < n => {
                bars[n - 1 - *k].0.clone()
            }
            _ => String::new(),
        };
        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(n + 1)
            .y_label_formatter(&label)
            .label_style(("sans-serif", 22))
            .x_desc(X_AXIS_LABEL)
            .draw()
            .map_err(|e| e.to_string())?;
    }

    chart
        .draw_series(bars.iter().enumerate().map(|(rank, (_, value))| {
            let mut bar = Rectangle::new(
                [
                    (0.0, SegmentValue::Exact(slot(rank))),
                    (*value, SegmentValue::Exact(slot(rank) + 1)),
                ],
                BAR_COLOR.filled(),
            );
            bar.set_margin(6, 6, 0, 0);
            bar
        }))
        .map_err(|e| e.to_string())?;

    if with_text {
        let style = TextStyle::from(("sans-serif", 22).into_font())
            .pos(Pos::new(HPos::Left, VPos::Center));
        chart
            .draw_series(bars.iter().enumerate().map(|(rank, (_, value))| {
                Text::new(
                    format!("{value:.3}"),
                    (*value + x_max * 0.01, SegmentValue::CenterOf(slot(rank))),
                    style.clone(),
                )
            }))
            .map_err(|e| e.to_string())?;
    }

    root.present().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn importances() -> Vec<(String, f64)> {
        vec![
            ("median_income".to_string(), 0.52),
            ("ocean_proximity_INLAND".to_string(), 0.18),
            ("households".to_string(), 0.01),
            ("coastal_flag".to_string(), 0.18),
            ("latitude".to_string(), 0.25),
        ]
    }

    #[test]
    fn test_top_features_sorted_and_truncated() {
        let top = top_features(&importances(), 3);
        let names: Vec<&str> = top.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["median_income", "latitude", "ocean_proximity_INLAND"]);
    }

    #[test]
    fn test_top_n_larger_than_input() {
        assert_eq!(top_features(&importances(), 50).len(), 5);
    }

    #[test]
    fn test_plot_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("figures").join("model_feature_importance.png");

        let written = plot_feature_importance(&importances(), 3, &path).unwrap();
        assert_eq!(written, path);
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_plot_single_feature() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("single.png");
        let one = vec![("median_income".to_string(), 0.0)];
        assert!(plot_feature_importance(&one, 10, &path).is_ok());
    }

    #[test]
    fn test_empty_importances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");

        let err = plot_feature_importance(&[], 10, &path).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_IMPORTANCES");

        let err = plot_feature_importance(&importances(), 0, &path).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_IMPORTANCES");
        assert!(!path.exists());
    }
}
