use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use crate::error::{AnalysisError, Result};

pub const HISTOGRAM_BINS: usize = 8;

const BAR_WIDTH: f64 = 0.9;

const TITLE: &str = "Students who pass the project vs. those who don't";

/// `bins + 1` equal-width edges spanning every value of every series.
///
/// A degenerate range is widened by half a unit on each side. Returns `None`
/// when all series are empty.
pub fn shared_edges(series: &[&[f64]], bins: usize) -> Option<Vec<f64>> {
    let values = series.iter().flat_map(|values| values.iter().copied());
    let (mut low, mut high) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    });
    if bins == 0 || low > high {
        return None;
    }
    if low == high {
        low -= 0.5;
        high += 0.5;
    }

    let width = (high - low) / bins as f64;
    let mut edges: Vec<f64> = (0..bins).map(|i| low + width * i as f64).collect();
    edges.push(high);
    Some(edges)
}

/// Counts per bin. Bins are half-open except the last, which also takes
/// its upper edge.
pub fn histogram_bins(values: &[f64], edges: &[f64]) -> Vec<usize> {
    if edges.len() < 2 {
        return vec![];
    }
    let last = edges.len() - 2;
    let mut counts = vec![0usize; edges.len() - 1];

    for &x in values {
        for i in 0..=last {
            let upper_ok = if i == last {
                x <= edges[i + 1]
            } else {
                x < edges[i + 1]
            };
            if x >= edges[i] && upper_ok {
                counts[i] += 1;
                break;
            }
        }
    }
    counts
}

pub fn render_days_histogram(passing: &[f64], non_passing: &[f64], output_path: &Path) -> Result<()> {
    let edges = shared_edges(&[passing, non_passing], HISTOGRAM_BINS)
        .ok_or_else(|| AnalysisError::Chart("no values to plot".to_string()))?;
    let passing_counts = histogram_bins(passing, &edges);
    let non_passing_counts = histogram_bins(non_passing, &edges);

    let tallest = passing_counts
        .iter()
        .chain(non_passing_counts.iter())
        .copied()
        .max()
        .unwrap_or(0);
    let y_max = (tallest as f64 * 1.1).max(1.0);
    let x_range = edges[0]..edges[edges.len() - 1];

    let root = SVGBackend::new(output_path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(TITLE, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, 0.0..y_max)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .x_desc("Number of days")
        .y_desc("Students")
        .draw()
        .map_err(chart_error)?;

    let series = [
        ("Non-passing students", &non_passing_counts, RED),
        ("Passing students", &passing_counts, BLUE),
    ];
    for (label, counts, color) in series {
        chart
            .draw_series(bars(&edges, counts, color))
            .map_err(chart_error)?
            .label(label)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.mix(0.5).filled())
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    info!("Histogram written to {}", output_path.display());
    Ok(())
}

fn bars<'a>(
    edges: &'a [f64],
    counts: &'a [usize],
    color: RGBColor,
) -> impl Iterator<Item = Rectangle<(f64, f64)>> + 'a {
    counts.iter().enumerate().map(move |(i, &count)| {
        let inset = (edges[i + 1] - edges[i]) * (1.0 - BAR_WIDTH) / 2.0;
        Rectangle::new(
            [(edges[i] + inset, 0.0), (edges[i + 1] - inset, count as f64)],
            color.mix(0.5).filled(),
        )
    })
}

fn chart_error<E: std::fmt::Display>(err: E) -> AnalysisError {
    AnalysisError::Chart(err.to_string())
}
