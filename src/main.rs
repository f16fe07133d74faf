use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod aggregate;
mod chart;
mod coercion;
mod cohort;
mod error;
mod loader;
mod models;
mod pipeline;
mod report;
mod stats;

use pipeline::{AnalysisOptions, DataPaths, Datasets};

#[derive(Parser)]
#[command(name = "cohort-engagement")]
#[command(
    about = "Compare first-week engagement of students who pass the checkpoint project with those who don't",
    long_about = None
)]
struct Cli {
    #[arg(long, default_value = "enrollments.csv")]
    enrollments: PathBuf,
    #[arg(long, default_value = "daily_engagement.csv")]
    engagement: PathBuf,
    #[arg(long, default_value = "project_submissions.csv")]
    submissions: PathBuf,
    /// Lesson key of the checkpoint project; repeat for several
    #[arg(long = "checkpoint-lesson", default_values = cohort::CHECKPOINT_LESSON_KEYS)]
    checkpoint_lessons: Vec<String>,
    /// Where to write the days-active histogram
    #[arg(long, default_value = "days_active_histogram.svg")]
    chart: PathBuf,
    #[arg(long)]
    no_chart: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Overridden by RUST_LOG when set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli.log_level);

    let paths = DataPaths {
        enrollments: cli.enrollments,
        engagement: cli.engagement,
        submissions: cli.submissions,
    };
    let options = AnalysisOptions {
        checkpoint_lessons: cli.checkpoint_lessons,
    };

    let datasets = Datasets::load(&paths).context("failed to load course data")?;
    let analysis = pipeline::analyze(&datasets, &options).context("cohort analysis failed")?;

    match cli.format {
        OutputFormat::Text => print!("{}", report::render_text(&analysis)),
        OutputFormat::Json => println!(
            "{}",
            report::render_json(&analysis).context("failed to serialise report")?
        ),
    }

    if cli.no_chart {
        return Ok(());
    }

    let passing: Vec<f64> = analysis.days.passing.values().copied().collect();
    let non_passing: Vec<f64> = analysis.days.non_passing.values().copied().collect();
    if passing.is_empty() && non_passing.is_empty() {
        tracing::warn!("No first-week engagement to plot; skipping histogram");
        return Ok(());
    }

    chart::render_days_histogram(&passing, &non_passing, &cli.chart)
        .with_context(|| format!("failed to write histogram to {}", cli.chart.display()))?;
    println!("Histogram written to {}.", cli.chart.display());

    Ok(())
}
