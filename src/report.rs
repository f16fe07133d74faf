use std::fmt::Write;

use crate::models::{CohortAnalysis, CohortComparison, DatasetOverview};
use crate::stats::Summary;

pub fn render_text(analysis: &CohortAnalysis) -> String {
    let mut output = String::new();

    write_overview(&mut output, &analysis.overview);
    for comparison in [&analysis.minutes, &analysis.lessons, &analysis.days] {
        let _ = writeln!(output);
        write_comparison(&mut output, comparison);
    }

    output
}

pub fn render_json(analysis: &CohortAnalysis) -> serde_json::Result<String> {
    serde_json::to_string_pretty(analysis)
}

fn write_overview(output: &mut String, overview: &DatasetOverview) {
    let _ = writeln!(output, "Dataset overview");
    let _ = writeln!(
        output,
        "Enrollments: {} rows, {} students",
        overview.enrollment_rows, overview.enrolled_students
    );
    let _ = writeln!(
        output,
        "Daily engagement: {} rows, {} students",
        overview.engagement_rows, overview.engaged_students
    );
    let _ = writeln!(
        output,
        "Project submissions: {} rows, {} students",
        overview.submission_rows, overview.submitting_students
    );
    let _ = writeln!(
        output,
        "Enrolled without engagement: {}",
        overview.problem_students
    );
    let _ = writeln!(output, "Udacity test accounts: {}", overview.udacity_accounts);
    let _ = writeln!(output, "Paid students: {}", overview.paid_students);
    let _ = writeln!(
        output,
        "First-week engagement records: {}",
        overview.first_week_engagement_rows
    );
    let _ = writeln!(
        output,
        "Students passing the checkpoint project: {}",
        overview.passing_students
    );
}

fn write_comparison(output: &mut String, comparison: &CohortComparison) {
    let _ = writeln!(output, "{} for passing students", comparison.metric);
    write_summary(output, comparison.passing_summary.as_ref());
    let _ = writeln!(output, "{} for non-passing students", comparison.metric);
    write_summary(output, comparison.non_passing_summary.as_ref());
}

fn write_summary(output: &mut String, summary: Option<&Summary>) {
    let Some(summary) = summary else {
        let _ = writeln!(output, "No data");
        return;
    };
    let _ = writeln!(output, "Mean: {:.3}", summary.mean);
    let _ = writeln!(output, "Standard deviation: {:.3}", summary.std_dev);
    let _ = writeln!(output, "Minimum: {:.3}", summary.min);
    let _ = writeln!(output, "Maximum: {:.3}", summary.max);
}
