use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::aggregate::{self, EngagementMetric};
use crate::cohort::{self, PaidStudents};
use crate::error::Result;
use crate::loader;
use crate::models::{
    AccountKeyed, CohortAnalysis, CohortComparison, DatasetOverview, EngagementRecord,
    EnrollmentRecord, SubmissionRecord,
};
use crate::stats;

#[derive(Debug, Clone)]
pub struct DataPaths {
    pub enrollments: PathBuf,
    pub engagement: PathBuf,
    pub submissions: PathBuf,
}

#[derive(Debug, Clone)]
pub struct AnalysisOptions {
    pub checkpoint_lessons: Vec<String>,
}

/// The three course exports, typed.
#[derive(Debug, Clone)]
pub struct Datasets {
    pub enrollments: Vec<EnrollmentRecord>,
    pub engagement: Vec<EngagementRecord>,
    pub submissions: Vec<SubmissionRecord>,
}

impl Datasets {
    pub fn load(paths: &DataPaths) -> Result<Self> {
        let datasets = Self {
            enrollments: load_typed(&paths.enrollments)?,
            engagement: load_typed(&paths.engagement)?,
            submissions: load_typed(&paths.submissions)?,
        };
        info!(
            "Loaded {} enrollments, {} engagement records, {} submissions",
            datasets.enrollments.len(),
            datasets.engagement.len(),
            datasets.submissions.len()
        );
        Ok(datasets)
    }
}

fn load_typed<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    loader::read_csv(path)?
        .iter()
        .map(|row| row.deserialize())
        .collect()
}

fn unique_accounts<T: AccountKeyed>(records: &[T]) -> HashSet<&str> {
    records.iter().map(|record| record.account_key()).collect()
}

/// Enrolled students who never show up in engagement, not counting
/// enrollments canceled on the day they started.
pub fn problem_students(enrollments: &[EnrollmentRecord], engagement: &[EngagementRecord]) -> usize {
    let engaged = unique_accounts(engagement);
    enrollments
        .iter()
        .filter(|enrollment| {
            !engaged.contains(enrollment.account_key.as_str())
                && enrollment.join_date != enrollment.cancel_date
        })
        .count()
}

pub fn analyze(datasets: &Datasets, options: &AnalysisOptions) -> Result<CohortAnalysis> {
    let udacity = cohort::udacity_accounts(&datasets.enrollments);
    let (_, student_enrollments) = cohort::partition_by_accounts(&datasets.enrollments, &udacity);
    let (_, student_engagement) = cohort::partition_by_accounts(&datasets.engagement, &udacity);
    let (_, student_submissions) = cohort::partition_by_accounts(&datasets.submissions, &udacity);
    info!("Excluded {} Udacity test accounts", udacity.len());

    let paid = PaidStudents::from_enrollments(&student_enrollments);
    if paid.is_empty() {
        warn!("No enrollment qualifies as paid; every cohort will be empty");
    }
    let paid_enrollments = cohort::remove_free_trial_cancels(&student_enrollments, &paid);
    let paid_engagement = cohort::remove_free_trial_cancels(&student_engagement, &paid);
    let paid_submissions = cohort::remove_free_trial_cancels(&student_submissions, &paid);
    info!(
        "{} paid students: {} enrollments, {} engagement records, {} submissions",
        paid.len(),
        paid_enrollments.len(),
        paid_engagement.len(),
        paid_submissions.len()
    );

    let first_week = cohort::first_week_engagement(&paid_engagement, &paid)?;
    let passers = cohort::checkpoint_passers(&paid_submissions, options.checkpoint_lessons.as_slice());
    let (passing, non_passing) = cohort::split_by_pass(&first_week, &passers);
    info!(
        "{} first-week records: {} passing, {} non-passing",
        first_week.len(),
        passing.len(),
        non_passing.len()
    );

    let passing_by_account = aggregate::group_by_account(&passing);
    let non_passing_by_account = aggregate::group_by_account(&non_passing);
    let universe = &datasets.engagement;

    let compare_metric = |label: &str, metric: EngagementMetric| {
        comparison(
            label,
            aggregate::sum_field(&passing_by_account, universe, metric),
            aggregate::sum_field(&non_passing_by_account, universe, metric),
        )
    };
    let minutes = compare_metric("Minutes", EngagementMetric::TotalMinutesVisited);
    let lessons = compare_metric("Lessons", EngagementMetric::LessonsCompleted);
    let days = comparison(
        "Days",
        as_float(aggregate::count_active_days(&passing_by_account, universe)),
        as_float(aggregate::count_active_days(&non_passing_by_account, universe)),
    );

    let overview = DatasetOverview {
        enrollment_rows: datasets.enrollments.len(),
        enrolled_students: unique_accounts(&datasets.enrollments).len(),
        engagement_rows: datasets.engagement.len(),
        engaged_students: unique_accounts(&datasets.engagement).len(),
        submission_rows: datasets.submissions.len(),
        submitting_students: unique_accounts(&datasets.submissions).len(),
        problem_students: problem_students(&datasets.enrollments, &datasets.engagement),
        udacity_accounts: udacity.len(),
        paid_students: paid.len(),
        first_week_engagement_rows: first_week.len(),
        passing_students: passers.len(),
    };

    Ok(CohortAnalysis {
        overview,
        minutes,
        lessons,
        days,
    })
}

fn comparison(
    metric: &str,
    passing: BTreeMap<String, f64>,
    non_passing: BTreeMap<String, f64>,
) -> CohortComparison {
    let passing_values: Vec<f64> = passing.values().copied().collect();
    let non_passing_values: Vec<f64> = non_passing.values().copied().collect();
    CohortComparison {
        metric: metric.to_string(),
        passing_summary: stats::describe(&passing_values),
        non_passing_summary: stats::describe(&non_passing_values),
        passing,
        non_passing,
    }
}

fn as_float(counts: BTreeMap<String, usize>) -> BTreeMap<String, f64> {
    counts
        .into_iter()
        .map(|(key, count)| (key, count as f64))
        .collect()
}
