use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::coercion::{self, TRIAL_DAYS};
use crate::error::{AnalysisError, Result};
use crate::models::{AccountKeyed, EngagementRecord, EnrollmentRecord, SubmissionRecord};

/// Lesson keys of the subway checkpoint project.
pub const CHECKPOINT_LESSON_KEYS: [&str; 2] = ["746169184", "3176718735"];

pub fn udacity_accounts(enrollments: &[EnrollmentRecord]) -> HashSet<String> {
    enrollments
        .iter()
        .filter(|enrollment| enrollment.is_udacity)
        .map(|enrollment| enrollment.account_key.clone())
        .collect()
}

/// Splits `records` into those whose account is in `accounts` and the rest.
pub fn partition_by_accounts<T: AccountKeyed + Clone>(
    records: &[T],
    accounts: &HashSet<String>,
) -> (Vec<T>, Vec<T>) {
    records
        .iter()
        .cloned()
        .partition(|record| accounts.contains(record.account_key()))
}

/// Latest qualifying join date per paid account.
///
/// An enrollment qualifies if it was never canceled or was canceled after
/// the trial period.
#[derive(Debug, Clone, Default)]
pub struct PaidStudents {
    join_dates: HashMap<String, NaiveDate>,
}

impl PaidStudents {
    pub fn from_enrollments(enrollments: &[EnrollmentRecord]) -> Self {
        let mut join_dates: HashMap<String, NaiveDate> = HashMap::new();

        for enrollment in enrollments {
            if enrollment.is_canceled && enrollment.days_to_cancel <= TRIAL_DAYS {
                continue;
            }
            let Some(join_date) = enrollment.join_date else {
                warn!(
                    "Skipping qualifying enrollment without join date for account {}",
                    enrollment.account_key
                );
                continue;
            };

            join_dates
                .entry(enrollment.account_key.clone())
                .and_modify(|latest| {
                    if join_date > *latest {
                        *latest = join_date;
                    }
                })
                .or_insert(join_date);
        }

        debug!("Registered {} paid students", join_dates.len());
        Self { join_dates }
    }

    pub fn contains(&self, account_key: &str) -> bool {
        self.join_dates.contains_key(account_key)
    }

    pub fn join_date(&self, account_key: &str) -> Option<NaiveDate> {
        self.join_dates.get(account_key).copied()
    }

    pub fn len(&self) -> usize {
        self.join_dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.join_dates.is_empty()
    }
}

pub fn remove_free_trial_cancels<T: AccountKeyed + Clone>(
    records: &[T],
    paid: &PaidStudents,
) -> Vec<T> {
    records
        .iter()
        .filter(|record| paid.contains(record.account_key()))
        .cloned()
        .collect()
}

/// Engagement recorded within the first week after each account's join date.
pub fn first_week_engagement(
    paid_engagement: &[EngagementRecord],
    paid: &PaidStudents,
) -> Result<Vec<EngagementRecord>> {
    let mut first_week = Vec::new();

    for record in paid_engagement {
        let join_date = paid.join_date(&record.account_key).ok_or_else(|| {
            AnalysisError::InvariantViolation(format!(
                "engagement for account {} has no paid enrollment",
                record.account_key
            ))
        })?;

        if coercion::within_one_week(Some(join_date), Some(record.utc_date))? {
            first_week.push(record.clone());
        }
    }

    Ok(first_week)
}

/// Accounts with a passing or distinguished submission for any of
/// `lesson_keys`.
pub fn checkpoint_passers<S: AsRef<str>>(
    submissions: &[SubmissionRecord],
    lesson_keys: &[S],
) -> HashSet<String> {
    submissions
        .iter()
        .filter(|submission| {
            submission.assigned_rating.is_passing()
                && lesson_keys
                    .iter()
                    .any(|key| key.as_ref() == submission.lesson_key)
        })
        .map(|submission| submission.account_key.clone())
        .collect()
}

pub fn split_by_pass(
    engagement: &[EngagementRecord],
    passers: &HashSet<String>,
) -> (Vec<EngagementRecord>, Vec<EngagementRecord>) {
    partition_by_accounts(engagement, passers)
}
