use std::collections::BTreeMap;

use crate::models::{AccountKeyed, EngagementRecord};

/// Engagement columns summed per account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementMetric {
    TotalMinutesVisited,
    LessonsCompleted,
}

impl EngagementMetric {
    pub fn value(self, record: &EngagementRecord) -> f64 {
        match self {
            Self::TotalMinutesVisited => record.total_minutes_visited,
            Self::LessonsCompleted => record.lessons_completed,
        }
    }
}

pub fn group_by_account<T: AccountKeyed + Clone>(records: &[T]) -> BTreeMap<String, Vec<T>> {
    let mut grouped: BTreeMap<String, Vec<T>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.account_key().to_string())
            .or_default()
            .push(record.clone());
    }
    grouped
}

/// Sums `metric` over every row of `universe` whose account is a key of
/// `grouped`. The groups only select accounts; their own rows are not summed.
pub fn sum_field<T>(
    grouped: &BTreeMap<String, Vec<T>>,
    universe: &[EngagementRecord],
    metric: EngagementMetric,
) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, f64> =
        grouped.keys().map(|key| (key.clone(), 0.0)).collect();

    for record in universe {
        if let Some(total) = sums.get_mut(&record.account_key) {
            *total += metric.value(record);
        }
    }
    sums
}

/// Days with at least one course visited, per account key of `grouped`,
/// counted over `universe`.
pub fn count_active_days<T>(
    grouped: &BTreeMap<String, Vec<T>>,
    universe: &[EngagementRecord],
) -> BTreeMap<String, usize> {
    let mut days: BTreeMap<String, usize> =
        grouped.keys().map(|key| (key.clone(), 0)).collect();

    for record in universe {
        if record.num_courses_visited == 0 {
            continue;
        }
        if let Some(count) = days.get_mut(&record.account_key) {
            *count += 1;
        }
    }
    days
}
