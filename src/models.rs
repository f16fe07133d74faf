use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::coercion;
use crate::error::ParseError;
use crate::stats::Summary;

pub trait AccountKeyed {
    fn account_key(&self) -> &str;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EnrollmentRecord {
    pub account_key: String,
    #[serde(deserialize_with = "date")]
    pub join_date: Option<NaiveDate>,
    #[serde(deserialize_with = "date")]
    pub cancel_date: Option<NaiveDate>,
    #[serde(deserialize_with = "int")]
    pub days_to_cancel: i64,
    #[serde(deserialize_with = "flag")]
    pub is_canceled: bool,
    #[serde(deserialize_with = "flag")]
    pub is_udacity: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngagementRecord {
    pub account_key: String,
    #[serde(deserialize_with = "required_date")]
    pub utc_date: NaiveDate,
    #[serde(deserialize_with = "float")]
    pub total_minutes_visited: f64,
    #[serde(deserialize_with = "float")]
    pub lessons_completed: f64,
    #[serde(deserialize_with = "whole")]
    pub num_courses_visited: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SubmissionRecord {
    pub account_key: String,
    pub lesson_key: String,
    pub assigned_rating: Rating,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Rating {
    Passed,
    Distinction,
    Incomplete,
    Ungraded,
    Other(String),
}

impl Rating {
    pub fn parse(value: &str) -> Self {
        match value {
            "PASSED" => Rating::Passed,
            "DISTINCTION" => Rating::Distinction,
            "INCOMPLETE" => Rating::Incomplete,
            "UNGRADED" => Rating::Ungraded,
            other => Rating::Other(other.to_string()),
        }
    }

    pub fn is_passing(&self) -> bool {
        matches!(self, Rating::Passed | Rating::Distinction)
    }
}

impl From<String> for Rating {
    fn from(value: String) -> Self {
        Rating::parse(&value)
    }
}

impl AccountKeyed for EnrollmentRecord {
    fn account_key(&self) -> &str {
        &self.account_key
    }
}

impl AccountKeyed for EngagementRecord {
    fn account_key(&self) -> &str {
        &self.account_key
    }
}

impl AccountKeyed for SubmissionRecord {
    fn account_key(&self) -> &str {
        &self.account_key
    }
}

// Field adapters: every column arrives as text and goes through `coercion`.

fn coerced<'de, D, T>(
    deserializer: D,
    convert: fn(&str) -> Result<T, ParseError>,
) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;
    convert(&value).map_err(serde::de::Error::custom)
}

fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    coerced(deserializer, coercion::to_int)
}

fn whole<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    coerced(deserializer, coercion::to_whole)
}

fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    coerced(deserializer, coercion::to_float)
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    coerced(deserializer, coercion::to_bool)
}

fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    coerced(deserializer, coercion::to_date)
}

fn required_date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
    coerced(deserializer, coercion::to_required_date)
}

/// Row and account counts gathered before any cohort filtering.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetOverview {
    pub enrollment_rows: usize,
    pub enrolled_students: usize,
    pub engagement_rows: usize,
    pub engaged_students: usize,
    pub submission_rows: usize,
    pub submitting_students: usize,
    pub problem_students: usize,
    pub udacity_accounts: usize,
    pub paid_students: usize,
    pub first_week_engagement_rows: usize,
    pub passing_students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortComparison {
    pub metric: String,
    pub passing: BTreeMap<String, f64>,
    pub non_passing: BTreeMap<String, f64>,
    pub passing_summary: Option<Summary>,
    pub non_passing_summary: Option<Summary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortAnalysis {
    pub overview: DatasetOverview,
    pub minutes: CohortComparison,
    pub lessons: CohortComparison,
    pub days: CohortComparison,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::loader::CsvRow;
    use csv::StringRecord;
    use std::rc::Rc;

    fn row(headers: &[&str], values: &[&str]) -> CsvRow {
        CsvRow::new(
            Rc::new(StringRecord::from(headers.to_vec())),
            StringRecord::from(values.to_vec()),
            2,
        )
    }

    const ENROLLMENT_HEADERS: &[&str] = &[
        "account_key",
        "status",
        "join_date",
        "cancel_date",
        "days_to_cancel",
        "is_udacity",
        "is_canceled",
    ];

    #[test]
    fn enrollment_fields_are_coerced() {
        let record: EnrollmentRecord = row(
            ENROLLMENT_HEADERS,
            &["448", "canceled", "2014-11-10", "2015-01-14", "65", "True", "True"],
        )
        .deserialize()
        .unwrap();

        assert_eq!(record.account_key, "448");
        assert_eq!(record.join_date, NaiveDate::from_ymd_opt(2014, 11, 10));
        assert_eq!(record.cancel_date, NaiveDate::from_ymd_opt(2015, 1, 14));
        assert_eq!(record.days_to_cancel, 65);
        assert!(record.is_udacity);
        assert!(record.is_canceled);
    }

    #[test]
    fn current_enrollment_has_no_cancel_date() {
        let record: EnrollmentRecord = row(
            ENROLLMENT_HEADERS,
            &["700", "current", "2014-11-10", "", "", "False", "False"],
        )
        .deserialize()
        .unwrap();

        assert_eq!(record.cancel_date, None);
        assert_eq!(record.days_to_cancel, 0);
        assert!(!record.is_canceled);
    }

    #[test]
    fn bad_field_reports_line_and_value() {
        let err = row(
            ENROLLMENT_HEADERS,
            &["700", "current", "2014-11-10", "", "soon", "False", "False"],
        )
        .deserialize::<EnrollmentRecord>()
        .unwrap_err();

        assert!(matches!(err, AnalysisError::Parse { line: 2, .. }));
        let message = err.to_string();
        assert!(message.contains("expected an integer"));
        assert!(message.contains("soon"));
    }

    #[test]
    fn missing_column_is_rejected() {
        let err = row(&["account_key", "lesson_key"], &["256", "3176718735"])
            .deserialize::<SubmissionRecord>()
            .unwrap_err();

        assert!(matches!(err, AnalysisError::Parse { .. }));
        assert!(err.to_string().contains("assigned_rating"));
    }

    #[test]
    fn engagement_accepts_float_counts() {
        let record: EngagementRecord = row(
            &[
                "account_key",
                "utc_date",
                "num_courses_visited",
                "total_minutes_visited",
                "lessons_completed",
            ],
            &["0", "2015-01-09", "1.0", "11.6793745", "0.0"],
        )
        .deserialize()
        .unwrap();

        assert_eq!(record.num_courses_visited, 1);
        assert!((record.total_minutes_visited - 11.6793745).abs() < 1e-9);
        assert_eq!(record.lessons_completed, 0.0);
    }

    #[test]
    fn ratings_map_to_variants() {
        assert!(Rating::parse("PASSED").is_passing());
        assert!(Rating::parse("DISTINCTION").is_passing());
        assert!(!Rating::parse("INCOMPLETE").is_passing());
        assert!(!Rating::parse("UNGRADED").is_passing());
        assert_eq!(Rating::parse(""), Rating::Other(String::new()));
    }

    #[test]
    fn submission_fields_are_read_by_name() {
        let record: SubmissionRecord = row(
            &["creation_date", "completion_date", "assigned_rating", "account_key", "lesson_key"],
            &["2015-01-14", "2015-01-16", "PASSED", "256", "3176718735"],
        )
        .deserialize()
        .unwrap();

        assert_eq!(record.account_key, "256");
        assert_eq!(record.lesson_key, "3176718735");
        assert_eq!(record.assigned_rating, Rating::Passed);
    }
}
