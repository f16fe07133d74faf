use chrono::NaiveDate;

use crate::error::{AnalysisError, ParseError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the trial period, in days.
pub const TRIAL_DAYS: i64 = 7;

/// Empty string is 0.
pub fn to_int(value: &str) -> std::result::Result<i64, ParseError> {
    if value.is_empty() {
        return Ok(0);
    }
    value
        .parse::<i64>()
        .map_err(|_| ParseError::new("an integer", value))
}

/// Like [`to_int`], but also accepts integral float text such as `"2.0"`.
pub fn to_whole(value: &str) -> std::result::Result<i64, ParseError> {
    if let Ok(parsed) = to_int(value) {
        return Ok(parsed);
    }
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    match value.parse::<f64>() {
        Ok(parsed) if parsed.fract() == 0.0 && (-LIMIT..LIMIT).contains(&parsed) => {
            Ok(parsed as i64)
        }
        _ => Err(ParseError::new("a whole number", value)),
    }
}

/// Empty string is 0.0. `NaN` and infinities are rejected.
pub fn to_float(value: &str) -> std::result::Result<f64, ParseError> {
    if value.is_empty() {
        return Ok(0.0);
    }
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(ParseError::new("a number", value)),
    }
}

/// Empty string is "no date"; anything else must be `YYYY-MM-DD`.
pub fn to_date(value: &str) -> std::result::Result<Option<NaiveDate>, ParseError> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map(Some)
        .map_err(|_| ParseError::new("a YYYY-MM-DD date", value))
}

pub fn to_required_date(value: &str) -> std::result::Result<NaiveDate, ParseError> {
    to_date(value)?.ok_or_else(|| ParseError::new("a YYYY-MM-DD date", value))
}

/// `True`/`False` as exported by the course database. An empty flag is false.
pub fn to_bool(value: &str) -> std::result::Result<bool, ParseError> {
    match value {
        "True" | "true" => Ok(true),
        "False" | "false" | "" => Ok(false),
        _ => Err(ParseError::new("True or False", value)),
    }
}

/// True iff `event` falls on day 0 through day 6 after `join`.
pub fn within_one_week(join: Option<NaiveDate>, event: Option<NaiveDate>) -> Result<bool> {
    match (join, event) {
        (Some(join), Some(event)) => {
            let days = (event - join).num_days();
            Ok((0..TRIAL_DAYS).contains(&days))
        }
        _ => Err(AnalysisError::MissingDate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn empty_int_is_zero() {
        assert_eq!(to_int(""), Ok(0));
        assert_eq!(to_int("42"), Ok(42));
        assert_eq!(to_int("-3"), Ok(-3));
        assert!(to_int("4.5").is_err());
        assert!(to_int("seven").is_err());
    }

    #[test]
    fn whole_accepts_integral_floats_only() {
        assert_eq!(to_whole("3"), Ok(3));
        assert_eq!(to_whole("3.0"), Ok(3));
        assert_eq!(to_whole(""), Ok(0));
        assert!(to_whole("2.5").is_err());
        assert!(to_whole("NaN").is_err());
    }

    #[test]
    fn whole_rejects_out_of_range_values() {
        assert!(to_whole("99999999999999999999").is_err());
        assert!(to_whole("1e300").is_err());
        assert!(to_whole("-1e19").is_err());
        assert!(to_whole("9223372036854775808.0").is_err());
        assert_eq!(to_whole("-9223372036854775808.0"), Ok(i64::MIN));
        assert_eq!(to_whole("1e3"), Ok(1000));
    }

    #[test]
    fn float_parsing() {
        assert_eq!(to_float(""), Ok(0.0));
        assert_eq!(to_float("11.679"), Ok(11.679));
        assert!(to_float("x").is_err());
        assert!(to_float("inf").is_err());
    }

    #[test]
    fn empty_date_is_none() {
        assert_eq!(to_date(""), Ok(None));
        assert_eq!(to_date("2014-11-10"), Ok(Some(date("2014-11-10"))));
    }

    #[test]
    fn required_date_rejects_empty() {
        assert!(to_required_date("").is_err());
        assert_eq!(to_required_date("2015-01-09"), Ok(date("2015-01-09")));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        assert!(to_date("2014/11/10").is_err());
        assert!(to_date("2014-13-01").is_err());
        assert!(to_date("10-11-2014").is_err());
    }

    #[test]
    fn booleans_are_explicit() {
        assert_eq!(to_bool("True"), Ok(true));
        assert_eq!(to_bool("False"), Ok(false));
        assert_eq!(to_bool(""), Ok(false));
        assert!(to_bool("yes").is_err());
    }

    #[test]
    fn week_window_is_half_open() {
        let d = date("2014-01-01");
        assert!(within_one_week(Some(d), Some(d)).unwrap());
        assert!(within_one_week(Some(d), Some(d + Duration::days(6))).unwrap());
        assert!(!within_one_week(Some(d), Some(d + Duration::days(7))).unwrap());
    }

    #[test]
    fn engagement_before_join_is_outside_week() {
        let d = date("2014-01-08");
        assert!(!within_one_week(Some(d), Some(d - Duration::days(1))).unwrap());
    }

    #[test]
    fn missing_dates_are_a_precondition_failure() {
        let d = date("2014-01-01");
        assert!(matches!(
            within_one_week(None, Some(d)),
            Err(AnalysisError::MissingDate)
        ));
        assert!(matches!(
            within_one_week(Some(d), None),
            Err(AnalysisError::MissingDate)
        ));
    }
}
