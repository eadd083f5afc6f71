//! Study dates.

use chrono::NaiveDate;

use crate::error::{StudyError, StudyResult};

/// Dates that parameterise the study definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StudyConfig {
    /// Reference date of the census cohort.
    pub census_date: NaiveDate,
    /// First day of the study period.
    pub study_start: NaiveDate,
    /// Last day of the study period.
    pub study_end: NaiveDate,
    /// Start of the first annual measure interval.
    pub measures_start: NaiveDate,
    /// Number of annual measure intervals.
    pub measure_years: u32,
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            census_date: ymd(2021, 3, 21),
            study_start: ymd(2009, 1, 1),
            study_end: ymd(2024, 12, 31),
            measures_start: ymd(2009, 1, 1),
            measure_years: 16,
        }
    }
}

impl StudyConfig {
    /// Returns a copy with a different census date.
    pub fn with_census_date(self, census_date: NaiveDate) -> Self {
        Self {
            census_date,
            ..self
        }
    }
}

/// Parses an ISO `YYYY-MM-DD` date argument.
pub fn parse_date(value: &str) -> StudyResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| StudyError::InvalidDate {
        value: value.to_string(),
    })
}

// Only called with literal dates.
fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid calendar date")
}
