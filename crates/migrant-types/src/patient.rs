//! Patient demographics.

use chrono::{Datelike, NaiveDate};

use crate::{PatientId, Sex};

/// A row from the patients table.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use migrant_types::{Patient, Sex};
///
/// let patient = Patient {
///     patient_id: 1,
///     sex: Sex::Female,
///     date_of_birth: NaiveDate::from_ymd_opt(1980, 6, 1),
///     date_of_death: None,
/// };
///
/// let census = NaiveDate::from_ymd_opt(2021, 3, 21).unwrap();
/// assert_eq!(patient.age_on(census), Some(40));
/// assert!(patient.is_alive_on(census));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Patient {
    /// Pseudonymised patient id.
    pub patient_id: PatientId,
    /// Recorded sex.
    pub sex: Sex,
    /// Date of birth (the backend rounds this to the first of the month).
    pub date_of_birth: Option<NaiveDate>,
    /// Date of death as recorded in primary care.
    pub date_of_death: Option<NaiveDate>,
}

impl Patient {
    /// Age in whole years on `date`.
    ///
    /// Returns `None` when the date of birth is unknown. Ages before birth
    /// are negative.
    pub fn age_on(&self, date: NaiveDate) -> Option<i64> {
        let dob = self.date_of_birth?;
        let mut age = i64::from(date.year()) - i64::from(dob.year());
        if (date.month(), date.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        Some(age)
    }

    /// Year of birth, if known.
    pub fn year_of_birth(&self) -> Option<i32> {
        self.date_of_birth.map(|dob| dob.year())
    }

    /// True when the patient was born on or before `date` and had not died
    /// on or before it.
    pub fn is_alive_on(&self, date: NaiveDate) -> bool {
        let born = self.date_of_birth.is_some_and(|dob| dob <= date);
        let not_dead = self.date_of_death.map_or(true, |death| death > date);
        born && not_dead
    }
}
