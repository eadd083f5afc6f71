//! Practice registrations.

use chrono::NaiveDate;

use crate::PatientId;

/// A row from the practice registrations table.
///
/// A registration with no end date is ongoing.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use migrant_types::PracticeRegistration;
///
/// let registration = PracticeRegistration {
///     patient_id: 1,
///     start_date: NaiveDate::from_ymd_opt(2010, 4, 1).unwrap(),
///     end_date: None,
///     practice_nuts1_region_name: Some("London".to_string()),
/// };
///
/// assert!(registration.is_ongoing());
/// assert!(registration.spans(NaiveDate::from_ymd_opt(2021, 3, 21).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PracticeRegistration {
    /// Registered patient.
    pub patient_id: PatientId,
    /// First day of the registration.
    pub start_date: NaiveDate,
    /// Last day of the registration, `None` while ongoing.
    pub end_date: Option<NaiveDate>,
    /// NUTS1 region of the practice.
    pub practice_nuts1_region_name: Option<String>,
}

impl PracticeRegistration {
    /// True when the registration has no end date.
    pub fn is_ongoing(&self) -> bool {
        self.end_date.is_none()
    }

    /// True when the registration covers `date` (start and end inclusive).
    pub fn spans(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }
}
