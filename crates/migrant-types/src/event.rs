//! Coded clinical events.

use chrono::NaiveDate;

use crate::{PatientId, SctId};

/// A row from the clinical events table.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use migrant_types::ClinicalEvent;
///
/// let event = ClinicalEvent {
///     patient_id: 7,
///     date: NaiveDate::from_ymd_opt(2015, 2, 1),
///     snomedct_code: 161152006,
/// };
///
/// assert!(event.is_on_or_before(NaiveDate::from_ymd_opt(2015, 2, 1).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClinicalEvent {
    /// Patient the event is recorded against.
    pub patient_id: PatientId,
    /// Date the event was recorded for. Missing dates are kept as `None`.
    pub date: Option<NaiveDate>,
    /// SNOMED CT code of the event.
    pub snomedct_code: SctId,
}

impl ClinicalEvent {
    /// True when the event is dated on or before `date`.
    ///
    /// Undated events never satisfy a date bound.
    pub fn is_on_or_before(&self, date: NaiveDate) -> bool {
        self.date.is_some_and(|d| d <= date)
    }
}
