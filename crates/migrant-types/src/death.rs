//! ONS death registrations.

use chrono::NaiveDate;

use crate::PatientId;

/// A row from the ONS deaths table.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OnsDeath {
    /// Deceased patient.
    pub patient_id: PatientId,
    /// Registered date of death.
    pub date: Option<NaiveDate>,
}
