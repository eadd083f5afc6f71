//! Patient addresses and their area-level attributes.

use chrono::NaiveDate;

use crate::PatientId;

/// A row from the addresses table.
///
/// `imd_rounded` is the rank of the address's small area in the Index of
/// Multiple Deprivation, rounded to the nearest 100 (lower is more deprived).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Patient living at the address.
    pub patient_id: PatientId,
    /// Backend address id.
    pub address_id: u64,
    /// First day at this address.
    pub start_date: NaiveDate,
    /// Last day at this address, `None` if current.
    pub end_date: Option<NaiveDate>,
    /// MSOA code of the address, if it could be geocoded.
    pub msoa_code: Option<String>,
    /// Rounded IMD rank of the address's area.
    pub imd_rounded: Option<i32>,
}

impl Address {
    /// True when the patient lived at this address on `date`.
    pub fn spans(&self, date: NaiveDate) -> bool {
        self.start_date <= date && self.end_date.map_or(true, |end| end >= date)
    }

    /// True when the address was geocoded to a small area.
    pub fn has_msoa(&self) -> bool {
        self.msoa_code.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_address_spans_future_dates() {
        let address = Address {
            patient_id: 1,
            address_id: 10,
            start_date: NaiveDate::from_ymd_opt(2001, 1, 1).unwrap(),
            end_date: None,
            msoa_code: Some("E02000001".to_string()),
            imd_rounded: Some(1200),
        };
        assert!(address.spans(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
        assert!(address.has_msoa());
    }
}
