//! Patient variables shared by the cohort and measure definitions.

use chrono::NaiveDate;
use migrant_loader::{Codelist, PatientRecord};
use migrant_status::{imd_decile, imd_quintile};
use migrant_types::{well_known, SctId};

/// Upper age bound (exclusive) of the census and measure denominators.
pub const MAX_PLAUSIBLE_AGE: i64 = 110;

/// Oldest age (inclusive) at study start for the study-period cohorts.
pub const MAX_AGE_AT_STUDY_START: i64 = 100;

/// Sex is male or female.
pub fn has_non_disclosive_sex(record: &PatientRecord<'_>) -> bool {
    record.patient.sex.is_non_disclosive()
}

/// `0 < age < 110` on `date`; false when the date of birth is unknown.
pub fn has_possible_age(record: &PatientRecord<'_>, date: NaiveDate) -> bool {
    record
        .patient
        .age_on(date)
        .is_some_and(|age| age > 0 && age < MAX_PLAUSIBLE_AGE)
}

/// Neither the primary-care nor the ONS death date is before `date`.
pub fn is_alive_at(record: &PatientRecord<'_>, date: NaiveDate) -> bool {
    record.patient.date_of_death.map_or(true, |d| d >= date)
        && record.ons_death_date().map_or(true, |d| d >= date)
}

/// Has a registration that is ongoing or ended within `(start, end]`.
pub fn is_registered_during(record: &PatientRecord<'_>, start: NaiveDate, end: NaiveDate) -> bool {
    record.registrations.iter().any(|r| match r.end_date {
        None => true,
        Some(end_date) => end_date > start && end_date <= end,
    })
}

/// Code of the latest event in an ethnicity codelist.
pub fn latest_ethnicity_code(
    record: &PatientRecord<'_>,
    codelist: &Codelist,
    on_or_before: Option<NaiveDate>,
) -> Option<SctId> {
    record.latest_code_in(codelist, on_or_before)
}

/// Category of the latest event in an ethnicity codelist.
pub fn latest_ethnicity_group<'c>(
    record: &PatientRecord<'_>,
    codelist: &'c Codelist,
    on_or_before: Option<NaiveDate>,
) -> Option<&'c str> {
    latest_ethnicity_code(record, codelist, on_or_before).and_then(|code| codelist.category(code))
}

/// Latest ethnicity group, or "unknown".
pub fn ethnicity_or_unknown<'c>(
    record: &PatientRecord<'_>,
    codelist: &'c Codelist,
    on_or_before: Option<NaiveDate>,
) -> &'c str {
    latest_ethnicity_group(record, codelist, on_or_before).unwrap_or(well_known::UNKNOWN_ETHNICITY)
}

/// Practice region on `date`.
pub fn region_on(record: &PatientRecord<'_>, date: NaiveDate) -> Option<String> {
    record
        .registration_on(date)
        .and_then(|r| r.practice_nuts1_region_name.clone())
}

/// MSOA of the address on `date`.
pub fn msoa_on(record: &PatientRecord<'_>, date: NaiveDate) -> Option<String> {
    record.address_on(date).and_then(|a| a.msoa_code.clone())
}

/// IMD quintile of the address on `date`; "unknown" without an address or rank.
pub fn imd_quintile_on(record: &PatientRecord<'_>, date: NaiveDate) -> &'static str {
    imd_quintile(imd_rounded_on(record, date))
}

/// IMD decile of the address on `date`; "unknown" without an address or rank.
pub fn imd_decile_on(record: &PatientRecord<'_>, date: NaiveDate) -> &'static str {
    imd_decile(imd_rounded_on(record, date))
}

fn imd_rounded_on(record: &PatientRecord<'_>, date: NaiveDate) -> Option<i32> {
    record.address_on(date).and_then(|a| a.imd_rounded)
}

/// Days from first practice registration to the first migration code.
pub fn days_to_first_code(record: &PatientRecord<'_>, codelist: &Codelist) -> Option<i64> {
    let first_code = record.first_event_in(codelist)?.date?;
    let first_registration = record.first_registration()?.start_date;
    Some((first_code - first_registration).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use migrant_loader::PatientStore;
    use migrant_types::{
        Address, ClinicalEvent, OnsDeath, Patient, PracticeRegistration, Sex,
    };

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> PatientStore {
        let mut store = PatientStore::new();
        store.insert_patients([Patient {
            patient_id: 1,
            sex: Sex::Male,
            date_of_birth: Some(ymd(1950, 6, 1)),
            date_of_death: None,
        }]);
        store.insert_registrations([PracticeRegistration {
            patient_id: 1,
            start_date: ymd(2008, 1, 1),
            end_date: Some(ymd(2009, 1, 1)),
            practice_nuts1_region_name: Some("London".to_string()),
        }]);
        store.insert_addresses([Address {
            patient_id: 1,
            address_id: 7,
            start_date: ymd(2000, 1, 1),
            end_date: None,
            msoa_code: Some("E02000001".to_string()),
            imd_rounded: Some(100),
        }]);
        store.insert_events([
            ClinicalEvent {
                patient_id: 1,
                date: Some(ymd(2008, 1, 11)),
                snomedct_code: 5,
            },
            ClinicalEvent {
                patient_id: 1,
                date: Some(ymd(2015, 1, 1)),
                snomedct_code: 6,
            },
        ]);
        store.insert_ons_deaths([OnsDeath {
            patient_id: 1,
            date: Some(ymd(2008, 12, 31)),
        }]);
        store
    }

    #[test]
    fn test_registered_during_is_left_open() {
        let store = store();
        let record = store.record(1).unwrap();
        // Registration ended on the study start date itself.
        assert!(!is_registered_during(&record, ymd(2009, 1, 1), ymd(2024, 12, 31)));
        assert!(is_registered_during(&record, ymd(2008, 12, 31), ymd(2024, 12, 31)));
    }

    #[test]
    fn test_alive_uses_both_death_sources() {
        let store = store();
        let record = store.record(1).unwrap();
        assert!(is_alive_at(&record, ymd(2008, 12, 31)));
        assert!(!is_alive_at(&record, ymd(2009, 1, 1)));
    }

    #[test]
    fn test_possible_age() {
        let store = store();
        let record = store.record(1).unwrap();
        assert!(has_possible_age(&record, ymd(2021, 3, 21)));
        assert!(!has_possible_age(&record, ymd(1950, 6, 1)));
        assert!(!has_possible_age(&record, ymd(2060, 6, 1)));
        assert!(has_non_disclosive_sex(&record));
    }

    #[test]
    fn test_ethnicity_lookup() {
        let store = store();
        let record = store.record(1).unwrap();
        let codelist = Codelist::from_categories("eth", [(5, "White - British"), (6, "Irish")]);

        assert_eq!(latest_ethnicity_code(&record, &codelist, None), Some(6));
        assert_eq!(
            latest_ethnicity_group(&record, &codelist, Some(ymd(2010, 1, 1))),
            Some("White - British")
        );
        assert_eq!(
            ethnicity_or_unknown(&record, &codelist, Some(ymd(2000, 1, 1))),
            "unknown"
        );
    }

    #[test]
    fn test_address_and_region() {
        let store = store();
        let record = store.record(1).unwrap();
        assert_eq!(region_on(&record, ymd(2008, 6, 1)).as_deref(), Some("London"));
        assert_eq!(region_on(&record, ymd(2010, 6, 1)), None);
        assert_eq!(msoa_on(&record, ymd(2010, 6, 1)).as_deref(), Some("E02000001"));
        assert_eq!(imd_quintile_on(&record, ymd(2010, 6, 1)), "1 (most deprived)");
        // No address before 2000.
        assert_eq!(imd_decile_on(&record, ymd(1999, 6, 1)), "unknown");
        assert_eq!(imd_quintile_on(&record, ymd(1999, 6, 1)), "unknown");
    }

    #[test]
    fn test_imd_unknown_without_address_or_rank() {
        let mut store = PatientStore::new();
        store.insert_patients([Patient {
            patient_id: 2,
            sex: Sex::Female,
            date_of_birth: Some(ymd(1970, 1, 1)),
            date_of_death: None,
        }]);
        store.insert_addresses([Address {
            patient_id: 2,
            address_id: 1,
            start_date: ymd(2010, 1, 1),
            end_date: None,
            msoa_code: None,
            imd_rounded: None,
        }]);
        let record = store.record(2).unwrap();
        assert_eq!(imd_quintile_on(&record, ymd(2005, 1, 1)), "unknown");
        assert_eq!(imd_quintile_on(&record, ymd(2015, 1, 1)), "unknown");
        assert_eq!(imd_decile_on(&record, ymd(2015, 1, 1)), "unknown");
    }

    #[test]
    fn test_days_to_first_code() {
        let store = store();
        let record = store.record(1).unwrap();
        let codelist = Codelist::from_codes("mig", [5, 6]);
        assert_eq!(days_to_first_code(&record, &codelist), Some(10));
        assert_eq!(days_to_first_code(&record, &Codelist::default()), None);
    }
}
