//! Patients and ONS deaths table parsers.
//!
//! Parses `patients.csv` and `ons_deaths.csv` extracts.

use csv::StringRecord;
use migrant_types::{OnsDeath, Patient};

use crate::parser::{parse, Columns, TableRecord};
use crate::types::LoadResult;

/// Expected columns in a patients file.
const PATIENT_COLUMNS: &[&str] = &["patient_id", "sex", "date_of_birth", "date_of_death"];

/// Expected columns in an ONS deaths file.
const ONS_DEATH_COLUMNS: &[&str] = &["patient_id", "date"];

impl TableRecord for Patient {
    const REQUIRED_COLUMNS: &'static [&'static str] = PATIENT_COLUMNS;

    fn from_record(record: &StringRecord, columns: &Columns) -> LoadResult<Self> {
        Ok(Patient {
            patient_id: parse::patient_id(columns.field(record, "patient_id"))?,
            sex: parse::sex(columns.field(record, "sex"))?,
            date_of_birth: parse::optional_date(columns.field(record, "date_of_birth"))?,
            date_of_death: parse::optional_date(columns.field(record, "date_of_death"))?,
        })
    }
}

impl TableRecord for OnsDeath {
    const REQUIRED_COLUMNS: &'static [&'static str] = ONS_DEATH_COLUMNS;

    fn from_record(record: &StringRecord, columns: &Columns) -> LoadResult<Self> {
        Ok(OnsDeath {
            patient_id: parse::patient_id(columns.field(record, "patient_id"))?,
            date: parse::optional_date(columns.field(record, "date"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migrant_types::Sex;

    fn make_record(fields: &[&str]) -> StringRecord {
        let mut record = StringRecord::new();
        for field in fields {
            record.push_field(field);
        }
        record
    }

    #[test]
    fn test_parse_patient_record() {
        let columns = Columns::from_headers(&make_record(PATIENT_COLUMNS));
        let record = make_record(&["12", "female", "1984-07-01", ""]);

        let patient = Patient::from_record(&record, &columns).unwrap();
        assert_eq!(patient.patient_id, 12);
        assert_eq!(patient.sex, Sex::Female);
        assert_eq!(patient.date_of_birth, NaiveDate::from_ymd_opt(1984, 7, 1));
        assert_eq!(patient.date_of_death, None);
    }

    #[test]
    fn test_reject_bad_sex() {
        let columns = Columns::from_headers(&make_record(PATIENT_COLUMNS));
        let record = make_record(&["12", "F", "1984-07-01", ""]);
        assert!(Patient::from_record(&record, &columns).is_err());
    }

    #[test]
    fn test_parse_ons_death() {
        let columns = Columns::from_headers(&make_record(&["date", "patient_id"]));
        let record = make_record(&["2019-11-02", "3"]);

        let death = OnsDeath::from_record(&record, &columns).unwrap();
        assert_eq!(death.patient_id, 3);
        assert_eq!(death.date, NaiveDate::from_ymd_opt(2019, 11, 2));
    }
}
