//! Practice registration and address table parsers.

use csv::StringRecord;
use migrant_types::{Address, PracticeRegistration};

use crate::parser::{parse, Columns, TableRecord};
use crate::types::LoadResult;

/// Expected columns for practice registration files.
const REGISTRATION_COLUMNS: &[&str] = &["patient_id", "start_date", "end_date"];

/// Expected columns for address files.
const ADDRESS_COLUMNS: &[&str] = &["patient_id", "address_id", "start_date", "end_date"];

impl TableRecord for PracticeRegistration {
    const REQUIRED_COLUMNS: &'static [&'static str] = REGISTRATION_COLUMNS;

    fn from_record(record: &StringRecord, columns: &Columns) -> LoadResult<Self> {
        Ok(Self {
            patient_id: parse::patient_id(columns.field(record, "patient_id"))?,
            start_date: parse::required_date(columns.field(record, "start_date"), "start_date")?,
            end_date: parse::optional_date(columns.field(record, "end_date"))?,
            practice_nuts1_region_name: parse::optional_string(
                columns.field(record, "practice_nuts1_region_name"),
            ),
        })
    }
}

impl TableRecord for Address {
    const REQUIRED_COLUMNS: &'static [&'static str] = ADDRESS_COLUMNS;

    fn from_record(record: &StringRecord, columns: &Columns) -> LoadResult<Self> {
        Ok(Self {
            patient_id: parse::patient_id(columns.field(record, "patient_id"))?,
            address_id: parse::integer(columns.field(record, "address_id"))?,
            start_date: parse::required_date(columns.field(record, "start_date"), "start_date")?,
            end_date: parse::optional_date(columns.field(record, "end_date"))?,
            msoa_code: parse::optional_string(columns.field(record, "msoa_code")),
            imd_rounded: parse::optional_integer(columns.field(record, "imd_rounded"))?,
        })
    }
}
