//! Clinical events table parser.

use csv::StringRecord;
use migrant_types::ClinicalEvent;

use crate::parser::{parse, Columns, TableRecord};
use crate::types::LoadResult;

/// Expected columns in a clinical events file.
const EVENT_COLUMNS: &[&str] = &["patient_id", "date", "snomedct_code"];

impl TableRecord for ClinicalEvent {
    const REQUIRED_COLUMNS: &'static [&'static str] = EVENT_COLUMNS;

    fn from_record(record: &StringRecord, columns: &Columns) -> LoadResult<Self> {
        Ok(ClinicalEvent {
            patient_id: parse::patient_id(columns.field(record, "patient_id"))?,
            date: parse::optional_date(columns.field(record, "date"))?,
            snomedct_code: parse::sctid(columns.field(record, "snomedct_code"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::TableParser;
    use crate::types::LoadConfig;

    #[test]
    fn test_parse_events() {
        let data = "patient_id,date,snomedct_code\n1,2015-06-01,161152006\n1,,315354004\n";
        let parser =
            TableParser::<_, ClinicalEvent>::from_reader(data.as_bytes(), "events", LoadConfig::default())
                .unwrap();
        let (events, _) = parser.parse_all().unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].snomedct_code, 161152006);
        assert!(events[0].date.is_some());
        assert_eq!(events[1].date, None);
    }

    #[test]
    fn test_reject_bad_code() {
        let data = "patient_id,date,snomedct_code\n1,2015-06-01,XaBc1\n";
        let parser =
            TableParser::<_, ClinicalEvent>::from_reader(data.as_bytes(), "events", LoadConfig::default())
                .unwrap();
        assert!(parser.parse_all().is_err());
    }
}
