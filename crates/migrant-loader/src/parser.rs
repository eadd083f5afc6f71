//! Generic CSV table parser.
//!
//! Provides a streaming parser for the comma-separated backend extracts.
//! Columns are located by header name, so extra columns and any column
//! order are accepted.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

use csv::{Reader, ReaderBuilder, StringRecord};

use crate::types::{LoadConfig, LoadError, LoadResult, ParseStats};

/// Trait for types that can be parsed from a backend table row.
///
/// Implement this trait for each table record type.
pub trait TableRecord: Sized {
    /// Column names that must be present in the header.
    const REQUIRED_COLUMNS: &'static [&'static str];

    /// Parse a record using the resolved header positions.
    fn from_record(record: &StringRecord, columns: &Columns) -> LoadResult<Self>;
}

/// Header name to position lookup for one CSV file.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    positions: HashMap<String, usize>,
}

impl Columns {
    /// Builds the lookup from a header record.
    ///
    /// A UTF-8 BOM on the first header and surrounding whitespace are ignored.
    pub fn from_headers(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim_start_matches('\u{feff}').trim().to_string(), i))
            .collect();
        Self { positions }
    }

    /// Fails with [`LoadError::MissingColumn`] for the first absent column.
    pub fn require(&self, required: &[&str]) -> LoadResult<()> {
        match required.iter().find(|name| !self.contains(name)) {
            Some(name) => Err(LoadError::MissingColumn {
                column: (*name).to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Returns true if the header has a column with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Returns the position of a column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Returns the trimmed field for `name`, or `""` when the column or field
    /// is absent.
    pub fn field<'r>(&self, record: &'r StringRecord, name: &str) -> &'r str {
        self.position(name)
            .and_then(|i| record.get(i))
            .map(str::trim)
            .unwrap_or("")
    }
}

/// A streaming parser for backend CSV tables.
///
/// This parser reads files record-by-record to avoid loading
/// entire files into memory.
pub struct TableParser<R: Read, T: TableRecord> {
    reader: Reader<R>,
    columns: Columns,
    source: String,
    config: LoadConfig,
    _marker: PhantomData<T>,
}

impl<T: TableRecord> TableParser<BufReader<File>, T> {
    /// Creates a new parser from a file path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or lacks a required column.
    pub fn from_path<P: AsRef<Path>>(path: P, config: LoadConfig) -> LoadResult<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(LoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), &path.display().to_string(), config)
    }
}

impl<R: Read, T: TableRecord> TableParser<R, T> {
    /// Creates a new parser from a reader. `source` names the input in errors.
    pub fn from_reader(reader: R, source: &str, config: LoadConfig) -> LoadResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::None)
            .from_reader(reader);

        let columns = Columns::from_headers(csv_reader.headers()?);
        columns.require(T::REQUIRED_COLUMNS)?;

        Ok(Self {
            reader: csv_reader,
            columns,
            source: source.to_string(),
            config,
            _marker: PhantomData,
        })
    }

    /// Parses all records into a Vec.
    ///
    /// In strict mode the first malformed row is returned as an error.
    /// Otherwise malformed rows are logged, counted and skipped.
    pub fn parse_all(mut self) -> LoadResult<(Vec<T>, ParseStats)> {
        let strict = self.config.strict;
        let mut results = Vec::new();
        let mut stats = ParseStats::default();

        for next in self.by_ref() {
            stats.total_records += 1;
            match next {
                Ok(record) => {
                    results.push(record);
                    stats.loaded_records += 1;
                }
                Err(e) if strict => return Err(e),
                Err(e) => {
                    tracing::warn!("Skipping malformed row: {}", e);
                    stats.error_count += 1;
                }
            }
        }

        Ok((results, stats))
    }
}

impl<R: Read, T: TableRecord> Iterator for TableParser<R, T> {
    type Item = LoadResult<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    // Skip empty records
                    if record.is_empty() || record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }

                    let line = record.position().map_or(0, |p| p.line());
                    return Some(
                        T::from_record(&record, &self.columns)
                            .map_err(|e| e.at_line(&self.source, line)),
                    );
                }
                Ok(false) => return None, // End of file
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}

/// Helper functions for parsing field values.
pub mod parse {
    use chrono::NaiveDate;
    use migrant_types::{PatientId, SctId, Sex};

    use super::{LoadError, LoadResult};

    /// Parses a SNOMED CT code.
    pub fn sctid(value: &str) -> LoadResult<SctId> {
        let value = value.trim();
        value.parse::<u64>().map_err(|_| LoadError::InvalidCode {
            value: value.to_string(),
        })
    }

    /// Parses a patient id.
    pub fn patient_id(value: &str) -> LoadResult<PatientId> {
        integer(value)
    }

    /// Parses an ISO `YYYY-MM-DD` date.
    pub fn date(value: &str) -> LoadResult<NaiveDate> {
        NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| LoadError::InvalidDate {
            value: value.to_string(),
        })
    }

    /// Parses a date where a blank field means null.
    pub fn optional_date(value: &str) -> LoadResult<Option<NaiveDate>> {
        if value.trim().is_empty() {
            Ok(None)
        } else {
            date(value).map(Some)
        }
    }

    /// Parses a date that must be present.
    pub fn required_date(value: &str, column: &str) -> LoadResult<NaiveDate> {
        optional_date(value)?.ok_or_else(|| LoadError::MissingValue {
            column: column.to_string(),
        })
    }

    /// Parses an integer value.
    pub fn integer<T: std::str::FromStr>(value: &str) -> LoadResult<T> {
        value.trim().parse::<T>().map_err(|_| LoadError::InvalidInteger {
            value: value.to_string(),
        })
    }

    /// Parses an integer where a blank field means null.
    pub fn optional_integer<T: std::str::FromStr>(value: &str) -> LoadResult<Option<T>> {
        if value.trim().is_empty() {
            Ok(None)
        } else {
            integer(value).map(Some)
        }
    }

    /// Returns `None` for a blank field.
    pub fn optional_string(value: &str) -> Option<String> {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    /// Parses a sex code. A blank field is read as unknown.
    pub fn sex(value: &str) -> LoadResult<Sex> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Sex::Unknown);
        }
        Sex::from_code(value).ok_or_else(|| LoadError::InvalidSex {
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migrant_types::Sex;

    #[derive(Debug)]
    struct Pair {
        id: u64,
        label: Option<String>,
    }

    impl TableRecord for Pair {
        const REQUIRED_COLUMNS: &'static [&'static str] = &["id"];

        fn from_record(record: &StringRecord, columns: &Columns) -> LoadResult<Self> {
            Ok(Pair {
                id: parse::integer(columns.field(record, "id"))?,
                label: parse::optional_string(columns.field(record, "label")),
            })
        }
    }

    #[test]
    fn test_parse_sctid() {
        assert_eq!(parse::sctid("161152006").unwrap(), 161152006u64);
        assert_eq!(parse::sctid(" 315354004 ").unwrap(), 315354004u64);
        assert!(parse::sctid("not_a_code").is_err());
        assert!(parse::sctid("").is_err());
    }

    #[test]
    fn test_parse_dates() {
        assert_eq!(
            parse::date("2021-03-21").unwrap(),
            NaiveDate::from_ymd_opt(2021, 3, 21).unwrap()
        );
        assert!(parse::date("21/03/2021").is_err());
        assert_eq!(parse::optional_date("").unwrap(), None);
        assert!(parse::required_date(" ", "start_date").is_err());
    }

    #[test]
    fn test_parse_sex() {
        assert_eq!(parse::sex("female").unwrap(), Sex::Female);
        assert_eq!(parse::sex("").unwrap(), Sex::Unknown);
        assert!(parse::sex("F").is_err());
    }

    #[test]
    fn test_columns_by_name() {
        let data = "label,id\nfirst,1\n,2\n\n";
        let parser =
            TableParser::<_, Pair>::from_reader(data.as_bytes(), "pairs", LoadConfig::default())
                .unwrap();
        let (rows, stats) = parser.parse_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].label.as_deref(), Some("first"));
        assert_eq!(rows[1].label, None);
        assert_eq!(stats.loaded_records, 2);
    }

    #[test]
    fn test_missing_required_column() {
        let data = "label\nfirst\n";
        let result =
            TableParser::<_, Pair>::from_reader(data.as_bytes(), "pairs", LoadConfig::default());
        assert!(matches!(result, Err(LoadError::MissingColumn { column }) if column == "id"));
    }

    #[test]
    fn test_bom_is_ignored() {
        let data = "\u{feff}id\n5\n";
        let parser =
            TableParser::<_, Pair>::from_reader(data.as_bytes(), "pairs", LoadConfig::default())
                .unwrap();
        let (rows, _) = parser.parse_all().unwrap();
        assert_eq!(rows[0].id, 5);
    }

    #[test]
    fn test_strict_and_lenient() {
        let data = "id\n1\nx\n3\n";

        let strict =
            TableParser::<_, Pair>::from_reader(data.as_bytes(), "pairs", LoadConfig::default())
                .unwrap();
        let err = strict.parse_all().unwrap_err();
        assert!(err.to_string().contains("pairs, line 3"));

        let lenient =
            TableParser::<_, Pair>::from_reader(data.as_bytes(), "pairs", LoadConfig::lenient())
                .unwrap();
        let (rows, stats) = lenient.parse_all().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(stats.error_count, 1);
        assert_eq!(stats.total_records, 3);
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = TableParser::<BufReader<File>, Pair>::from_path(
            "/definitely/not/here/pairs.csv",
            LoadConfig::default(),
        );
        assert!(matches!(result, Err(LoadError::FileNotFound { .. })));
    }
}
