//! Loader-specific types: errors, configuration and statistics.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading codelists or backend tables.
#[derive(Error, Debug)]
pub enum LoadError {
    /// I/O error reading a CSV resource.
    #[error("IO error reading CSV resource: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error.
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// File not found.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Directory not found.
    #[error("Directory not found: {path}")]
    DirectoryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Required table missing from the extract directory.
    #[error("Required table not found: {table} in {directory}")]
    RequiredTableMissing {
        /// The missing table file names.
        table: String,
        /// The directory that was searched.
        directory: String,
    },

    /// Missing required column.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// The name of the missing column.
        column: String,
    },

    /// Invalid SNOMED CT code.
    #[error("Invalid SNOMED CT code: {value}")]
    InvalidCode {
        /// The invalid value that was encountered.
        value: String,
    },

    /// Invalid date format.
    #[error("Invalid date format: {value} (expected YYYY-MM-DD)")]
    InvalidDate {
        /// The invalid date value.
        value: String,
    },

    /// Invalid integer value.
    #[error("Invalid integer value: {value}")]
    InvalidInteger {
        /// The invalid integer value.
        value: String,
    },

    /// Invalid sex code.
    #[error("Invalid sex value: {value} (expected male, female, intersex or unknown)")]
    InvalidSex {
        /// The invalid sex value.
        value: String,
    },

    /// A required field was blank.
    #[error("Missing value for column: {column}")]
    MissingValue {
        /// The column with the blank value.
        column: String,
    },

    /// A row-level error with its location.
    #[error("{path}, line {line}: {source}")]
    AtLine {
        /// File or resource name.
        path: String,
        /// 1-based line number including the header.
        line: u64,
        /// The underlying error.
        source: Box<LoadError>,
    },
}

/// Broad classification of a [`LoadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A file or directory does not exist.
    NotFound,
    /// The resource exists but its contents are unusable.
    MalformedInput,
    /// The resource could not be read.
    Io,
}

impl LoadError {
    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::FileNotFound { .. }
            | Self::DirectoryNotFound { .. }
            | Self::RequiredTableMissing { .. } => ErrorKind::NotFound,
            Self::Io(_) => ErrorKind::Io,
            Self::AtLine { source, .. } => source.kind(),
            Self::Csv(_)
            | Self::MissingColumn { .. }
            | Self::InvalidCode { .. }
            | Self::InvalidDate { .. }
            | Self::InvalidInteger { .. }
            | Self::InvalidSex { .. }
            | Self::MissingValue { .. } => ErrorKind::MalformedInput,
        }
    }

    pub(crate) fn at_line(self, path: &str, line: u64) -> Self {
        Self::AtLine {
            path: path.to_string(),
            line,
            source: Box::new(self),
        }
    }
}

/// Result type for loader operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Configuration for table loading.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Fail on the first malformed row (true) or skip and count it (false).
    pub strict: bool,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            strict: true,
        }
    }
}

impl LoadConfig {
    /// Creates a config that skips malformed rows instead of failing.
    pub fn lenient() -> Self {
        Self { strict: false }
    }
}

/// Statistics from parsing a table.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    /// Total records read from file.
    pub total_records: usize,
    /// Records that parsed successfully.
    pub loaded_records: usize,
    /// Malformed records skipped in lenient mode.
    pub error_count: usize,
}

impl ParseStats {
    /// Returns the percentage of records that loaded.
    pub fn load_rate(&self) -> f64 {
        if self.total_records == 0 {
            0.0
        } else {
            (self.loaded_records as f64 / self.total_records as f64) * 100.0
        }
    }
}

/// Discovered tables in a backend extract directory.
#[derive(Debug, Clone, Default)]
pub struct BackendFiles {
    /// Path to `patients.csv`.
    pub patients: Option<PathBuf>,
    /// Path to `clinical_events.csv`.
    pub clinical_events: Option<PathBuf>,
    /// Path to `practice_registrations.csv`.
    pub practice_registrations: Option<PathBuf>,
    /// Path to `addresses.csv`.
    pub addresses: Option<PathBuf>,
    /// Path to `ons_deaths.csv`.
    pub ons_deaths: Option<PathBuf>,
}

impl BackendFiles {
    /// Creates a new empty BackendFiles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the required tables (patients, clinical events) are present.
    pub fn has_required_files(&self) -> bool {
        self.patients.is_some() && self.clinical_events.is_some()
    }

    /// Returns a list of missing required tables.
    pub fn missing_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.patients.is_none() {
            missing.push("patients.csv");
        }
        if self.clinical_events.is_none() {
            missing.push("clinical_events.csv");
        }
        missing
    }

    /// Returns a list of absent optional tables.
    pub fn missing_optional_files(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.practice_registrations.is_none() {
            missing.push("practice_registrations.csv");
        }
        if self.addresses.is_none() {
            missing.push("addresses.csv");
        }
        if self.ons_deaths.is_none() {
            missing.push("ons_deaths.csv");
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = LoadConfig::default();
        assert!(config.strict);
        assert!(!LoadConfig::lenient().strict);
    }

    #[test]
    fn test_error_kinds() {
        let not_found = LoadError::FileNotFound {
            path: "x.csv".to_string(),
        };
        assert_eq!(not_found.kind(), ErrorKind::NotFound);

        let missing = LoadError::MissingColumn {
            column: "code".to_string(),
        };
        assert_eq!(missing.kind(), ErrorKind::MalformedInput);

        let nested = LoadError::InvalidDate {
            value: "2020/01/01".to_string(),
        }
        .at_line("events.csv", 3);
        assert_eq!(nested.kind(), ErrorKind::MalformedInput);
        assert!(nested.to_string().starts_with("events.csv, line 3:"));
    }

    #[test]
    fn test_parse_stats_load_rate() {
        let stats = ParseStats {
            total_records: 200,
            loaded_records: 150,
            ..Default::default()
        };
        assert!((stats.load_rate() - 75.0).abs() < 0.01);
        assert_eq!(ParseStats::default().load_rate(), 0.0);
    }

    #[test]
    fn test_backend_files_missing() {
        let files = BackendFiles {
            patients: Some(PathBuf::from("patients.csv")),
            ..Default::default()
        };

        assert!(!files.has_required_files());
        assert_eq!(files.missing_files(), vec!["clinical_events.csv"]);
        assert_eq!(files.missing_optional_files().len(), 3);
    }
}
