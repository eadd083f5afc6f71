//! Study errors.

use migrant_loader::{ErrorKind, LoadError};
use thiserror::Error;

/// Errors raised while defining, evaluating or writing study outputs.
#[derive(Error, Debug)]
pub enum StudyError {
    /// Codelist or backend loading failed.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// I/O error writing output.
    #[error("IO error writing output: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer error.
    #[error("CSV output error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON writer error.
    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    /// A date argument could not be parsed.
    #[error("Invalid date: {value} (expected YYYY-MM-DD)")]
    InvalidDate {
        /// The rejected value.
        value: String,
    },

    /// Two measures were defined with the same name.
    #[error("Duplicate measure name: {name}")]
    DuplicateMeasure {
        /// The repeated name.
        name: String,
    },

    /// A measure has no denominator and the set has no default.
    #[error("Measure {name} has no denominator")]
    MissingDenominator {
        /// The measure name.
        name: String,
    },
}

impl StudyError {
    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Load(e) => e.kind(),
            Self::Io(_) => ErrorKind::Io,
            Self::Csv(e) if e.is_io_error() => ErrorKind::Io,
            Self::Csv(_)
            | Self::Json(_)
            | Self::InvalidDate { .. }
            | Self::DuplicateMeasure { .. }
            | Self::MissingDenominator { .. } => ErrorKind::MalformedInput,
        }
    }
}

/// Result type for study operations.
pub type StudyResult<T> = Result<T, StudyError>;
