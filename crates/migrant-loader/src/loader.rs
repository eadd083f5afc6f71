//! Backend extract discovery.

use std::fs;
use std::path::Path;

use crate::types::{BackendFiles, LoadError, LoadResult};

/// File name of the patients table.
pub const PATIENTS_FILE: &str = "patients.csv";
/// File name of the clinical events table.
pub const CLINICAL_EVENTS_FILE: &str = "clinical_events.csv";
/// File name of the practice registrations table.
pub const PRACTICE_REGISTRATIONS_FILE: &str = "practice_registrations.csv";
/// File name of the addresses table.
pub const ADDRESSES_FILE: &str = "addresses.csv";
/// File name of the ONS deaths table.
pub const ONS_DEATHS_FILE: &str = "ons_deaths.csv";

/// Discovers the backend tables in an extract directory.
///
/// Table names are matched case-insensitively. The patients and clinical
/// events tables are required; the rest are optional.
pub fn discover_backend_files<P: AsRef<Path>>(path: P) -> LoadResult<BackendFiles> {
    let path = path.as_ref();

    if !path.is_dir() {
        return Err(LoadError::DirectoryNotFound {
            path: path.display().to_string(),
        });
    }

    let mut files = BackendFiles::new();

    for entry in fs::read_dir(path)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let filename = entry.file_name().to_string_lossy().to_ascii_lowercase();

        match filename.as_str() {
            PATIENTS_FILE => files.patients = Some(entry.path()),
            CLINICAL_EVENTS_FILE => files.clinical_events = Some(entry.path()),
            PRACTICE_REGISTRATIONS_FILE => files.practice_registrations = Some(entry.path()),
            ADDRESSES_FILE => files.addresses = Some(entry.path()),
            ONS_DEATHS_FILE => files.ons_deaths = Some(entry.path()),
            _ => {}
        }
    }

    if !files.has_required_files() {
        return Err(LoadError::RequiredTableMissing {
            table: files.missing_files().join(", "),
            directory: path.display().to_string(),
        });
    }

    for missing in files.missing_optional_files() {
        tracing::warn!("Optional table {} not found in {}", missing, path.display());
    }

    Ok(files)
}

/// Formats a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_discover_required_and_optional() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("patients.csv"), "patient_id\n").unwrap();
        fs::write(dir.join("Clinical_Events.csv"), "patient_id\n").unwrap();
        fs::write(dir.join("ons_deaths.csv"), "patient_id\n").unwrap();
        fs::write(dir.join("notes.txt"), "").unwrap();

        let files = discover_backend_files(dir).unwrap();
        assert!(files.has_required_files());
        assert!(files.ons_deaths.is_some());
        assert!(files.addresses.is_none());
    }

    #[test]
    fn test_missing_required_table() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path();
        fs::write(dir.join("patients.csv"), "patient_id\n").unwrap();

        let err = discover_backend_files(dir).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("clinical_events.csv"));
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 bytes");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GB");
    }
}
