//! # migrant-loader
//!
//! Loader for the migrant cohort study inputs: codelist resources and the
//! primary-care backend extract (patients, clinical events, practice
//! registrations, addresses and ONS deaths).
//!
//! ## Features
//!
//! - `parallel` (default): Parse backend tables concurrently with rayon.
//!
//! ## Usage
//!
//! ```ignore
//! use migrant_loader::{discover_backend_files, CodelistRegistry, LoadConfig, PatientStore};
//!
//! let registry = CodelistRegistry::load("codelists")?;
//! let files = discover_backend_files("output/extract")?;
//!
//! let mut store = PatientStore::new();
//! store.load_all(&files, LoadConfig::default())?;
//!
//! for record in store.records() {
//!     let ever_migrant = record.has_event_in(&registry.all_migrant);
//! }
//! ```

#![warn(missing_docs)]

mod codelist;
mod event;
mod loader;
mod parser;
mod patient;
mod registration;
mod registry;
mod store;
mod types;

// Re-export migrant-types for convenience
pub use migrant_types;

pub use codelist::{load_codelist, Codelist};
pub use loader::{
    discover_backend_files, format_bytes, ADDRESSES_FILE, CLINICAL_EVENTS_FILE, ONS_DEATHS_FILE,
    PATIENTS_FILE, PRACTICE_REGISTRATIONS_FILE,
};
pub use parser::{parse, Columns, TableParser, TableRecord};
pub use registry::{
    files as codelist_files, CodelistRegistry, CODE_COLUMN, ETHNICITY_16_COLUMN,
    ETHNICITY_6_COLUMN,
};
pub use store::{LoadSummary, PatientRecord, PatientStore};
pub use types::{BackendFiles, ErrorKind, LoadConfig, LoadError, LoadResult, ParseStats};
