//! The study's codelist registry.
//!
//! Loads every codelist the migrant study refers to once, at start-up, from
//! a single codelist directory. The registry is then passed by reference to
//! the indicator and dataset builders.

use std::path::Path;

use crate::codelist::Codelist;
use crate::types::{LoadError, LoadResult};

/// File names of the study codelists.
pub mod files {
    /// Any migration-related code.
    pub const MIGRATION_STATUS: &str = "opensafely-migration-status.csv";
    /// Country of birth: UK.
    pub const BORN_IN_UK: &str = "opensafely-born-in-the-uk.csv";
    /// Country of birth: outside the UK.
    pub const BORN_OUTSIDE_UK: &str = "opensafely-born-outside-the-uk.csv";
    /// Immigration status excluding refugee and asylum codes.
    pub const IMMIGRATION_STATUS_EXCL_REFUGEE_ASYLUM: &str =
        "opensafely-immigration-status-excl-refugee-asylum.csv";
    /// Refugee or asylum seeker status.
    pub const ASYLUM_OR_REFUGEE: &str = "opensafely-asylum-or-refugee-status.csv";
    /// English not main language (interpreter codes excluded).
    pub const ENGLISH_NOT_MAIN_LANGUAGE: &str = "opensafely-english-not-main-language.csv";
    /// Interpreter required.
    pub const INTERPRETER_REQUIRED: &str = "opensafely-interpreter-required.csv";
    /// SNOMED ethnicity codes with 6- and 16-level groupings.
    pub const ETHNICITY: &str = "opensafely-ethnicity-snomed-0removed.csv";
}

/// Code column shared by every codelist.
pub const CODE_COLUMN: &str = "code";
/// 6-level ethnicity category column.
pub const ETHNICITY_6_COLUMN: &str = "Label_6";
/// 16-level ethnicity category column.
pub const ETHNICITY_16_COLUMN: &str = "Label_16";

/// All codelists used by the study.
#[derive(Debug, Clone, Default)]
pub struct CodelistRegistry {
    /// Any migration-related code.
    pub all_migrant: Codelist,
    /// Country of birth recorded as the UK.
    pub born_in_uk: Codelist,
    /// Country of birth recorded outside the UK.
    pub born_outside_uk: Codelist,
    /// Immigration status other than refugee or asylum.
    pub immigration_status_excl_refugee_asylum: Codelist,
    /// Refugee or asylum seeker status.
    pub asylum_refugee: Codelist,
    /// English not main language.
    pub english_not_main_language: Codelist,
    /// Interpreter required.
    pub interpreter_required: Codelist,
    /// Ethnicity, 16-level categories.
    pub ethnicity_16: Codelist,
    /// Ethnicity, 6-level categories.
    pub ethnicity_6: Codelist,
}

impl CodelistRegistry {
    /// Loads all study codelists from `dir`.
    ///
    /// # Errors
    /// Fails on the first missing or malformed codelist; nothing is
    /// evaluated against a partial registry.
    pub fn load<P: AsRef<Path>>(dir: P) -> LoadResult<Self> {
        let dir = dir.as_ref();

        if !dir.is_dir() {
            return Err(LoadError::DirectoryNotFound {
                path: dir.display().to_string(),
            });
        }

        let plain = |file: &str| Codelist::from_path(dir.join(file), CODE_COLUMN, None);
        let categorised = |file: &str, column: &str| {
            Codelist::from_path(dir.join(file), CODE_COLUMN, Some(column))
        };

        let registry = Self {
            all_migrant: plain(files::MIGRATION_STATUS)?,
            born_in_uk: plain(files::BORN_IN_UK)?,
            born_outside_uk: plain(files::BORN_OUTSIDE_UK)?,
            immigration_status_excl_refugee_asylum: plain(
                files::IMMIGRATION_STATUS_EXCL_REFUGEE_ASYLUM,
            )?,
            asylum_refugee: plain(files::ASYLUM_OR_REFUGEE)?,
            english_not_main_language: plain(files::ENGLISH_NOT_MAIN_LANGUAGE)?,
            interpreter_required: plain(files::INTERPRETER_REQUIRED)?,
            ethnicity_16: categorised(files::ETHNICITY, ETHNICITY_16_COLUMN)?,
            ethnicity_6: categorised(files::ETHNICITY, ETHNICITY_6_COLUMN)?,
        };

        tracing::info!(
            "Loaded {} codelists ({} codes) from {}",
            registry.codelists().len(),
            registry.code_count(),
            dir.display()
        );
        Ok(registry)
    }

    /// All codelists with their registry names.
    pub fn codelists(&self) -> Vec<(&'static str, &Codelist)> {
        vec![
            ("all_migrant", &self.all_migrant),
            ("born_in_uk", &self.born_in_uk),
            ("born_outside_uk", &self.born_outside_uk),
            (
                "immigration_status_excl_refugee_asylum",
                &self.immigration_status_excl_refugee_asylum,
            ),
            ("asylum_refugee", &self.asylum_refugee),
            ("english_not_main_language", &self.english_not_main_language),
            ("interpreter_required", &self.interpreter_required),
            ("ethnicity_16", &self.ethnicity_16),
            ("ethnicity_6", &self.ethnicity_6),
        ]
    }

    /// Total number of codes across all codelists.
    pub fn code_count(&self) -> usize {
        self.codelists().iter().map(|(_, c)| c.len()).sum()
    }
}
