//! Codelist loading.
//!
//! A codelist is a CSV resource listing the SNOMED CT codes that identify a
//! concept, optionally with a category label per code (many codes may share
//! a label). Once loaded a [`Codelist`] is immutable and may be shared
//! freely between builders and threads.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use migrant_types::SctId;

use crate::parser::{parse, Columns};
use crate::types::{LoadError, LoadResult};

/// An immutable set of codes, optionally mapped to category labels.
///
/// # Example
///
/// ```
/// use migrant_loader::Codelist;
///
/// let csv = "code,term,Label_6\n92491000000104,Indian,Asian or Asian British\n";
/// let codelist =
///     Codelist::from_reader(csv.as_bytes(), "ethnicity", "code", Some("Label_6")).unwrap();
///
/// assert!(codelist.contains(92491000000104));
/// assert_eq!(codelist.category(92491000000104), Some("Asian or Asian British"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Codelist {
    name: String,
    codes: HashMap<SctId, Option<String>>,
    has_categories: bool,
}

/// Loads a codelist from a CSV file.
///
/// `column` names the code column; `category_column`, when given, names the
/// column holding each code's category label.
///
/// # Errors
/// - [`LoadError::FileNotFound`] if the resource does not exist.
/// - [`LoadError::MissingColumn`] if a requested column is not in the header.
/// - [`LoadError::InvalidCode`] (with line context) if a code is not a SCTID.
pub fn load_codelist<P: AsRef<Path>>(
    path: P,
    column: &str,
    category_column: Option<&str>,
) -> LoadResult<Codelist> {
    Codelist::from_path(path, column, category_column)
}

impl Codelist {
    /// Loads a codelist from a CSV file. See [`load_codelist`].
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        column: &str,
        category_column: Option<&str>,
    ) -> LoadResult<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(LoadError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let file = File::open(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let codelist = Self::from_reader(BufReader::new(file), &name, column, category_column)?;

        tracing::debug!(
            "Loaded codelist {} ({} codes) from {}",
            codelist.name,
            codelist.len(),
            path.display()
        );
        Ok(codelist)
    }

    /// Loads a codelist from any reader. `name` labels the codelist in errors.
    pub fn from_reader<R: Read>(
        reader: R,
        name: &str,
        column: &str,
        category_column: Option<&str>,
    ) -> LoadResult<Self> {
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let columns = Columns::from_headers(csv_reader.headers()?);
        columns.require(&[column])?;
        if let Some(category) = category_column {
            columns.require(&[category])?;
        }

        let mut codes = HashMap::new();
        let mut record = StringRecord::new();
        while csv_reader.read_record(&mut record)? {
            let raw = columns.field(&record, column);
            if raw.is_empty() {
                continue;
            }
            let line = record.position().map_or(0, |p| p.line());
            let code = parse::sctid(raw).map_err(|e| e.at_line(name, line))?;
            let category =
                category_column.and_then(|c| parse::optional_string(columns.field(&record, c)));
            codes.insert(code, category);
        }

        Ok(Self {
            name: name.to_string(),
            codes,
            has_categories: category_column.is_some(),
        })
    }

    /// Builds a plain code set.
    pub fn from_codes(name: &str, codes: impl IntoIterator<Item = SctId>) -> Self {
        Self {
            name: name.to_string(),
            codes: codes.into_iter().map(|code| (code, None)).collect(),
            has_categories: false,
        }
    }

    /// Builds a categorised codelist from `(code, label)` pairs.
    pub fn from_categories<S: Into<String>>(
        name: &str,
        entries: impl IntoIterator<Item = (SctId, S)>,
    ) -> Self {
        Self {
            name: name.to_string(),
            codes: entries
                .into_iter()
                .map(|(code, label)| (code, Some(label.into())))
                .collect(),
            has_categories: true,
        }
    }

    /// Name of the codelist (the file stem when loaded from disk).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if `code` is in the codelist.
    pub fn contains(&self, code: SctId) -> bool {
        self.codes.contains_key(&code)
    }

    /// Returns the category label for `code`.
    ///
    /// `None` for codes outside the list, for plain code sets, and for codes
    /// whose category cell was blank.
    pub fn category(&self, code: SctId) -> Option<&str> {
        self.codes.get(&code).and_then(|c| c.as_deref())
    }

    /// Returns true if the codelist was loaded with a category column.
    pub fn has_categories(&self) -> bool {
        self.has_categories
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Returns true if the codelist has no codes.
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Iterates over the codes in no particular order.
    pub fn codes(&self) -> impl Iterator<Item = SctId> + '_ {
        self.codes.keys().copied()
    }

    /// Distinct category labels in sorted order.
    pub fn categories(&self) -> BTreeSet<&str> {
        self.codes.values().filter_map(|c| c.as_deref()).collect()
    }
}
