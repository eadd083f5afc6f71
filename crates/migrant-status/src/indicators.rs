//! Migration indicators.
//!
//! An indicator answers one question about a patient's event history:
//! is there at least one event whose code is in a codelist, dated on or
//! before a reference date? Indicators are built once per reference date
//! and evaluated against each patient's events.

use chrono::NaiveDate;
use migrant_loader::{Codelist, CodelistRegistry};
use migrant_types::{well_known, ClinicalEvent};

/// Ordered `(indicator name, codelist)` pairs. A `None` codelist yields an
/// indicator that is always false.
pub type FlagTable<'a> = Vec<(&'a str, Option<&'a Codelist>)>;

/// The study's migration flags in output column order.
pub fn migrant_flags(registry: &CodelistRegistry) -> FlagTable<'_> {
    vec![
        (well_known::ANY_MIGRANT, Some(&registry.all_migrant)),
        (well_known::BORN_IN_UK, Some(&registry.born_in_uk)),
        (well_known::NOT_BORN_IN_UK, Some(&registry.born_outside_uk)),
        (
            well_known::IMMIG_STATUS_EXCL_REFUGEE_ASYLUM,
            Some(&registry.immigration_status_excl_refugee_asylum),
        ),
        (well_known::REFUGEE_ASYLUM_STATUS, Some(&registry.asylum_refugee)),
        (
            well_known::ENGLISH_NOT_MAIN_LANGUAGE,
            Some(&registry.english_not_main_language),
        ),
        (
            well_known::INTERPRETER_REQUIRED,
            Some(&registry.interpreter_required),
        ),
    ]
}

/// A single dated-existence indicator.
#[derive(Debug, Clone, Copy)]
pub struct Indicator<'a> {
    name: &'a str,
    codelist: Option<&'a Codelist>,
    reference_date: NaiveDate,
}

impl<'a> Indicator<'a> {
    /// Indicator name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Inclusive upper date bound.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// True if any event matches the codelist on or before the reference date.
    pub fn evaluate(&self, events: &[ClinicalEvent]) -> bool {
        let Some(codelist) = self.codelist else {
            return false;
        };
        events
            .iter()
            .any(|e| e.is_on_or_before(self.reference_date) && codelist.contains(e.snomedct_code))
    }
}

/// An ordered set of indicators sharing one reference date.
#[derive(Debug, Clone)]
pub struct IndicatorSet<'a> {
    reference_date: NaiveDate,
    indicators: Vec<Indicator<'a>>,
}

/// Builds one indicator per flag, bounded by `reference_date`.
///
/// ```
/// use chrono::NaiveDate;
/// use migrant_loader::Codelist;
/// use migrant_status::build_indicators;
/// use migrant_types::ClinicalEvent;
///
/// let cob = Codelist::from_codes("cob", [161152006]);
/// let date = NaiveDate::from_ymd_opt(2021, 3, 21).unwrap();
/// let set = build_indicators(date, vec![("born_in_uk", Some(&cob)), ("unmapped", None)]);
///
/// let events = [ClinicalEvent { patient_id: 1, date: Some(date), snomedct_code: 161152006 }];
/// let values = set.evaluate(&events);
/// assert!(values.get("born_in_uk"));
/// assert!(!values.get("unmapped"));
/// ```
pub fn build_indicators<'a>(reference_date: NaiveDate, flags: FlagTable<'a>) -> IndicatorSet<'a> {
    let indicators = flags
        .into_iter()
        .map(|(name, codelist)| Indicator {
            name,
            codelist,
            reference_date,
        })
        .collect();

    IndicatorSet {
        reference_date,
        indicators,
    }
}

impl<'a> IndicatorSet<'a> {
    /// Evaluates every indicator against one patient's events.
    pub fn evaluate(&self, events: &[ClinicalEvent]) -> IndicatorValues<'a> {
        IndicatorValues {
            values: self
                .indicators
                .iter()
                .map(|indicator| (indicator.name, indicator.evaluate(events)))
                .collect(),
        }
    }

    /// Shared reference date.
    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Indicator names in order.
    pub fn names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.indicators.iter().map(|i| i.name)
    }

    /// Looks up an indicator by name.
    pub fn get(&self, name: &str) -> Option<&Indicator<'a>> {
        self.indicators.iter().find(|i| i.name == name)
    }

    /// Iterates over the indicators in order.
    pub fn iter(&self) -> impl Iterator<Item = &Indicator<'a>> {
        self.indicators.iter()
    }

    /// Number of indicators.
    pub fn len(&self) -> usize {
        self.indicators.len()
    }

    /// Returns true if the set has no indicators.
    pub fn is_empty(&self) -> bool {
        self.indicators.is_empty()
    }
}

/// One patient's indicator results, in indicator order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorValues<'a> {
    values: Vec<(&'a str, bool)>,
}

impl<'a> IndicatorValues<'a> {
    /// Value of the named indicator; false when the name is absent.
    pub fn get(&self, name: &str) -> bool {
        self.values
            .iter()
            .find(|(n, _)| *n == name)
            .is_some_and(|(_, v)| *v)
    }

    /// Returns true if the named indicator is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.iter().any(|(n, _)| *n == name)
    }

    /// `(name, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, bool)> + '_ {
        self.values.iter().copied()
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, bool)> for IndicatorValues<'a> {
    fn from_iter<I: IntoIterator<Item = (&'a str, bool)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
