//! Interval-based measures.
//!
//! A [`MeasureSet`] holds named measures sharing a default denominator and
//! default intervals. Each measure counts, per interval and per group, the
//! denominator patients and those of them satisfying the numerator.
//!
//! ```ignore
//! let mut measures = MeasureSet::new();
//! measures.define_defaults(denominator, years(16).starting_on(start));
//! measures.define_measure("any_migrant_sex", numerator, GroupBy::new().column("sex", sex))?;
//! let table = measures.evaluate(&store)?;
//! ```

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use migrant_loader::{PatientRecord, PatientStore};

use crate::dataset::Dataset;
use crate::error::{StudyError, StudyResult};
use crate::interval::Interval;
use crate::value::Value;

/// A shareable expression over one patient record within an interval.
pub type IntervalExpr<'a, T> =
    Arc<dyn Fn(&PatientRecord<'_>, &Interval) -> T + Send + Sync + 'a>;

/// Wraps a closure as an [`IntervalExpr`].
pub fn interval_expr<'a, F, T>(f: F) -> IntervalExpr<'a, T>
where
    F: Fn(&PatientRecord<'_>, &Interval) -> T + Send + Sync + 'a,
{
    Arc::new(f)
}

/// Fixed leading columns of a measure table.
pub const MEASURE_COLUMNS: [&str; 6] = [
    "measure",
    "interval_start",
    "interval_end",
    "ratio",
    "numerator",
    "denominator",
];

/// Ordered group-by columns of a measure.
#[derive(Clone, Default)]
pub struct GroupBy<'a> {
    columns: Vec<(&'static str, IntervalExpr<'a, Value>)>,
}

impl<'a> GroupBy<'a> {
    /// No grouping: one row per interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a grouping column.
    pub fn column(mut self, name: &'static str, expr: IntervalExpr<'a, Value>) -> Self {
        self.columns.push((name, expr));
        self
    }

    /// Group column names in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|(name, _)| *name)
    }

    /// Returns true when there is no grouping.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn key(&self, record: &PatientRecord<'_>, interval: &Interval) -> Vec<Value> {
        self.columns
            .iter()
            .map(|(_, expr)| expr(record, interval))
            .collect()
    }
}

impl std::fmt::Debug for GroupBy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// One named measure.
#[derive(Clone)]
pub struct Measure<'a> {
    name: String,
    numerator: IntervalExpr<'a, bool>,
    denominator: Option<IntervalExpr<'a, bool>>,
    group_by: GroupBy<'a>,
    intervals: Option<Vec<Interval>>,
}

impl<'a> Measure<'a> {
    /// Creates a measure using the set's defaults.
    pub fn new(name: impl Into<String>, numerator: IntervalExpr<'a, bool>, group_by: GroupBy<'a>) -> Self {
        Self {
            name: name.into(),
            numerator,
            denominator: None,
            group_by,
            intervals: None,
        }
    }

    /// Overrides the default denominator.
    pub fn with_denominator(mut self, denominator: IntervalExpr<'a, bool>) -> Self {
        self.denominator = Some(denominator);
        self
    }

    /// Overrides the default intervals.
    pub fn with_intervals(mut self, intervals: Vec<Interval>) -> Self {
        self.intervals = Some(intervals);
        self
    }

    /// Measure name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group-by columns.
    pub fn group_by(&self) -> &GroupBy<'a> {
        &self.group_by
    }
}

impl std::fmt::Debug for Measure<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Measure")
            .field("name", &self.name)
            .field("group_by", &self.group_by)
            .field("intervals", &self.intervals)
            .finish()
    }
}

/// A collection of measures with shared defaults.
#[derive(Clone, Default)]
pub struct MeasureSet<'a> {
    denominator: Option<IntervalExpr<'a, bool>>,
    intervals: Vec<Interval>,
    measures: Vec<Measure<'a>>,
    names: HashSet<String>,
}

impl<'a> MeasureSet<'a> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default denominator and intervals.
    pub fn define_defaults(&mut self, denominator: IntervalExpr<'a, bool>, intervals: Vec<Interval>) {
        self.denominator = Some(denominator);
        self.intervals = intervals;
    }

    /// Adds a measure using the defaults.
    ///
    /// # Errors
    /// [`StudyError::DuplicateMeasure`] if the name is already defined.
    pub fn define_measure(
        &mut self,
        name: impl Into<String>,
        numerator: IntervalExpr<'a, bool>,
        group_by: GroupBy<'a>,
    ) -> StudyResult<()> {
        self.add(Measure::new(name, numerator, group_by))
    }

    /// Adds a fully specified measure.
    pub fn add(&mut self, measure: Measure<'a>) -> StudyResult<()> {
        if !self.names.insert(measure.name.clone()) {
            return Err(StudyError::DuplicateMeasure { name: measure.name });
        }
        self.measures.push(measure);
        Ok(())
    }

    /// Measures in definition order.
    pub fn measures(&self) -> &[Measure<'a>] {
        &self.measures
    }

    /// Default intervals.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Number of measures.
    pub fn len(&self) -> usize {
        self.measures.len()
    }

    /// Returns true if no measures are defined.
    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    /// Evaluates every measure over every interval.
    ///
    /// Rows are ordered by measure, then interval, then group values.
    /// Groups without denominator patients produce no row.
    ///
    /// # Errors
    /// [`StudyError::MissingDenominator`] if a measure has no denominator.
    pub fn evaluate(&self, store: &PatientStore) -> StudyResult<MeasureTable> {
        let mut tasks = Vec::new();
        for measure in &self.measures {
            let denominator = measure
                .denominator
                .as_ref()
                .or(self.denominator.as_ref())
                .ok_or_else(|| StudyError::MissingDenominator {
                    name: measure.name.clone(),
                })?;
            let intervals = measure.intervals.as_deref().unwrap_or(&self.intervals);
            tasks.extend(intervals.iter().map(|interval| (measure, denominator, interval)));
        }

        let mut group_columns: Vec<&'static str> = Vec::new();
        for name in self.measures.iter().flat_map(|m| m.group_by.names()) {
            if !group_columns.contains(&name) {
                group_columns.push(name);
            }
        }

        let records: Vec<PatientRecord<'_>> = store.records().collect();
        let rows = evaluate_tasks(&tasks, &records);

        tracing::info!(
            "Evaluated {} measures over {} intervals: {} rows",
            self.measures.len(),
            self.intervals.len(),
            rows.len()
        );

        Ok(MeasureTable {
            group_columns,
            rows,
        })
    }
}

impl std::fmt::Debug for MeasureSet<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeasureSet")
            .field("measures", &self.measures)
            .field("intervals", &self.intervals)
            .finish()
    }
}

type Task<'m, 'a> = (&'m Measure<'a>, &'m IntervalExpr<'a, bool>, &'m Interval);

#[cfg(feature = "parallel")]
fn evaluate_tasks(tasks: &[Task<'_, '_>], records: &[PatientRecord<'_>]) -> Vec<MeasureRow> {
    use rayon::prelude::*;

    tasks
        .par_iter()
        .map(|task| evaluate_task(task, records))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn evaluate_tasks(tasks: &[Task<'_, '_>], records: &[PatientRecord<'_>]) -> Vec<MeasureRow> {
    tasks
        .iter()
        .flat_map(|task| evaluate_task(task, records))
        .collect()
}

fn evaluate_task(task: &Task<'_, '_>, records: &[PatientRecord<'_>]) -> Vec<MeasureRow> {
    let (measure, denominator, interval) = *task;
    let mut counts: BTreeMap<Vec<Value>, (u64, u64)> = BTreeMap::new();

    for record in records {
        if !denominator(record, interval) {
            continue;
        }
        let entry = counts
            .entry(measure.group_by.key(record, interval))
            .or_default();
        entry.1 += 1;
        if (measure.numerator)(record, interval) {
            entry.0 += 1;
        }
    }

    let names: Vec<&'static str> = measure.group_by.names().collect();
    counts
        .into_iter()
        .map(|(key, (numerator, denominator))| MeasureRow {
            measure: measure.name.clone(),
            interval: *interval,
            numerator,
            denominator,
            groups: names.iter().copied().zip(key).collect(),
        })
        .collect()
}

/// One measure table row.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureRow {
    /// Measure name.
    pub measure: String,
    /// Interval counted.
    pub interval: Interval,
    /// Denominator patients meeting the numerator.
    pub numerator: u64,
    /// Patients in the denominator.
    pub denominator: u64,
    /// Group values for the measure's group-by columns.
    pub groups: Vec<(&'static str, Value)>,
}

impl MeasureRow {
    /// `numerator / denominator`.
    pub fn ratio(&self) -> f64 {
        if self.denominator == 0 {
            0.0
        } else {
            self.numerator as f64 / self.denominator as f64
        }
    }

    /// Value of a group column, if the measure groups by it.
    pub fn group(&self, name: &str) -> Option<&Value> {
        self.groups.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }
}

/// Evaluated measures.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasureTable {
    group_columns: Vec<&'static str>,
    rows: Vec<MeasureRow>,
}

impl MeasureTable {
    /// All group-by columns across measures, in first-use order.
    pub fn group_columns(&self) -> &[&'static str] {
        &self.group_columns
    }

    /// Rows in output order.
    pub fn rows(&self) -> &[MeasureRow] {
        &self.rows
    }

    /// Rows of one measure.
    pub fn rows_for<'t>(&'t self, measure: &'t str) -> impl Iterator<Item = &'t MeasureRow> + 't {
        self.rows.iter().filter(move |r| r.measure == measure)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Flattens into a dataset; unused group columns are null.
    pub fn to_dataset(&self, name: &str) -> Dataset {
        let header = MEASURE_COLUMNS
            .iter()
            .chain(self.group_columns.iter())
            .map(|c| c.to_string())
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut values = vec![
                    Value::from(row.measure.as_str()),
                    Value::from(row.interval.start),
                    Value::from(row.interval.end),
                    Value::from(row.ratio()),
                    Value::from(row.numerator),
                    Value::from(row.denominator),
                ];
                values.extend(
                    self.group_columns
                        .iter()
                        .map(|c| row.group(c).cloned().unwrap_or(Value::Null)),
                );
                values
            })
            .collect();

        Dataset::new(name, header, rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::years;
    use chrono::NaiveDate;
    use migrant_types::{Patient, Sex};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> PatientStore {
        let mut store = PatientStore::new();
        store.insert_patients((1..=6).map(|id| Patient {
            patient_id: id,
            sex: if id <= 4 { Sex::Female } else { Sex::Male },
            date_of_birth: Some(ymd(1990, 1, 1)),
            date_of_death: if id == 1 { Some(ymd(2010, 6, 1)) } else { None },
        }));
        store
    }

    fn alive_on_start() -> IntervalExpr<'static, bool> {
        interval_expr(|r, iv| r.patient.is_alive_on(iv.start))
    }

    fn even_id() -> IntervalExpr<'static, bool> {
        interval_expr(|r, _| r.patient_id() % 2 == 0)
    }

    fn sex() -> IntervalExpr<'static, Value> {
        interval_expr(|r, _| Value::from(r.patient.sex.as_code()))
    }

    #[test]
    fn test_ungrouped_counts_per_interval() {
        let mut measures = MeasureSet::new();
        measures.define_defaults(alive_on_start(), years(2).starting_on(ymd(2010, 1, 1)));
        measures
            .define_measure("even", even_id(), GroupBy::new())
            .unwrap();

        let table = measures.evaluate(&store()).unwrap();
        assert_eq!(table.len(), 2);
        let rows: Vec<_> = table.rows_for("even").collect();
        assert_eq!((rows[0].numerator, rows[0].denominator), (3, 6));
        // patient 1 died in 2010
        assert_eq!((rows[1].numerator, rows[1].denominator), (3, 5));
        assert!((rows[1].ratio() - 0.6).abs() < 1e-9);
        assert_eq!(rows[1].interval.start, ymd(2011, 1, 1));
    }

    #[test]
    fn test_groups_sorted_and_empty_groups_skipped() {
        let mut measures = MeasureSet::new();
        measures.define_defaults(
            interval_expr(|r, _| r.patient.sex == Sex::Female),
            years(1).starting_on(ymd(2010, 1, 1)),
        );
        measures
            .define_measure("even_by_sex", even_id(), GroupBy::new().column("sex", sex()))
            .unwrap();

        let table = measures.evaluate(&store()).unwrap();
        // No male denominator patients, so no male row.
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].group("sex"), Some(&Value::from("female")));
        assert_eq!(table.rows()[0].numerator, 2);
        assert_eq!(table.group_columns(), ["sex"]);
    }

    #[test]
    fn test_to_dataset_blanks_unused_groups() {
        let mut measures = MeasureSet::new();
        measures.define_defaults(alive_on_start(), years(1).starting_on(ymd(2009, 1, 1)));
        measures.define_measure("all", even_id(), GroupBy::new()).unwrap();
        measures
            .define_measure("by_sex", even_id(), GroupBy::new().column("sex", sex()))
            .unwrap();

        let dataset = measures.evaluate(&store()).unwrap().to_dataset("measures");
        assert_eq!(
            dataset.header(),
            ["measure", "interval_start", "interval_end", "ratio", "numerator", "denominator", "sex"]
        );
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.value(0, "sex"), Some(&Value::Null));
        assert_eq!(dataset.value(1, "sex"), Some(&Value::from("female")));
        assert_eq!(dataset.value(2, "sex"), Some(&Value::from("male")));
        assert_eq!(dataset.value(0, "interval_end"), Some(&Value::from(ymd(2009, 12, 31))));
    }

    #[test]
    fn test_duplicate_measure_rejected() {
        let mut measures = MeasureSet::new();
        measures.define_measure("m", even_id(), GroupBy::new()).unwrap();
        let err = measures.define_measure("m", even_id(), GroupBy::new()).unwrap_err();
        assert!(matches!(err, StudyError::DuplicateMeasure { name } if name == "m"));
    }

    #[test]
    fn test_missing_denominator() {
        let mut measures = MeasureSet::new();
        measures.define_measure("m", even_id(), GroupBy::new()).unwrap();
        assert!(matches!(
            measures.evaluate(&store()),
            Err(StudyError::MissingDenominator { .. })
        ));
    }

    #[test]
    fn test_measure_overrides() {
        let mut measures = MeasureSet::new();
        measures.define_defaults(alive_on_start(), years(3).starting_on(ymd(2010, 1, 1)));
        measures
            .add(
                Measure::new("males", even_id(), GroupBy::new())
                    .with_denominator(interval_expr(|r, _| r.patient.sex == Sex::Male))
                    .with_intervals(years(1).starting_on(ymd(2015, 1, 1))),
            )
            .unwrap();

        let table = measures.evaluate(&store()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].denominator, 2);
        assert_eq!(table.rows()[0].numerator, 1);
    }
}
