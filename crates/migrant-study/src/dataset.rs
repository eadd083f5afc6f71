//! Patient-level dataset definitions.
//!
//! A [`DatasetDefinition`] pairs a [`Population`] (a conjunction of named
//! criteria) with ordered named columns. Evaluating it against a
//! [`PatientStore`] yields one row per included patient, in patient id
//! order. An [`EventTableDefinition`] instead yields any number of rows per
//! included patient.

use std::sync::Arc;

use migrant_loader::{PatientRecord, PatientStore};

use crate::value::Value;

/// A shareable expression over one patient record.
pub type Expr<'a, T> = Arc<dyn Fn(&PatientRecord<'_>) -> T + Send + Sync + 'a>;

/// Rows produced for one patient by an event table.
pub type RowsExpr<'a> = Arc<dyn Fn(&PatientRecord<'_>) -> Vec<Vec<Value>> + Send + Sync + 'a>;

/// Name of the leading id column of every dataset.
pub const PATIENT_ID_COLUMN: &str = "patient_id";

/// A named eligibility criterion.
#[derive(Clone)]
pub struct Criterion<'a> {
    name: &'static str,
    test: Expr<'a, bool>,
}

impl<'a> Criterion<'a> {
    /// Criterion name (used in logs).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluates the criterion.
    pub fn holds(&self, record: &PatientRecord<'_>) -> bool {
        (self.test)(record)
    }
}

impl std::fmt::Debug for Criterion<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Criterion").field(&self.name).finish()
    }
}

/// A conjunction of criteria. An empty population includes everyone.
#[derive(Debug, Clone, Default)]
pub struct Population<'a> {
    criteria: Vec<Criterion<'a>>,
}

impl<'a> Population<'a> {
    /// Creates a population with no criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a criterion; criteria are tested in the order added.
    pub fn require<F>(mut self, name: &'static str, test: F) -> Self
    where
        F: Fn(&PatientRecord<'_>) -> bool + Send + Sync + 'a,
    {
        self.criteria.push(Criterion {
            name,
            test: Arc::new(test),
        });
        self
    }

    /// Returns true if the patient meets every criterion.
    pub fn includes(&self, record: &PatientRecord<'_>) -> bool {
        self.criteria.iter().all(|c| c.holds(record))
    }

    /// Criteria in order.
    pub fn criteria(&self) -> &[Criterion<'a>] {
        &self.criteria
    }
}

/// A named output column.
#[derive(Clone)]
pub struct Column<'a> {
    name: &'static str,
    expr: Expr<'a, Value>,
}

impl<'a> Column<'a> {
    /// Builds a column from any expression convertible to [`Value`].
    pub fn new<F, V>(name: &'static str, expr: F) -> Self
    where
        F: Fn(&PatientRecord<'_>) -> V + Send + Sync + 'a,
        V: Into<Value>,
    {
        Self {
            name,
            expr: Arc::new(move |record: &PatientRecord<'_>| -> Value { expr(record).into() }),
        }
    }

    /// Column name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Evaluates the column for one patient.
    pub fn evaluate(&self, record: &PatientRecord<'_>) -> Value {
        (self.expr)(record)
    }
}

impl std::fmt::Debug for Column<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Column").field(&self.name).finish()
    }
}

/// One row per patient: population plus ordered columns.
#[derive(Debug, Clone)]
pub struct DatasetDefinition<'a> {
    name: &'static str,
    population: Population<'a>,
    columns: Vec<Column<'a>>,
}

impl<'a> DatasetDefinition<'a> {
    /// Creates a definition with no columns.
    pub fn new(name: &'static str, population: Population<'a>) -> Self {
        Self {
            name,
            population,
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    pub fn column<F, V>(mut self, name: &'static str, expr: F) -> Self
    where
        F: Fn(&PatientRecord<'_>) -> V + Send + Sync + 'a,
        V: Into<Value>,
    {
        self.columns.push(Column::new(name, expr));
        self
    }

    /// Appends prebuilt columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column<'a>>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Definition name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The population filter.
    pub fn population(&self) -> &Population<'a> {
        &self.population
    }

    /// Output header, patient id first.
    pub fn header(&self) -> Vec<String> {
        std::iter::once(PATIENT_ID_COLUMN)
            .chain(self.columns.iter().map(|c| c.name))
            .map(str::to_string)
            .collect()
    }

    /// Evaluates one patient; `None` if excluded by the population.
    pub fn evaluate_record(&self, record: &PatientRecord<'_>) -> Option<Vec<Value>> {
        if !self.population.includes(record) {
            return None;
        }
        let mut row = Vec::with_capacity(self.columns.len() + 1);
        row.push(Value::from(record.patient_id()));
        row.extend(self.columns.iter().map(|c| c.evaluate(record)));
        Some(row)
    }

    /// Evaluates every patient in the store.
    pub fn evaluate(&self, store: &PatientStore) -> Dataset {
        let rows = collect_rows(store, |record| {
            self.evaluate_record(record).into_iter().collect()
        });
        finish(self.name, self.header(), rows, store)
    }
}

/// Many rows per patient: population plus a row generator.
#[derive(Clone)]
pub struct EventTableDefinition<'a> {
    name: &'static str,
    population: Population<'a>,
    columns: Vec<&'static str>,
    rows: RowsExpr<'a>,
}

impl<'a> EventTableDefinition<'a> {
    /// Creates an event table. Each generated row must match `columns`.
    pub fn new<F>(
        name: &'static str,
        population: Population<'a>,
        columns: Vec<&'static str>,
        rows: F,
    ) -> Self
    where
        F: Fn(&PatientRecord<'_>) -> Vec<Vec<Value>> + Send + Sync + 'a,
    {
        Self {
            name,
            population,
            columns,
            rows: Arc::new(rows),
        }
    }

    /// Output header, patient id first.
    pub fn header(&self) -> Vec<String> {
        std::iter::once(PATIENT_ID_COLUMN)
            .chain(self.columns.iter().copied())
            .map(str::to_string)
            .collect()
    }

    /// Evaluates every patient in the store.
    pub fn evaluate(&self, store: &PatientStore) -> Dataset {
        let rows = collect_rows(store, |record| {
            if !self.population.includes(record) {
                return Vec::new();
            }
            let id = Value::from(record.patient_id());
            (self.rows)(record)
                .into_iter()
                .map(|values| std::iter::once(id.clone()).chain(values).collect())
                .collect()
        });
        finish(self.name, self.header(), rows, store)
    }
}

impl std::fmt::Debug for EventTableDefinition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventTableDefinition")
            .field("name", &self.name)
            .field("population", &self.population)
            .field("columns", &self.columns)
            .finish()
    }
}

#[cfg(feature = "parallel")]
fn collect_rows<F>(store: &PatientStore, rows_for: F) -> Vec<Vec<Value>>
where
    F: Fn(&PatientRecord<'_>) -> Vec<Vec<Value>> + Send + Sync,
{
    use rayon::prelude::*;

    let records: Vec<PatientRecord<'_>> = store.records().collect();
    records
        .par_iter()
        .map(|record| rows_for(record))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn collect_rows<F>(store: &PatientStore, rows_for: F) -> Vec<Vec<Value>>
where
    F: Fn(&PatientRecord<'_>) -> Vec<Vec<Value>> + Send + Sync,
{
    store.records().flat_map(|record| rows_for(&record)).collect()
}

fn finish(
    name: &'static str,
    header: Vec<String>,
    rows: Vec<Vec<Value>>,
    store: &PatientStore,
) -> Dataset {
    tracing::info!(
        "{}: {} rows from {} patients",
        name,
        rows.len(),
        store.patient_count()
    );
    Dataset {
        name: name.to_string(),
        header,
        rows,
    }
}

/// A materialised table: header plus rows of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    name: String,
    header: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Dataset {
    /// Builds a dataset from parts.
    pub fn new(name: impl Into<String>, header: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            name: name.into(),
            header,
            rows,
        }
    }

    /// Dataset name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column names.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Rows in output order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Value at `row` in column `name`.
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        let column = self.column_index(name)?;
        self.rows.get(row)?.get(column)
    }

    /// All values of one column.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let column = self.column_index(name)?;
        Some(self.rows.iter().filter_map(|row| row.get(column)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migrant_types::{Patient, Sex};

    fn store() -> PatientStore {
        let mut store = PatientStore::new();
        store.insert_patients((1..=4).map(|id| Patient {
            patient_id: id,
            sex: if id % 2 == 0 { Sex::Male } else { Sex::Female },
            date_of_birth: NaiveDate::from_ymd_opt(1980 + id as i32, 1, 1),
            date_of_death: None,
        }));
        store
    }

    #[test]
    fn test_population_is_conjunction() {
        let population = Population::new()
            .require("male", |r| r.patient.sex == Sex::Male)
            .require("id above 2", |r| r.patient_id() > 2);
        let definition = DatasetDefinition::new("test", population)
            .column("sex", |r| r.patient.sex.as_code());

        let dataset = definition.evaluate(&store());
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.value(0, "patient_id"), Some(&Value::Int(4)));
        assert_eq!(dataset.value(0, "sex"), Some(&Value::from("male")));
        assert_eq!(definition.population().criteria().len(), 2);
    }

    #[test]
    fn test_columns_keep_order() {
        let definition = DatasetDefinition::new("test", Population::new())
            .column("b", |_| 1i64)
            .column("a", |r| r.patient.year_of_birth());

        assert_eq!(definition.header(), vec!["patient_id", "b", "a"]);
        let dataset = definition.evaluate(&store());
        assert_eq!(dataset.len(), 4);
        let ids: Vec<_> = dataset.column("patient_id").unwrap();
        assert_eq!(ids, vec![&Value::Int(1), &Value::Int(2), &Value::Int(3), &Value::Int(4)]);
        assert_eq!(dataset.value(2, "a"), Some(&Value::Int(1983)));
        assert_eq!(dataset.value(0, "missing"), None);
    }

    #[test]
    fn test_event_table_rows_per_patient() {
        let table = EventTableDefinition::new(
            "events",
            Population::new().require("odd", |r| r.patient_id() % 2 == 1),
            vec!["n"],
            |r| (0..r.patient_id()).map(|n| vec![Value::from(n)]).collect(),
        );
        let dataset = table.evaluate(&store());
        // patient 1 -> 1 row, patient 3 -> 3 rows
        assert_eq!(dataset.len(), 4);
        assert_eq!(dataset.header(), ["patient_id", "n"]);
        assert_eq!(dataset.value(3, "patient_id"), Some(&Value::Int(3)));
        assert_eq!(dataset.value(3, "n"), Some(&Value::Int(2)));
    }
}
