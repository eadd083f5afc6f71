//! # migrant-study
//!
//! Cohort datasets and annual measures for the migrant cohort study.
//!
//! Definitions are built once from a [`CodelistRegistry`] and a
//! [`StudyConfig`], then evaluated against a loaded [`PatientStore`]:
//!
//! - [`census_cohort`], [`full_study_cohort`], [`population_denominator`]:
//!   one row per patient.
//! - [`migration_events`]: one row per migration code event.
//! - [`annual_measures`]: numerator/denominator counts per year and subgroup.
//!
//! ## Features
//!
//! - `parallel` (default): Evaluate patients concurrently with rayon.
//!
//! ## Usage
//!
//! ```ignore
//! use migrant_study::{census_cohort, write_dataset, OutputFormat, StudyConfig};
//!
//! let config = StudyConfig::default();
//! let dataset = census_cohort(&registry, config.census_date).evaluate(&store);
//! write_dataset(&dataset, std::io::stdout(), OutputFormat::Csv)?;
//! ```
//!
//! [`CodelistRegistry`]: migrant_loader::CodelistRegistry
//! [`PatientStore`]: migrant_loader::PatientStore

#![warn(missing_docs)]

mod annual;
mod cohorts;
mod config;
mod dataset;
mod error;
mod interval;
pub mod logging;
mod measures;
mod output;
mod value;
pub mod variables;

pub use annual::{
    annual_denominator, annual_measures, measure_count, safe_label, subgroup, MeasureVariant,
    SUBGROUPS,
};
pub use cohorts::{
    census_cohort, full_study_cohort, full_study_population, migration_events,
    population_denominator,
};
pub use config::{parse_date, StudyConfig};
pub use dataset::{
    Column, Criterion, Dataset, DatasetDefinition, EventTableDefinition, Expr, Population,
    RowsExpr, PATIENT_ID_COLUMN,
};
pub use error::{StudyError, StudyResult};
pub use interval::{years, Interval, Years};
pub use measures::{
    interval_expr, GroupBy, IntervalExpr, Measure, MeasureRow, MeasureSet, MeasureTable,
    MEASURE_COLUMNS,
};
pub use output::{write_csv, write_dataset, write_json_lines, OutputFormat};
pub use value::Value;
