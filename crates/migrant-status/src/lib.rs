//! # migrant-status
//!
//! Migration indicators and status classification for the migrant cohort
//! study.
//!
//! - [`build_indicators`] turns a flag table of named codelists into
//!   dated-existence indicators, evaluated per patient into
//!   [`IndicatorValues`].
//! - [`RuleTable`] classifies indicator values first-match-wins. The 2-, 3-
//!   and 6-category migration statuses are rule tables.
//! - [`age_band`], [`year_of_birth_band`], [`imd_quintile`] and
//!   [`imd_decile`] are the fixed banding lookups used by the datasets.
//!
//! ## Usage
//!
//! ```ignore
//! use migrant_status::{build_indicators, mig_status_2_cat, migrant_flags};
//!
//! let indicators = build_indicators(census_date, migrant_flags(&registry));
//! let status = mig_status_2_cat();
//!
//! for record in store.records() {
//!     let values = indicators.evaluate(record.events);
//!     let label = status.classify(&values, None);
//! }
//! ```

#![warn(missing_docs)]

mod bands;
mod classify;
mod indicators;

pub use bands::{
    age_band, imd_decile, imd_quintile, year_of_birth_band, IMD_MAX_RANK, MISSING_AGE_BAND,
    UNKNOWN_IMD,
};
pub use classify::{
    labels, mig_status_2_cat, mig_status_3_cat, mig_status_6_cat, migration_category, Condition,
    Rule, RuleTable,
};
pub use indicators::{
    build_indicators, migrant_flags, FlagTable, Indicator, IndicatorSet, IndicatorValues,
};
