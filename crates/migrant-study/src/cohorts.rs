//! Cohort dataset definitions.
//!
//! - [`census_cohort`]: patients registered and alive on the census date,
//!   with demographics, migration indicators and migration status.
//! - [`full_study_cohort`]: patients with any migration code who were
//!   registered during the study period.
//! - [`population_denominator`]: the same period population without the
//!   migration code requirement.
//! - [`migration_events`]: one row per migration code event of the full
//!   study cohort.

use chrono::NaiveDate;
use migrant_loader::{CodelistRegistry, PatientRecord};
use migrant_status::{
    age_band, build_indicators, mig_status_2_cat, mig_status_3_cat, mig_status_6_cat,
    migrant_flags, migration_category, year_of_birth_band, IndicatorSet, IndicatorValues,
};
use migrant_types::well_known;

use crate::config::StudyConfig;
use crate::dataset::{Column, DatasetDefinition, EventTableDefinition, Population};
use crate::value::Value;
use crate::variables::{
    days_to_first_code, has_non_disclosive_sex, has_possible_age, imd_decile_on, imd_quintile_on,
    is_alive_at, is_registered_during, latest_ethnicity_code, latest_ethnicity_group, msoa_on,
    region_on, MAX_AGE_AT_STUDY_START,
};

/// Census cohort on `census_date`.
pub fn census_cohort(registry: &CodelistRegistry, census_date: NaiveDate) -> DatasetDefinition<'_> {
    let population = Population::new()
        .require("registered_on_census_date", move |r| {
            r.is_registered_on(census_date)
        })
        .require("non_disclosive_sex", has_non_disclosive_sex)
        .require("possible_age", move |r| has_possible_age(r, census_date))
        .require("alive_on_census_date", move |r| {
            r.patient.is_alive_on(census_date)
        });

    let indicators = build_indicators(census_date, migrant_flags(registry));
    let ethnicity_16 = &registry.ethnicity_16;
    let ethnicity_6 = &registry.ethnicity_6;

    let status_2 = mig_status_2_cat();
    let status_3 = mig_status_3_cat();
    let status_6 = mig_status_6_cat(true);
    let (set_2, set_3, set_6) = (indicators.clone(), indicators.clone(), indicators.clone());

    DatasetDefinition::new("census_cohort", population)
        .column("age_band", move |r| age_band(r.patient.age_on(census_date)))
        .column("sex", |r| r.patient.sex.as_code())
        .column("region", move |r| region_on(r, census_date))
        .column("imd_decile", move |r| imd_decile_on(r, census_date))
        .column("imd_quintile", move |r| imd_quintile_on(r, census_date))
        .column("latest_ethnicity_code", move |r| {
            latest_ethnicity_code(r, ethnicity_16, None)
        })
        .column("latest_ethnicity_16_level_group", move |r| {
            latest_ethnicity_group(r, ethnicity_16, None)
        })
        .column("latest_ethnicity_6_level_group", move |r| {
            latest_ethnicity_code(r, ethnicity_16, None)
                .and_then(|code| ethnicity_6.category(code))
        })
        .columns(indicator_columns(&indicators))
        .column(status_2.name(), move |r| {
            status_2.classify(&set_2.evaluate(r.events), None)
        })
        .column(status_3.name(), move |r| {
            let ethnicity = latest_ethnicity_group(r, ethnicity_16, None);
            status_3.classify(&set_3.evaluate(r.events), ethnicity)
        })
        .column(status_6.name(), move |r| {
            let ethnicity = latest_ethnicity_group(r, ethnicity_16, None);
            status_6.classify(&set_6.evaluate(r.events), ethnicity)
        })
}

fn indicator_columns<'a>(indicators: &IndicatorSet<'a>) -> Vec<Column<'a>> {
    well_known::MIGRANT_INDICATORS
        .iter()
        .filter_map(|&name| {
            let indicator = *indicators.get(name)?;
            Some(Column::new(name, move |r: &PatientRecord<'_>| {
                indicator.evaluate(r.events)
            }))
        })
        .collect()
}

/// Registered during the study, non-disclosive sex, alive at study start
/// and at most 100 years old at study start.
fn study_period_criteria<'a>(population: Population<'a>, config: &StudyConfig) -> Population<'a> {
    let (start, end) = (config.study_start, config.study_end);
    population
        .require("registered_during_study", move |r| {
            is_registered_during(r, start, end)
        })
        .require("non_disclosive_sex", has_non_disclosive_sex)
        .require("alive_at_study_start", move |r| is_alive_at(r, start))
        .require("not_over_100_at_study_start", move |r| {
            r.patient
                .age_on(start)
                .is_some_and(|age| age <= MAX_AGE_AT_STUDY_START)
        })
}

/// Population of the full study cohort.
pub fn full_study_population<'a>(
    registry: &'a CodelistRegistry,
    config: &StudyConfig,
) -> Population<'a> {
    let all_migrant = &registry.all_migrant;
    study_period_criteria(
        Population::new().require("has_any_migrant_code", move |r| r.has_event_in(all_migrant)),
        config,
    )
}

/// Full study cohort: migration code summary and demographics at study start.
pub fn full_study_cohort<'a>(
    registry: &'a CodelistRegistry,
    config: &StudyConfig,
) -> DatasetDefinition<'a> {
    let start = config.study_start;
    let all_migrant = &registry.all_migrant;
    let born_outside_uk = &registry.born_outside_uk;
    let asylum_refugee = &registry.asylum_refugee;
    let interpreter_required = &registry.interpreter_required;
    let ethnicity = &registry.ethnicity_6;

    DatasetDefinition::new("full_study_cohort", full_study_population(registry, config))
        .column("date_of_first_migration_code", move |r| {
            r.first_event_in(all_migrant).and_then(|e| e.date)
        })
        .column("number_of_migration_codes", move |r| {
            r.count_events_in(all_migrant)
        })
        .column("sex", |r| r.patient.sex.as_code())
        .column("has_cob_migrant_code", move |r| r.has_event_in(born_outside_uk))
        .column("has_asylum_or_refugee_migrant_code", move |r| {
            r.has_event_in(asylum_refugee)
        })
        .column("has_interpreter_migrant_code", move |r| {
            r.has_event_in(interpreter_required)
        })
        .column("date_of_first_practice_registration", |r| {
            r.first_registration().map(|reg| reg.start_date)
        })
        .column("time_to_first_migration_code", move |r| {
            days_to_first_code(r, all_migrant)
        })
        .column("latest_ethnicity_code", move |r| {
            latest_ethnicity_code(r, ethnicity, None)
        })
        .column("latest_ethnicity_group", move |r| {
            latest_ethnicity_group(r, ethnicity, None)
        })
        .columns(period_demographics(start))
}

/// Population denominator: the study-period population regardless of
/// migration codes.
pub fn population_denominator<'a>(
    registry: &'a CodelistRegistry,
    config: &StudyConfig,
) -> DatasetDefinition<'a> {
    let ethnicity = &registry.ethnicity_6;

    DatasetDefinition::new(
        "population_denominator",
        study_period_criteria(Population::new(), config),
    )
    .column("sex", |r| r.patient.sex.as_code())
    .column("latest_ethnicity_code", move |r| {
        latest_ethnicity_code(r, ethnicity, None)
    })
    .columns(period_demographics(config.study_start))
}

// Shared trailing columns of the study-period cohorts.
fn period_demographics<'a>(start: NaiveDate) -> Vec<Column<'a>> {
    vec![
        Column::new("year_of_birth", |r: &PatientRecord<'_>| r.patient.year_of_birth()),
        Column::new("year_of_birth_band", |r: &PatientRecord<'_>| {
            r.patient.year_of_birth().and_then(year_of_birth_band)
        }),
        Column::new("msoa_code", move |r: &PatientRecord<'_>| msoa_on(r, start)),
        Column::new("imd_decile", move |r: &PatientRecord<'_>| imd_decile_on(r, start)),
        Column::new("imd_quintile", move |r: &PatientRecord<'_>| imd_quintile_on(r, start)),
        Column::new("region", move |r: &PatientRecord<'_>| region_on(r, start)),
        Column::new("tpp_death_date", |r: &PatientRecord<'_>| r.patient.date_of_death),
        Column::new("ons_death_date", |r: &PatientRecord<'_>| r.ons_death_date()),
    ]
}

/// One row per migration code event of the full study cohort, in date order.
pub fn migration_events<'a>(
    registry: &'a CodelistRegistry,
    config: &StudyConfig,
) -> EventTableDefinition<'a> {
    let categories = migration_category();

    EventTableDefinition::new(
        "migration_events",
        full_study_population(registry, config),
        vec!["date", "snomedct_code", categories.name()],
        move |r| {
            r.events_in(&registry.all_migrant)
                .map(|event| {
                    let code = event.snomedct_code;
                    let flags: IndicatorValues<'_> = [
                        (
                            well_known::ENGLISH_NOT_MAIN_LANGUAGE,
                            registry.english_not_main_language.contains(code),
                        ),
                        (
                            well_known::INTERPRETER_REQUIRED,
                            registry.interpreter_required.contains(code),
                        ),
                        (
                            well_known::REFUGEE_ASYLUM_STATUS,
                            registry.asylum_refugee.contains(code),
                        ),
                        (
                            well_known::NOT_BORN_IN_UK,
                            registry.born_outside_uk.contains(code),
                        ),
                    ]
                    .into_iter()
                    .collect();
                    vec![
                        Value::from(event.date),
                        Value::from(code),
                        Value::from(categories.classify(&flags, None)),
                    ]
                })
                .collect()
        },
    )
}
