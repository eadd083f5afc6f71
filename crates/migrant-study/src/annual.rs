//! Annual migrant counts.
//!
//! Every measure shares one denominator per interval: alive, registered,
//! male or female and aged `0 < age < 110` on the interval start. Each
//! numerator is repeated for every subgroup in [`SUBGROUPS`].

use migrant_loader::{Codelist, CodelistRegistry, PatientRecord};
use migrant_status::{
    age_band, build_indicators, labels, mig_status_2_cat, migrant_flags, FlagTable,
};
use migrant_types::well_known;

use crate::config::StudyConfig;
use crate::error::StudyResult;
use crate::interval::{years, Interval};
use crate::measures::{interval_expr, GroupBy, IntervalExpr, MeasureSet};
use crate::value::Value;
use crate::variables::{ethnicity_or_unknown, has_non_disclosive_sex, has_possible_age, imd_quintile_on, region_on};

/// Subgroup suffixes in registration order. The empty suffix is ungrouped.
pub const SUBGROUPS: [&str; 6] = ["", "age", "sex", "ethnicity", "imd", "region"];

/// Which family of numerators to register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureVariant {
    /// One measure per migration indicator, named `{key}[_{suffix}]`.
    Indicators,
    /// One measure per 2-category status label.
    Status2Cat,
    /// One measure per migration indicator, prefixed `migration_status_types__`.
    StatusTypes,
}

impl MeasureVariant {
    /// Short name used for output files and logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Indicators => "indicators",
            Self::Status2Cat => "status-2cat",
            Self::StatusTypes => "status-types",
        }
    }
}

/// Lowercases and maps spaces and hyphens to underscores.
///
/// ```
/// use migrant_study::safe_label;
///
/// assert_eq!(safe_label("Non-migrant"), "non_migrant");
/// ```
pub fn safe_label(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Denominator shared by all annual measures.
pub fn annual_denominator<'a>() -> IntervalExpr<'a, bool> {
    interval_expr(|r, iv| {
        let start = iv.start;
        r.patient.is_alive_on(start)
            && r.is_registered_on(start)
            && has_non_disclosive_sex(r)
            && has_possible_age(r, start)
    })
}

/// Grouping for a subgroup suffix; unknown suffixes are ungrouped.
pub fn subgroup<'a>(registry: &'a CodelistRegistry, suffix: &str) -> GroupBy<'a> {
    let ethnicity = &registry.ethnicity_16;
    match suffix {
        "age" => GroupBy::new().column(
            "age_band",
            interval_expr(|r, iv| Value::from(age_band(r.patient.age_on(iv.start)))),
        ),
        "sex" => GroupBy::new().column(
            "sex",
            interval_expr(|r, _| Value::from(r.patient.sex.as_code())),
        ),
        "ethnicity" => GroupBy::new().column(
            "ethnicity",
            interval_expr(move |r, iv| {
                Value::from(ethnicity_or_unknown(r, ethnicity, Some(iv.end)))
            }),
        ),
        "imd" => GroupBy::new().column(
            "imd_quintile",
            interval_expr(|r, iv| Value::from(imd_quintile_on(r, iv.start))),
        ),
        "region" => GroupBy::new().column(
            "region",
            interval_expr(|r, iv| {
                Value::from(region_on(r, iv.start).unwrap_or_else(|| "unknown".to_string()))
            }),
        ),
        _ => GroupBy::new(),
    }
}

/// Builds the annual measures of one variant.
///
/// # Errors
/// [`crate::StudyError::DuplicateMeasure`] if two generated names collide.
pub fn annual_measures<'a>(
    registry: &'a CodelistRegistry,
    config: &StudyConfig,
    variant: MeasureVariant,
) -> StudyResult<MeasureSet<'a>> {
    let mut measures = MeasureSet::new();
    measures.define_defaults(
        annual_denominator(),
        years(config.measure_years).starting_on(config.measures_start),
    );

    let flags = migrant_flags(registry);
    for (prefix, numerator) in numerators(&flags, variant) {
        for suffix in SUBGROUPS {
            let name = match (variant, suffix) {
                (_, "") => prefix.clone(),
                (MeasureVariant::Indicators, _) => format!("{prefix}_{suffix}"),
                _ => format!("{prefix}__{suffix}"),
            };
            measures.define_measure(name, numerator.clone(), subgroup(registry, suffix))?;
        }
    }

    tracing::info!(
        "Defined {} {} measures over {} intervals",
        measures.len(),
        variant.name(),
        measures.intervals().len()
    );
    Ok(measures)
}

// Base name and numerator of each measure family member.
fn numerators<'a>(
    flags: &FlagTable<'a>,
    variant: MeasureVariant,
) -> Vec<(String, IntervalExpr<'a, bool>)> {
    match variant {
        MeasureVariant::Indicators => flags
            .iter()
            .map(|&(key, codelist)| (key.to_string(), indicator_at_end(key, codelist)))
            .collect(),
        MeasureVariant::StatusTypes => flags
            .iter()
            .map(|&(key, codelist)| {
                (
                    format!("migration_status_types__{}", safe_label(key)),
                    indicator_at_end(key, codelist),
                )
            })
            .collect(),
        MeasureVariant::Status2Cat => {
            let table = mig_status_2_cat();
            [labels::MIGRANT, labels::NON_MIGRANT]
                .into_iter()
                .map(|label| {
                    let name = format!("{}__{}", table.name(), safe_label(label));
                    let table = table.clone();
                    let flags = flags.clone();
                    let numerator = interval_expr(move |r: &PatientRecord<'_>, iv: &Interval| {
                        let values = build_indicators(iv.end, flags.clone()).evaluate(r.events);
                        table.classify(&values, None) == label
                    });
                    (name, numerator)
                })
                .collect()
        }
    }
}

// Single-flag indicator bounded by the interval end.
fn indicator_at_end<'a>(key: &'a str, codelist: Option<&'a Codelist>) -> IntervalExpr<'a, bool> {
    interval_expr(move |r: &PatientRecord<'_>, iv: &Interval| {
        build_indicators(iv.end, vec![(key, codelist)])
            .get(key)
            .is_some_and(|indicator| indicator.evaluate(r.events))
    })
}

/// Number of measures a variant defines.
pub fn measure_count(variant: MeasureVariant) -> usize {
    let numerators = match variant {
        MeasureVariant::Status2Cat => 2,
        MeasureVariant::Indicators | MeasureVariant::StatusTypes => {
            well_known::MIGRANT_INDICATORS.len()
        }
    };
    numerators * SUBGROUPS.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use migrant_loader::PatientStore;
    use migrant_types::{ClinicalEvent, Patient, PracticeRegistration, Sex};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> StudyConfig {
        StudyConfig {
            measure_years: 2,
            ..StudyConfig::default()
        }
    }

    fn registry() -> CodelistRegistry {
        CodelistRegistry {
            all_migrant: Codelist::from_codes("all", [1, 2]),
            born_outside_uk: Codelist::from_codes("abroad", [2]),
            ethnicity_16: Codelist::from_categories("eth16", [(9, "Irish")]),
            ..Default::default()
        }
    }

    // 1: migrant code in mid 2010, Irish ethnicity from 2009.
    // 2: no codes, no region.
    // 3: born mid 2008, aged 0 on 2009-01-01 so only in the 2010 denominator.
    fn store() -> PatientStore {
        let mut store = PatientStore::new();
        store.insert_patients([
            Patient {
                patient_id: 1,
                sex: Sex::Female,
                date_of_birth: Some(ymd(1980, 1, 1)),
                date_of_death: None,
            },
            Patient {
                patient_id: 2,
                sex: Sex::Male,
                date_of_birth: Some(ymd(1950, 1, 1)),
                date_of_death: None,
            },
            Patient {
                patient_id: 3,
                sex: Sex::Male,
                date_of_birth: Some(ymd(2008, 6, 1)),
                date_of_death: None,
            },
        ]);
        store.insert_registrations((1..=3).map(|id| PracticeRegistration {
            patient_id: id,
            start_date: ymd(2000, 1, 1),
            end_date: None,
            practice_nuts1_region_name: (id == 1).then(|| "London".to_string()),
        }));
        store.insert_events([
            ClinicalEvent {
                patient_id: 1,
                date: Some(ymd(2010, 6, 1)),
                snomedct_code: 2,
            },
            ClinicalEvent {
                patient_id: 1,
                date: Some(ymd(2009, 2, 1)),
                snomedct_code: 9,
            },
        ]);
        store
    }

    #[test]
    fn test_safe_label() {
        assert_eq!(safe_label("Migrant"), "migrant");
        assert_eq!(safe_label("Non-migrant"), "non_migrant");
        assert_eq!(safe_label("any migrant"), "any_migrant");
    }

    #[test]
    fn test_indicator_measure_names() {
        let registry = registry();
        let measures = annual_measures(&registry, &config(), MeasureVariant::Indicators).unwrap();
        assert_eq!(measures.len(), measure_count(MeasureVariant::Indicators));
        let names: Vec<_> = measures.measures().iter().map(|m| m.name()).collect();
        assert_eq!(&names[..3], ["any_migrant", "any_migrant_age", "any_migrant_sex"]);
        assert!(names.contains(&"interpreter_required_region"));
    }

    #[test]
    fn test_status_measure_names() {
        let registry = registry();
        let measures = annual_measures(&registry, &config(), MeasureVariant::Status2Cat).unwrap();
        let names: Vec<_> = measures.measures().iter().map(|m| m.name()).collect();
        assert_eq!(names.len(), 12);
        assert_eq!(names[0], "mig_status_2_cat__migrant");
        assert_eq!(names[7], "mig_status_2_cat__non_migrant__age");

        let measures = annual_measures(&registry, &config(), MeasureVariant::StatusTypes).unwrap();
        let names: Vec<_> = measures.measures().iter().map(|m| m.name()).collect();
        assert_eq!(names[0], "migration_status_types__any_migrant");
        assert_eq!(names[1], "migration_status_types__any_migrant__age");
    }

    #[test]
    fn test_indicator_counts_at_interval_end() {
        let registry = registry();
        let table = annual_measures(&registry, &config(), MeasureVariant::Indicators)
            .unwrap()
            .evaluate(&store())
            .unwrap();

        let rows: Vec<_> = table.rows_for("any_migrant").collect();
        assert_eq!(rows.len(), 2);
        // 2009: patients 1 and 2 only; the code is not yet recorded.
        assert_eq!((rows[0].numerator, rows[0].denominator), (0, 2));
        // 2010: patient 3 has turned one.
        assert_eq!((rows[1].numerator, rows[1].denominator), (1, 3));
    }

    #[test]
    fn test_status_type_counts_event_on_interval_end() {
        let registry = registry();
        let mut store = store();
        store.insert_events([
            ClinicalEvent {
                patient_id: 2,
                date: Some(ymd(2009, 12, 31)),
                snomedct_code: 2,
            },
            ClinicalEvent {
                patient_id: 3,
                date: None,
                snomedct_code: 2,
            },
        ]);
        let table = annual_measures(&registry, &config(), MeasureVariant::StatusTypes)
            .unwrap()
            .evaluate(&store)
            .unwrap();

        let name = format!("migration_status_types__{}", safe_label(well_known::NOT_BORN_IN_UK));
        let counts: Vec<_> = table
            .rows_for(&name)
            .map(|r| (r.numerator, r.denominator))
            .collect();
        // The undated event never counts.
        assert_eq!(counts, vec![(1, 2), (2, 3)]);
    }

    #[test]
    fn test_subgroup_values() {
        let registry = registry();
        let table = annual_measures(&registry, &config(), MeasureVariant::Status2Cat)
            .unwrap()
            .evaluate(&store())
            .unwrap();

        let ethnicity: Vec<_> = table
            .rows_for("mig_status_2_cat__non_migrant__ethnicity")
            .filter(|r| r.interval.start == ymd(2009, 1, 1))
            .map(|r| (r.group("ethnicity").cloned(), r.numerator))
            .collect();
        assert_eq!(
            ethnicity,
            vec![
                (Some(Value::from("Irish")), 1),
                (Some(Value::from("unknown")), 1),
            ]
        );

        let regions: Vec<_> = table
            .rows_for("mig_status_2_cat__migrant__region")
            .filter(|r| r.interval.start == ymd(2010, 1, 1))
            .map(|r| (r.group("region").cloned(), r.numerator, r.denominator))
            .collect();
        assert_eq!(
            regions,
            vec![
                (Some(Value::from("London")), 1, 1),
                (Some(Value::from("unknown")), 0, 2),
            ]
        );
    }
}
