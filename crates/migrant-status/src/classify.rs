//! Migration status classification.
//!
//! Every classification is a [`RuleTable`]: an ordered list of
//! `(condition, label)` rules evaluated first-match-wins, with a fallback
//! label. The order of rules is part of the definition and is never
//! rearranged.
//!
//! ```
//! use migrant_status::{mig_status_6_cat, IndicatorValues};
//!
//! let values: IndicatorValues = [("not_born_in_uk", true), ("born_in_uk", true)]
//!     .into_iter()
//!     .collect();
//! assert_eq!(mig_status_6_cat(true).classify(&values, None), "Definite migrant");
//! ```

use migrant_types::well_known;

use crate::indicators::IndicatorValues;

/// Classification labels.
pub mod labels {
    /// 2/3-category: has a migration code.
    pub const MIGRANT: &str = "Migrant";
    /// 2/3-category: no migration code (or evidence of UK birth).
    pub const NON_MIGRANT: &str = "Non-migrant";
    /// Fallback label for 3- and 6-category status.
    pub const UNKNOWN: &str = "Unknown";
    /// 6-category: country of birth outside the UK.
    pub const DEFINITE_MIGRANT: &str = "Definite migrant";
    /// 6-category: immigration, refugee or asylum status.
    pub const HIGHLY_LIKELY_MIGRANT: &str = "Highly likely migrant";
    /// 6-category: language or interpreter codes.
    pub const LIKELY_MIGRANT: &str = "Likely migrant";
    /// 6-category: country of birth is the UK.
    pub const DEFINITE_NON_MIGRANT: &str = "Definite non-migrant";
    /// 6-category: White British ethnicity without any migration code.
    pub const LIKELY_NON_MIGRANT: &str = "Likely non-migrant";

    /// Migration event category: language.
    pub const LANGUAGE: &str = "Main/first language is not English";
    /// Migration event category: interpreter.
    pub const INTERPRETER: &str = "Interpreter required";
    /// Migration event category: asylum or refugee status.
    pub const ASYLUM_OR_REFUGEE: &str = "Asylum or refugee status";
    /// Migration event category: country of birth.
    pub const COUNTRY_OF_BIRTH: &str = "Country of birth";
    /// Migration event category fallback.
    pub const OTHER: &str = "Other";
}

/// A boolean condition over indicator values and an optional ethnicity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// The named indicator is true (absent indicators are false).
    Flag(&'static str),
    /// At least one sub-condition holds.
    AnyOf(Vec<Condition>),
    /// Every sub-condition holds.
    AllOf(Vec<Condition>),
    /// The sub-condition does not hold.
    Not(Box<Condition>),
    /// The ethnicity is present and equals the label.
    EthnicityIs(&'static str),
}

impl Condition {
    /// Shorthand for `Condition::Not`.
    pub fn not(condition: Condition) -> Self {
        Self::Not(Box::new(condition))
    }

    /// Evaluates the condition.
    pub fn holds(&self, flags: &IndicatorValues<'_>, ethnicity: Option<&str>) -> bool {
        match self {
            Self::Flag(name) => flags.get(name),
            Self::AnyOf(conditions) => conditions.iter().any(|c| c.holds(flags, ethnicity)),
            Self::AllOf(conditions) => conditions.iter().all(|c| c.holds(flags, ethnicity)),
            Self::Not(condition) => !condition.holds(flags, ethnicity),
            Self::EthnicityIs(label) => ethnicity == Some(*label),
        }
    }
}

/// One `(condition, label)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Condition to test.
    pub condition: Condition,
    /// Label returned when the condition holds.
    pub label: &'static str,
}

/// An ordered first-match rule table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    name: &'static str,
    rules: Vec<Rule>,
    otherwise: &'static str,
}

impl RuleTable {
    /// Creates an empty table that always yields `otherwise`.
    pub fn new(name: &'static str, otherwise: &'static str) -> Self {
        Self {
            name,
            rules: Vec::new(),
            otherwise,
        }
    }

    /// Appends a rule after all existing rules.
    pub fn rule(mut self, condition: Condition, label: &'static str) -> Self {
        self.rules.push(Rule { condition, label });
        self
    }

    /// Table name (used as the output column name).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Fallback label.
    pub fn otherwise(&self) -> &'static str {
        self.otherwise
    }

    /// Returns the label of the first rule whose condition holds.
    pub fn classify(&self, flags: &IndicatorValues<'_>, ethnicity: Option<&str>) -> &'static str {
        self.rules
            .iter()
            .find(|rule| rule.condition.holds(flags, ethnicity))
            .map_or(self.otherwise, |rule| rule.label)
    }

    /// Every label the table can produce, in rule order, fallback last.
    pub fn labels(&self) -> Vec<&'static str> {
        let mut labels: Vec<&'static str> = Vec::with_capacity(self.rules.len() + 1);
        for label in self
            .rules
            .iter()
            .map(|r| r.label)
            .chain(std::iter::once(self.otherwise))
        {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}

/// Two categories: "Migrant" or "Non-migrant".
pub fn mig_status_2_cat() -> RuleTable {
    RuleTable::new("mig_status_2_cat", labels::NON_MIGRANT)
        .rule(Condition::Flag(well_known::ANY_MIGRANT), labels::MIGRANT)
}

/// Three categories: "Migrant", "Non-migrant" or "Unknown".
///
/// White British ethnicity counts towards "Non-migrant" only without any
/// migration code.
pub fn mig_status_3_cat() -> RuleTable {
    RuleTable::new("mig_status_3_cat", labels::UNKNOWN)
        .rule(Condition::Flag(well_known::ANY_MIGRANT), labels::MIGRANT)
        .rule(
            Condition::AnyOf(vec![
                Condition::Flag(well_known::BORN_IN_UK),
                white_british_without_migrant_code(),
            ]),
            labels::NON_MIGRANT,
        )
}

/// Six categories, from "Definite migrant" down to "Unknown".
///
/// The "Likely non-migrant" rule is only present when an ethnicity source is
/// available (`with_ethnicity`).
pub fn mig_status_6_cat(with_ethnicity: bool) -> RuleTable {
    let table = RuleTable::new("mig_status_6_cat", labels::UNKNOWN)
        .rule(
            Condition::Flag(well_known::NOT_BORN_IN_UK),
            labels::DEFINITE_MIGRANT,
        )
        .rule(
            Condition::AnyOf(vec![
                Condition::Flag(well_known::IMMIG_STATUS_EXCL_REFUGEE_ASYLUM),
                Condition::Flag(well_known::REFUGEE_ASYLUM_STATUS),
            ]),
            labels::HIGHLY_LIKELY_MIGRANT,
        )
        .rule(
            Condition::AnyOf(vec![
                Condition::Flag(well_known::ENGLISH_NOT_MAIN_LANGUAGE),
                Condition::Flag(well_known::INTERPRETER_REQUIRED),
            ]),
            labels::LIKELY_MIGRANT,
        )
        .rule(
            Condition::Flag(well_known::BORN_IN_UK),
            labels::DEFINITE_NON_MIGRANT,
        );

    if with_ethnicity {
        table.rule(
            white_british_without_migrant_code(),
            labels::LIKELY_NON_MIGRANT,
        )
    } else {
        table
    }
}

/// Category of a single migration-code event.
///
/// Flags are per event: whether the event's code is in each codelist.
pub fn migration_category() -> RuleTable {
    RuleTable::new("migration_category", labels::OTHER)
        .rule(
            Condition::Flag(well_known::ENGLISH_NOT_MAIN_LANGUAGE),
            labels::LANGUAGE,
        )
        .rule(
            Condition::Flag(well_known::INTERPRETER_REQUIRED),
            labels::INTERPRETER,
        )
        .rule(
            Condition::Flag(well_known::REFUGEE_ASYLUM_STATUS),
            labels::ASYLUM_OR_REFUGEE,
        )
        .rule(
            Condition::Flag(well_known::NOT_BORN_IN_UK),
            labels::COUNTRY_OF_BIRTH,
        )
}

fn white_british_without_migrant_code() -> Condition {
    Condition::AllOf(vec![
        Condition::EthnicityIs(well_known::WHITE_BRITISH),
        Condition::not(Condition::Flag(well_known::ANY_MIGRANT)),
    ])
}
