//! Enumerated values recorded in the patients table.

use std::fmt;

/// Recorded sex of a patient.
///
/// Only `Male` and `Female` are non-disclosive; the other values are
/// excluded by every study population.
///
/// # Examples
///
/// ```
/// use migrant_types::Sex;
///
/// assert_eq!(Sex::from_code("female"), Some(Sex::Female));
/// assert!(Sex::Male.is_non_disclosive());
/// assert!(!Sex::Intersex.is_non_disclosive());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Sex {
    /// Recorded as male.
    Male,
    /// Recorded as female.
    Female,
    /// Recorded as intersex.
    Intersex,
    /// Not recorded.
    Unknown,
}

impl Sex {
    /// Backend code for male.
    pub const MALE_CODE: &'static str = "male";
    /// Backend code for female.
    pub const FEMALE_CODE: &'static str = "female";
    /// Backend code for intersex.
    pub const INTERSEX_CODE: &'static str = "intersex";
    /// Backend code for unknown.
    pub const UNKNOWN_CODE: &'static str = "unknown";

    /// Parses the lowercase backend code.
    ///
    /// Returns `None` if the value is not one of the four known codes.
    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            Self::MALE_CODE => Some(Self::Male),
            Self::FEMALE_CODE => Some(Self::Female),
            Self::INTERSEX_CODE => Some(Self::Intersex),
            Self::UNKNOWN_CODE => Some(Self::Unknown),
            _ => None,
        }
    }

    /// Returns the backend code for this value.
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Male => Self::MALE_CODE,
            Self::Female => Self::FEMALE_CODE,
            Self::Intersex => Self::INTERSEX_CODE,
            Self::Unknown => Self::UNKNOWN_CODE,
        }
    }

    /// Returns true for male or female.
    pub fn is_non_disclosive(self) -> bool {
        matches!(self, Self::Male | Self::Female)
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sex_conversion() {
        assert_eq!(Sex::from_code("male"), Some(Sex::Male));
        assert_eq!(Sex::from_code("female"), Some(Sex::Female));
        assert_eq!(Sex::from_code("intersex"), Some(Sex::Intersex));
        assert_eq!(Sex::from_code("unknown"), Some(Sex::Unknown));
        assert_eq!(Sex::from_code("Male"), None);
        assert_eq!(Sex::from_code(""), None);
        assert_eq!(Sex::Female.as_code(), "female");
    }

    #[test]
    fn test_non_disclosive() {
        assert!(Sex::Male.is_non_disclosive());
        assert!(Sex::Female.is_non_disclosive());
        assert!(!Sex::Intersex.is_non_disclosive());
        assert!(!Sex::Unknown.is_non_disclosive());
    }

    #[test]
    fn test_display_matches_code() {
        assert_eq!(Sex::Intersex.to_string(), "intersex");
    }
}
