//! Well-known indicator names and category labels.
//!
//! # Examples
//!
//! ```
//! use migrant_types::well_known;
//!
//! assert_eq!(well_known::MIGRANT_INDICATORS.len(), 7);
//! assert_eq!(well_known::MIGRANT_INDICATORS[0], well_known::ANY_MIGRANT);
//! ```

// =============================================================================
// Migration indicators
// =============================================================================

/// Any migration-related code.
pub const ANY_MIGRANT: &str = "any_migrant";

/// Country of birth recorded as the UK.
pub const BORN_IN_UK: &str = "born_in_uk";

/// Country of birth recorded outside the UK.
pub const NOT_BORN_IN_UK: &str = "not_born_in_uk";

/// Immigration status other than refugee or asylum seeker.
pub const IMMIG_STATUS_EXCL_REFUGEE_ASYLUM: &str = "immig_status_excl_refugee_asylum";

/// Refugee or asylum seeker status.
pub const REFUGEE_ASYLUM_STATUS: &str = "refugee_asylum_status";

/// Main language is not English (interpreter codes excluded).
pub const ENGLISH_NOT_MAIN_LANGUAGE: &str = "english_not_main_language";

/// Interpreter required.
pub const INTERPRETER_REQUIRED: &str = "interpreter_required";

/// All migration indicators in output column order.
pub const MIGRANT_INDICATORS: [&str; 7] = [
    ANY_MIGRANT,
    BORN_IN_UK,
    NOT_BORN_IN_UK,
    IMMIG_STATUS_EXCL_REFUGEE_ASYLUM,
    REFUGEE_ASYLUM_STATUS,
    ENGLISH_NOT_MAIN_LANGUAGE,
    INTERPRETER_REQUIRED,
];

// =============================================================================
// Ethnicity
// =============================================================================

/// 16-level ethnicity group used as weak evidence of non-migrant status.
pub const WHITE_BRITISH: &str = "White - British";

/// Fallback label for patients without a recorded ethnicity.
pub const UNKNOWN_ETHNICITY: &str = "unknown";
