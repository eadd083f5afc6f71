//! Age, year-of-birth and deprivation bands.

/// Fallback age band for negative or absent ages.
pub const MISSING_AGE_BAND: &str = "missing";

/// Fallback IMD band for addresses without a usable rank.
pub const UNKNOWN_IMD: &str = "unknown";

/// Number of ranked areas (LSOAs) in the English IMD.
pub const IMD_MAX_RANK: i32 = 32_844;

/// Age bands as `(upper bound exclusive, label)`; the last band is open.
const AGE_BANDS: &[(i64, &str)] = &[
    (16, "0-15"),
    (25, "16-24"),
    (35, "25-34"),
    (50, "35-49"),
    (65, "50-64"),
    (75, "65-74"),
    (85, "75-84"),
];

const OLDEST_AGE_BAND: &str = "85 plus";

/// Year-of-birth bands as `(first year, last year, label)`, inclusive.
const YEAR_OF_BIRTH_BANDS: &[(i32, i32, &str)] = &[
    (1900, 1925, "1900-1925"),
    (1926, 1945, "1926-1945"),
    (1946, 1965, "1946-1965"),
    (1966, 1985, "1966-1985"),
    (1986, 2005, "1986-2005"),
    (2006, 2025, "2006-2025"),
];

const IMD_QUINTILES: [&str; 5] = [
    "1 (most deprived)",
    "2",
    "3",
    "4",
    "5 (least deprived)",
];

const IMD_DECILES: [&str; 10] = [
    "1 (most deprived)",
    "2",
    "3",
    "4",
    "5",
    "6",
    "7",
    "8",
    "9",
    "10 (least deprived)",
];

/// Maps an age in whole years to its band.
///
/// ```
/// use migrant_status::age_band;
///
/// assert_eq!(age_band(Some(15)), "0-15");
/// assert_eq!(age_band(Some(85)), "85 plus");
/// assert_eq!(age_band(Some(-1)), "missing");
/// assert_eq!(age_band(None), "missing");
/// ```
pub fn age_band(age: Option<i64>) -> &'static str {
    match age {
        Some(age) if age >= 0 => AGE_BANDS
            .iter()
            .find(|(upper, _)| age < *upper)
            .map_or(OLDEST_AGE_BAND, |(_, label)| label),
        _ => MISSING_AGE_BAND,
    }
}

/// Maps a year of birth to its band, or `None` outside 1900..=2025.
pub fn year_of_birth_band(year: i32) -> Option<&'static str> {
    YEAR_OF_BIRTH_BANDS
        .iter()
        .find(|(first, last, _)| (*first..=*last).contains(&year))
        .map(|(_, _, label)| *label)
}

/// IMD quintile of a rounded IMD rank (1 is most deprived).
pub fn imd_quintile(imd_rounded: Option<i32>) -> &'static str {
    imd_fraction(imd_rounded, &IMD_QUINTILES)
}

/// IMD decile of a rounded IMD rank (1 is most deprived).
pub fn imd_decile(imd_rounded: Option<i32>) -> &'static str {
    imd_fraction(imd_rounded, &IMD_DECILES)
}

// Band k (0-based) covers ranks in [max*k/n, max*(k+1)/n), with integer
// truncation applied to each bound. The last band also includes max.
fn imd_fraction(imd_rounded: Option<i32>, labels: &[&'static str]) -> &'static str {
    let Some(imd) = imd_rounded else {
        return UNKNOWN_IMD;
    };
    let n = labels.len() as i64;
    let max = i64::from(IMD_MAX_RANK);
    let imd = i64::from(imd);

    labels
        .iter()
        .enumerate()
        .find(|(k, _)| {
            let k = *k as i64;
            let upper = max * (k + 1) / n;
            imd >= max * k / n && (imd < upper || (k == n - 1 && imd == upper))
        })
        .map_or(UNKNOWN_IMD, |(_, label)| label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_band_edges() {
        assert_eq!(age_band(Some(0)), "0-15");
        assert_eq!(age_band(Some(15)), "0-15");
        assert_eq!(age_band(Some(16)), "16-24");
        assert_eq!(age_band(Some(24)), "16-24");
        assert_eq!(age_band(Some(25)), "25-34");
        assert_eq!(age_band(Some(49)), "35-49");
        assert_eq!(age_band(Some(64)), "50-64");
        assert_eq!(age_band(Some(74)), "65-74");
        assert_eq!(age_band(Some(84)), "75-84");
        assert_eq!(age_band(Some(85)), "85 plus");
        assert_eq!(age_band(Some(130)), "85 plus");
    }

    #[test]
    fn test_age_band_missing() {
        assert_eq!(age_band(Some(-1)), MISSING_AGE_BAND);
        assert_eq!(age_band(None), MISSING_AGE_BAND);
    }

    #[test]
    fn test_year_of_birth_band() {
        assert_eq!(year_of_birth_band(1900), Some("1900-1925"));
        assert_eq!(year_of_birth_band(1925), Some("1900-1925"));
        assert_eq!(year_of_birth_band(1926), Some("1926-1945"));
        assert_eq!(year_of_birth_band(1965), Some("1946-1965"));
        assert_eq!(year_of_birth_band(1986), Some("1986-2005"));
        assert_eq!(year_of_birth_band(2025), Some("2006-2025"));
    }

    #[test]
    fn test_year_of_birth_band_out_of_range() {
        assert_eq!(year_of_birth_band(1899), None);
        assert_eq!(year_of_birth_band(2026), None);
    }

    #[test]
    fn test_imd_quintile_bounds() {
        // 32844 / 5 = 6568.8, truncated to 6568
        assert_eq!(imd_quintile(Some(0)), "1 (most deprived)");
        assert_eq!(imd_quintile(Some(6567)), "1 (most deprived)");
        assert_eq!(imd_quintile(Some(6568)), "2");
        assert_eq!(imd_quintile(Some(32_843)), "5 (least deprived)");
        assert_eq!(imd_quintile(Some(32_844)), "5 (least deprived)");
        assert_eq!(imd_quintile(Some(32_845)), UNKNOWN_IMD);
        assert_eq!(imd_quintile(Some(-100)), UNKNOWN_IMD);
        assert_eq!(imd_quintile(None), UNKNOWN_IMD);
    }

    #[test]
    fn test_imd_decile_bounds() {
        assert_eq!(imd_decile(Some(3283)), "1 (most deprived)");
        assert_eq!(imd_decile(Some(3284)), "2");
        assert_eq!(imd_decile(Some(16_500)), "6");
        assert_eq!(imd_decile(Some(32_800)), "10 (least deprived)");
        assert_eq!(imd_decile(Some(IMD_MAX_RANK)), "10 (least deprived)");
    }
}
