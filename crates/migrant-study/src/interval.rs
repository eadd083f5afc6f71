//! Measure intervals.

use chrono::{Months, NaiveDate};

/// A closed date interval `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Interval {
    /// First day.
    pub start: NaiveDate,
    /// Last day (inclusive).
    pub end: NaiveDate,
}

impl Interval {
    /// Returns true if `date` falls within the interval.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// A run of consecutive one-year intervals, see [`years`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Years(u32);

/// `n` consecutive one-year intervals.
///
/// ```
/// use chrono::NaiveDate;
/// use migrant_study::years;
///
/// let intervals = years(2).starting_on(NaiveDate::from_ymd_opt(2009, 1, 1).unwrap());
/// assert_eq!(intervals[1].start, NaiveDate::from_ymd_opt(2010, 1, 1).unwrap());
/// assert_eq!(intervals[1].end, NaiveDate::from_ymd_opt(2010, 12, 31).unwrap());
/// ```
pub fn years(n: u32) -> Years {
    Years(n)
}

impl Years {
    /// Materialises the intervals; each ends the day before the next starts.
    pub fn starting_on(self, start: NaiveDate) -> Vec<Interval> {
        (0..self.0)
            .map_while(|i| {
                let from = start.checked_add_months(Months::new(12 * i))?;
                let next = start.checked_add_months(Months::new(12 * (i + 1)))?;
                Some(Interval {
                    start: from,
                    end: next.pred_opt()?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sixteen_years_from_2009() {
        let intervals = years(16).starting_on(ymd(2009, 1, 1));
        assert_eq!(intervals.len(), 16);
        assert_eq!(intervals[0], Interval { start: ymd(2009, 1, 1), end: ymd(2009, 12, 31) });
        assert_eq!(intervals[15], Interval { start: ymd(2024, 1, 1), end: ymd(2024, 12, 31) });
        for pair in intervals.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
    }

    #[test]
    fn test_mid_year_start() {
        let intervals = years(1).starting_on(ymd(2020, 4, 1));
        assert_eq!(intervals[0].end, ymd(2021, 3, 31));
        assert!(intervals[0].contains(ymd(2021, 3, 31)));
        assert!(!intervals[0].contains(ymd(2021, 4, 1)));
    }

    #[test]
    fn test_zero_years() {
        assert!(years(0).starting_on(ymd(2009, 1, 1)).is_empty());
    }
}
