//! Calendar handling for the simulation
//!
//! The simulation advances one calendar day at a time over an inclusive
//! [`Period`]. This module also hosts the business-day rule used for
//! scheduled payments.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::orchestrator::GenerationError;

/// Inclusive date range within a single calendar month
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use expense_simulator_core_rs::Period;
///
/// let period = Period::new(
///     NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
/// )
/// .unwrap();
/// assert_eq!(period.len(), 30);
/// assert_eq!(period.saturdays().count(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    start: NaiveDate,
    end: NaiveDate,
}

impl Period {
    /// Create a period from `start` to `end`, both inclusive
    ///
    /// # Errors
    /// `InvalidPeriod` if `end` precedes `start`, or the two dates fall in
    /// different calendar months.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, GenerationError> {
        if end < start {
            return Err(GenerationError::InvalidPeriod {
                start,
                end,
                reason: "end date precedes start date".to_string(),
            });
        }
        if start.year() != end.year() || start.month() != end.month() {
            return Err(GenerationError::InvalidPeriod {
                start,
                end,
                reason: "period must lie within one calendar month".to_string(),
            });
        }
        Ok(Self { start, end })
    }

    /// The whole calendar month containing `year`/`month`
    pub fn month(year: i32, month: u32) -> Result<Self, GenerationError> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            GenerationError::InvalidConfig(format!("invalid month {}-{:02}", year, month))
        })?;
        let end = last_day_of_month(year, month).ok_or_else(|| {
            GenerationError::InvalidConfig(format!("invalid month {}-{:02}", year, month))
        })?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn year(&self) -> i32 {
        self.start.year()
    }

    pub fn month_number(&self) -> u32 {
        self.start.month()
    }

    /// Number of days in the period (both boundaries counted)
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// A period always holds at least one day
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Every date in the period, in increasing order
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        (0..self.len() as i64).map(move |offset| start + Duration::days(offset))
    }

    /// 1-based position of `date` within the period
    pub fn day_index(&self, date: NaiveDate) -> Option<usize> {
        if date < self.start || date > self.end {
            return None;
        }
        Some((date - self.start).num_days() as usize + 1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.day_index(date).is_some()
    }

    /// Every Saturday in the period
    pub fn saturdays(&self) -> impl Iterator<Item = NaiveDate> {
        self.days().filter(|d| d.weekday() == Weekday::Sat)
    }
}

/// Last calendar day of the given month
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

/// Resolve the date a scheduled payment is actually made
///
/// - Sunday moves back to the preceding Friday.
/// - Saturday moves forward to the following Monday.
/// - A day that does not exist in the month (31 April) falls back to the last
///   working day of the month.
///
/// Returns `None` only for an invalid year/month.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use expense_simulator_core_rs::core::calendar::payment_date;
///
/// // 2024-08-10 is a Saturday
/// assert_eq!(payment_date(2024, 8, 10), NaiveDate::from_ymd_opt(2024, 8, 12));
/// ```
pub fn payment_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => Some(match date.weekday() {
            Weekday::Sun => date - Duration::days(2),
            Weekday::Sat => date + Duration::days(2),
            _ => date,
        }),
        None => {
            let last = last_day_of_month(year, month)?;
            let back = match last.weekday() {
                Weekday::Sat => 1,
                Weekday::Sun => 2,
                _ => 0,
            };
            Some(last - Duration::days(back))
        }
    }
}

/// Calendar date for `day` within the period's month, clamped to the month end
pub fn day_in_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day).or_else(|| last_day_of_month(year, month))
}
