use chrono::{Datelike, Days, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::{AllocationError, Result};

/// hard ceiling on grid width; wider windows are a caller bug, not data
pub const MAX_GRID_MONTHS: u32 = 600;

/// a (year, month) key, ordered chronologically
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month));
        MonthKey { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    /// first day of this month
    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            AllocationError::DateOutOfRange {
                message: format!("no first day for {}", self),
            }
        })
    }

    /// last day of this month
    pub fn last_day(&self) -> Result<NaiveDate> {
        Ok(self
            .next()
            .first_day()?
            .checked_sub_days(Days::new(1))
            .expect("day after a valid month start"))
    }

    pub fn next(&self) -> MonthKey {
        if self.month == 12 {
            MonthKey::new(self.year + 1, 1)
        } else {
            MonthKey::new(self.year, self.month + 1)
        }
    }

    pub fn prev(&self) -> MonthKey {
        if self.month == 1 {
            MonthKey::new(self.year - 1, 12)
        } else {
            MonthKey::new(self.year, self.month - 1)
        }
    }

    /// offset by a signed number of months
    pub fn checked_add_months(&self, months: i32) -> MonthKey {
        let zero_based = self.year as i64 * 12 + (self.month as i64 - 1) + months as i64;
        MonthKey::new(
            zero_based.div_euclid(12) as i32,
            (zero_based.rem_euclid(12) + 1) as u32,
        )
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// one calendar month of the analysis grid, bounds precomputed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub key: MonthKey,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
}

impl CalendarMonth {
    pub fn from_key(key: MonthKey) -> Result<Self> {
        Ok(CalendarMonth {
            key,
            starts_on: key.first_day()?,
            ends_on: key.last_day()?,
        })
    }

    /// day count of the month
    pub fn days(&self) -> u32 {
        (self.ends_on - self.starts_on).num_days() as u32 + 1
    }
}

/// how far around the reference date the grid extends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisWindow {
    pub months_before: u32,
    pub months_after: u32,
}

impl AnalysisWindow {
    pub fn new(months_before: u32, months_after: u32) -> Self {
        AnalysisWindow {
            months_before,
            months_after,
        }
    }

    /// total grid length including the reference month
    pub fn total_months(&self) -> u32 {
        self.months_before + self.months_after + 1
    }
}

impl Default for AnalysisWindow {
    fn default() -> Self {
        AnalysisWindow::new(3, 8)
    }
}

/// ordered, gap-free list of calendar months around a reference date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthGrid {
    months: Vec<CalendarMonth>,
    reference_key: MonthKey,
}

impl MonthGrid {
    /// build the grid for an explicit reference date
    ///
    /// every month is normalized to its first day; the grid runs from
    /// reference - months_before to reference + months_after inclusive.
    pub fn build(reference: NaiveDate, window: AnalysisWindow) -> Result<Self> {
        if window.total_months() > MAX_GRID_MONTHS {
            return Err(AllocationError::WindowTooWide {
                months: window.total_months(),
                max: MAX_GRID_MONTHS,
            });
        }

        let reference_key = MonthKey::from_date(reference);
        let start = reference_key.checked_add_months(-(window.months_before as i32));

        let mut months = Vec::with_capacity(window.total_months() as usize);
        let mut key = start;
        for _ in 0..window.total_months() {
            months.push(CalendarMonth::from_key(key)?);
            key = key.next();
        }

        Ok(MonthGrid {
            months,
            reference_key,
        })
    }

    /// build using the injected clock as the reference date
    pub fn build_now(time: &SafeTimeProvider, window: AnalysisWindow) -> Result<Self> {
        Self::build(time.now().date_naive(), window)
    }

    pub fn months(&self) -> &[CalendarMonth] {
        &self.months
    }

    pub fn reference_key(&self) -> MonthKey {
        self.reference_key
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn contains(&self, key: MonthKey) -> bool {
        self.months.iter().any(|m| m.key == key)
    }

    pub fn first_day(&self) -> NaiveDate {
        self.months.first().expect("grid is never empty").starts_on
    }

    pub fn last_day(&self) -> NaiveDate {
        self.months.last().expect("grid is never empty").ends_on
    }
}
