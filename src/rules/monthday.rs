//! Month/day selectors.
//!
//! A [`MonthDayRange`] resolves to a closed interval of calendar dates for a
//! reference year. When the end boundary falls before the beginning (and has
//! no year of its own) it rolls into the following year, so `Oct-Mar` covers
//! October through the end of next March. Membership is tested against the
//! interval starting in the queried year and the one starting the year before.

use chrono::{Datelike, NaiveDate};

use super::calendar::{days_in_month, easter_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonthDayKind {
    /// `Jan`: the whole month.
    Month,
    /// `Jan 05`
    MonthDay,
    /// `Jan 05-10`
    MonthDayRange,
    /// `easter`
    Easter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDayDate {
    pub kind: MonthDayKind,
    pub year: Option<i32>,
    pub month: u32,
    pub day: Option<u32>,
    pub day_to: Option<u32>,
}

impl MonthDayDate {
    pub fn month(year: Option<i32>, month: u32) -> Self {
        Self { kind: MonthDayKind::Month, year, month, day: None, day_to: None }
    }

    pub fn month_day(year: Option<i32>, month: u32, day: u32) -> Self {
        Self { kind: MonthDayKind::MonthDay, year, month, day: Some(day), day_to: None }
    }

    pub fn easter(year: Option<i32>) -> Self {
        Self { kind: MonthDayKind::Easter, year, month: 0, day: None, day_to: None }
    }

    /// First date covered when resolved in `year`.
    pub fn first_date(&self, year: i32) -> Option<NaiveDate> {
        let year = self.year.unwrap_or(year);
        match self.kind {
            MonthDayKind::Easter => easter_date(year),
            MonthDayKind::Month => NaiveDate::from_ymd_opt(year, self.month, 1),
            MonthDayKind::MonthDay | MonthDayKind::MonthDayRange => {
                let day = self.day.unwrap_or(1);
                // A start past the end of the month begins on the next day: `Feb 29-Mar 05` opens on Mar 01.
                NaiveDate::from_ymd_opt(year, self.month, day)
                    .or_else(|| clamped(year, self.month, day).and_then(|last| last.succ_opt()))
            }
        }
    }

    /// Whether a single date selector names a real day in `year` (`Feb 29` only exists in leap years).
    fn exists_in(&self, year: i32) -> bool {
        match (self.kind, self.day) {
            (MonthDayKind::MonthDay, Some(day)) => day <= days_in_month(self.year.unwrap_or(year), self.month),
            _ => true,
        }
    }

    /// Last date covered when resolved in `year`.
    pub fn last_date(&self, year: i32) -> Option<NaiveDate> {
        let year = self.year.unwrap_or(year);
        match self.kind {
            MonthDayKind::Easter => easter_date(year),
            MonthDayKind::Month => clamped(year, self.month, 31),
            MonthDayKind::MonthDay => clamped(year, self.month, self.day.unwrap_or(1)),
            MonthDayKind::MonthDayRange => clamped(year, self.month, self.day_to.or(self.day).unwrap_or(1)),
        }
    }
}

/// Range ends past the end of a month clamp to its last day (`Feb 25-30` ends on the last of February).
fn clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}

/// One entry of a month/day selector: a single date (or month) or a `from-to` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthDayRange {
    pub from: MonthDayDate,
    pub to: Option<MonthDayDate>,
}

impl MonthDayRange {
    pub fn single(from: MonthDayDate) -> Self {
        Self { from, to: None }
    }

    /// Concrete bounds for the occurrence that starts in `year`.
    pub fn bounds(&self, year: i32) -> Option<(NaiveDate, NaiveDate)> {
        if self.to.is_none() && !self.from.exists_in(year) {
            return None;
        }
        let start = self.from.first_date(year)?;
        let end_date = self.to.as_ref().unwrap_or(&self.from);
        let mut end = end_date.last_date(start.year())?;
        if end < start && end_date.year.is_none() {
            end = end_date.last_date(start.year() + 1)?;
        }
        Some((start, end))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let years = match self.from.year {
            Some(year) => vec![year],
            None => vec![date.year(), date.year() - 1],
        };
        years.into_iter().filter_map(|y| self.bounds(y)).any(|(start, end)| start <= date && date <= end)
    }
}
