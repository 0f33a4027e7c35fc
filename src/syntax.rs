//! Syntax tree produced by both the grammar and the fast path.
//!
//! ```text
//! TimeDomain     groups separated by `;`
//!  └ FallbackGroup     alternatives separated by `||`
//!     └ RuleSequence       selector sequences separated by `,`
//!        └ SelectorSequence   [wide] [small] [time] [modifier]
//! ```

use chrono::Weekday;

use crate::rules::{HolidayRef, MonthDayRange, RuleStatus, WeekRange, YearRange};
use crate::time_expr::TimeSpan;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TimeDomain {
    pub groups: Vec<FallbackGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FallbackGroup {
    pub members: Vec<RuleSequence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RuleSequence {
    pub selectors: Vec<SelectorSequence>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectorSequence {
    /// `24/7`
    pub always_open: bool,
    pub years: Vec<YearRange>,
    pub monthdays: Vec<MonthDayRange>,
    pub weeks: Vec<WeekRange>,
    pub weekdays: Option<WeekdaySelector>,
    pub times: Vec<TimeSpan>,
    pub modifier: Option<RuleModifier>,
}

impl SelectorSequence {
    pub fn has_range_selectors(&self) -> bool {
        self.always_open
            || !self.years.is_empty()
            || !self.monthdays.is_empty()
            || !self.weeks.is_empty()
            || self.weekdays.is_some()
    }
}

/// Inclusive weekday range as written, `Mo` or `Fr-Mo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayRange {
    pub from: Weekday,
    pub to: Weekday,
}

impl WeekdayRange {
    pub fn single(day: Weekday) -> Self {
        Self { from: day, to: day }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WeekdaySelector {
    Weekdays(Vec<WeekdayRange>),
    Holidays(Vec<HolidayRef>),
    /// `Mo-Fr,PH` or `PH,Mo-Fr`
    WeekdaysOrHolidays { weekdays: Vec<WeekdayRange>, holidays: Vec<HolidayRef> },
    /// `SH Mo-Fr`
    WeekdaysInHolidays { weekdays: Vec<WeekdayRange>, holidays: Vec<HolidayRef> },
}

/// `open`, `off "comment"`, `"comment"` ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleModifier {
    pub status: Option<RuleStatus>,
    pub comment: Option<String>,
}
