//! Range selectors and their per-date membership tests.
//!
//! Selectors of one rule are AND-ed together. A comma list inside a single
//! selector (`Mo,We`, `Jan-Feb,Aug`, `2010-2015,2020+`) is an OR over its
//! entries and is held as one selector.
//!
//! Weights feed the rule specificity:
//!
//! | selector            | weight |
//! |---------------------|--------|
//! | always open         | 0      |
//! | weekday / holiday   | 1      |
//! | week number         | 3      |
//! | weekday in holiday  | 3      |
//! | year                | 4      |
//! | month / day         | 5      |

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use super::calendar::cycle_slice;
use super::monthday::MonthDayRange;
use crate::engine::HolidaySets;

pub(crate) const WEIGHT_ALWAYS_OPEN: u32 = 0;
pub(crate) const WEIGHT_WEEKDAY: u32 = 1;
pub(crate) const WEIGHT_WEEK: u32 = 3;
pub(crate) const WEIGHT_WEEKDAY_IN_HOLIDAY: u32 = 3;
pub(crate) const WEIGHT_YEAR: u32 = 4;
pub(crate) const WEIGHT_MONTHDAY: u32 = 5;

bitflags::bitflags! {
    /// A set of weekdays.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WeekdaySet: u8 {
        const MO = 1 << 0;
        const TU = 1 << 1;
        const WE = 1 << 2;
        const TH = 1 << 3;
        const FR = 1 << 4;
        const SA = 1 << 5;
        const SU = 1 << 6;
    }
}

impl WeekdaySet {
    pub fn from_weekday(day: Weekday) -> Self {
        Self::from_bits_truncate(1 << day.num_days_from_monday())
    }

    /// Inclusive range, wrapping past Sunday (`Fr-Mo`).
    pub fn range(from: Weekday, to: Weekday) -> Self {
        let days: Vec<u32> = (0..7).collect();
        cycle_slice(&days, from.num_days_from_monday() as usize, to.num_days_from_monday() as usize)
            .into_iter()
            .fold(Self::empty(), |set, d| set | Self::from_bits_truncate(1 << d))
    }

    pub fn contains_day(&self, day: Weekday) -> bool {
        self.contains(Self::from_weekday(day))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HolidayKind {
    /// `PH`
    Public,
    /// `SH`
    School,
}

/// A holiday reference, optionally shifted: `PH +1 day` is the day after a
/// public holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolidayRef {
    pub kind: HolidayKind,
    pub offset_days: i32,
}

impl HolidayRef {
    pub fn new(kind: HolidayKind) -> Self {
        Self { kind, offset_days: 0 }
    }

    pub fn matches(&self, date: NaiveDate, holidays: &HolidaySets) -> bool {
        date.checked_sub_signed(Duration::days(i64::from(self.offset_days)))
            .is_some_and(|d| holidays.contains(self.kind, d))
    }
}

/// `2010`, `2010-2020`, `2010-2020/2` or `2020+`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct YearRange {
    pub from: i32,
    pub to: Option<i32>,
    pub step: u32,
    pub open_ended: bool,
}

impl YearRange {
    pub fn single(year: i32) -> Self {
        Self { from: year, to: None, step: 1, open_ended: false }
    }

    pub fn contains(&self, year: i32) -> bool {
        if year < self.from {
            return false;
        }
        let last = match (self.open_ended, self.to) {
            (true, _) => i32::MAX,
            (false, Some(to)) => to,
            (false, None) => self.from,
        };
        year <= last && (year - self.from) % self.step.max(1) as i32 == 0
    }
}

/// `week 05`, `week 01-10` or `week 01-53/2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WeekRange {
    pub from: u32,
    pub to: Option<u32>,
    pub step: u32,
}

impl WeekRange {
    /// Week numbers covered by this range; `week 50-02` wraps past the end of the year.
    pub fn numbers(&self) -> Vec<u32> {
        let to = self.to.unwrap_or(self.from);
        let step = self.step.max(1) as usize;
        let all: Vec<u32> = if self.from <= to { (self.from..=to).collect() } else { (self.from..=53).chain(1..=to).collect() };
        all.into_iter().step_by(step).collect()
    }
}

/// A date-level selector of a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeSelector {
    AlwaysOpen,
    Weekday { days: WeekdaySet },
    WeekdayOrHoliday { days: WeekdaySet, holidays: Vec<HolidayRef> },
    WeekdayInHoliday { days: WeekdaySet, holidays: Vec<HolidayRef> },
    MonthDay { ranges: Vec<MonthDayRange> },
    Week { numbers: BTreeSet<u32> },
    Year { ranges: Vec<YearRange> },
}

impl RangeSelector {
    pub fn matches(&self, date: NaiveDate, holidays: &HolidaySets) -> bool {
        match self {
            RangeSelector::AlwaysOpen => true,
            RangeSelector::Weekday { days } => days.contains_day(date.weekday()),
            RangeSelector::WeekdayOrHoliday { days, holidays: refs } => {
                days.contains_day(date.weekday()) || refs.iter().any(|h| h.matches(date, holidays))
            }
            RangeSelector::WeekdayInHoliday { days, holidays: refs } => {
                days.contains_day(date.weekday()) && refs.iter().any(|h| h.matches(date, holidays))
            }
            RangeSelector::MonthDay { ranges } => ranges.iter().any(|r| r.contains(date)),
            RangeSelector::Week { numbers } => numbers.contains(&date.iso_week().week()),
            RangeSelector::Year { ranges } => ranges.iter().any(|r| r.contains(date.year())),
        }
    }

    pub fn weight(&self) -> u32 {
        match self {
            RangeSelector::AlwaysOpen => WEIGHT_ALWAYS_OPEN,
            RangeSelector::Weekday { .. } | RangeSelector::WeekdayOrHoliday { .. } => WEIGHT_WEEKDAY,
            RangeSelector::WeekdayInHoliday { .. } => WEIGHT_WEEKDAY_IN_HOLIDAY,
            RangeSelector::MonthDay { .. } => WEIGHT_MONTHDAY,
            RangeSelector::Week { .. } => WEIGHT_WEEK,
            RangeSelector::Year { .. } => WEIGHT_YEAR,
        }
    }
}
