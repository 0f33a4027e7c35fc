//! Compiled rules.
//!
//! A field compiles to an ordered `Vec<Rule>`. Each rule pairs a set of range
//! selectors (which dates it applies to) with a list of time spans (when on
//! those dates) and a status. Rules never change after compilation; anything
//! that varies per query (holidays, solar hours) is supplied by the caller.
//!
//! ```text
//! TimeDomain ──▶ compile (compile.rs) ──▶ Vec<Rule>
//!                                         │
//!                       RangeSelector::matches (selectors.rs, monthday.rs)
//! ```

#[path = "rules/calendar.rs"]
mod calendar;
#[path = "rules/compile.rs"]
mod compile;
#[path = "rules/monthday.rs"]
mod monthday;
#[path = "rules/selectors.rs"]
mod selectors;

#[cfg(test)]
#[path = "rules/tests.rs"]
mod tests;

use std::fmt;

pub use calendar::easter_date;
pub(crate) use compile::compile;
pub use monthday::{MonthDayDate, MonthDayKind, MonthDayRange};
pub use selectors::{HolidayKind, HolidayRef, RangeSelector, WeekRange, WeekdaySet, YearRange};

use crate::engine::HolidaySets;
use crate::time_expr::{SolarEvent, Time, TimeSpan};
use chrono::NaiveDate;

/// What a rule says about the spans it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleStatus {
    Open,
    Closed,
    Unknown,
}

impl fmt::Display for RuleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RuleStatus::Open => "open",
            RuleStatus::Closed => "closed",
            RuleStatus::Unknown => "unknown",
        })
    }
}

/// One compiled selector sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub(crate) range_selectors: Vec<RangeSelector>,
    pub(crate) time_selectors: Vec<TimeSpan>,
    pub(crate) status: RuleStatus,
    pub(crate) comment: Option<String>,
    pub(crate) specificity: u32,
    /// Declaration order across the whole field.
    pub(crate) index: usize,
    /// `;`-separated group this rule belongs to.
    pub(crate) group: usize,
    /// Position of the `||` alternative inside `group`.
    pub(crate) member: usize,
}

impl Rule {
    pub fn range_selectors(&self) -> &[RangeSelector] {
        &self.range_selectors
    }

    pub fn time_selectors(&self) -> &[TimeSpan] {
        &self.time_selectors
    }

    pub fn status(&self) -> RuleStatus {
        self.status
    }

    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Sum of the selector weights; the highest value wins on a given date.
    pub fn specificity(&self) -> u32 {
        self.specificity
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn group(&self) -> usize {
        self.group
    }

    /// True when every range selector accepts `date`.
    pub fn matches(&self, date: NaiveDate, holidays: &HolidaySets) -> bool {
        self.range_selectors.iter().all(|s| s.matches(date, holidays))
    }

    pub(crate) fn solar_events(&self) -> impl Iterator<Item = SolarEvent> + '_ {
        self.time_selectors.iter().flat_map(|span| [span.beginning, span.end]).filter_map(|t| match t {
            Time::Solar { event, .. } => Some(event),
            Time::Fixed(_) => None,
        })
    }
}
