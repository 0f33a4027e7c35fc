//! Time values used by rules: clock or solar endpoints, the spans built from
//! them and the concrete datetime spans they resolve to for a given date.

use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::engine::SolarHours;
use crate::error::{Error, Result};
use crate::rules::RuleStatus;

/// Last representable instant of a day. `24:00` in a field maps here, so a
/// span ending at midnight stays on the same calendar date.
pub const DAY_MAX: NaiveTime = match NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999) {
    Some(t) => t,
    None => panic!("invalid end-of-day time"),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SolarEvent {
    Dawn,
    Sunrise,
    Sunset,
    Dusk,
}

impl SolarEvent {
    pub const ALL: [SolarEvent; 4] = [SolarEvent::Dawn, SolarEvent::Sunrise, SolarEvent::Sunset, SolarEvent::Dusk];

    pub fn name(self) -> &'static str {
        match self {
            SolarEvent::Dawn => "dawn",
            SolarEvent::Sunrise => "sunrise",
            SolarEvent::Sunset => "sunset",
            SolarEvent::Dusk => "dusk",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        SolarEvent::ALL.into_iter().find(|e| e.name() == name)
    }

    /// Sunset and dusk happen at the end of the day.
    pub(crate) fn is_evening(self) -> bool {
        matches!(self, SolarEvent::Sunset | SolarEvent::Dusk)
    }
}

impl fmt::Display for SolarEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A span endpoint: a wall-clock time or a solar event shifted by a signed offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Time {
    Fixed(NaiveTime),
    Solar { event: SolarEvent, offset: Duration },
}

impl Time {
    pub fn solar(event: SolarEvent) -> Self {
        Time::Solar { event, offset: Duration::zero() }
    }

    pub fn is_solar(&self) -> bool {
        matches!(self, Time::Solar { .. })
    }

    /// Resolve against `date`, reading solar events from `hours`.
    pub fn get_time(&self, date: NaiveDate, hours: &SolarHours) -> Result<NaiveDateTime> {
        match *self {
            Time::Fixed(t) => Ok(date.and_time(t)),
            Time::Solar { event, offset } => {
                let t = hours.get(event).ok_or(Error::SolarHoursUnavailable { date, event })?;
                Ok(date.and_time(t) + offset)
            }
        }
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Time::Fixed(t) if t == DAY_MAX => f.write_str("24:00"),
            Time::Fixed(t) => write!(f, "{:02}:{:02}", t.hour(), t.minute()),
            Time::Solar { event, offset } if offset.is_zero() => write!(f, "{event}"),
            Time::Solar { event, offset } => {
                let sign = if offset < Duration::zero() { '-' } else { '+' };
                let minutes = offset.num_minutes().abs();
                write!(f, "({event}{sign}{:02}:{:02})", minutes / 60, minutes % 60)
            }
        }
    }
}

/// A `beginning-end` pair as written in a time selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeSpan {
    pub beginning: Time,
    pub end: Time,
}

impl TimeSpan {
    pub fn new(beginning: Time, end: Time) -> Self {
        Self { beginning, end }
    }

    /// The whole day, `00:00-24:00`.
    pub fn full_day() -> Self {
        Self::new(Time::Fixed(NaiveTime::MIN), Time::Fixed(DAY_MAX))
    }

    /// True when the span ends on the following calendar day.
    ///
    /// Clock spans cross midnight when the end is not after the beginning;
    /// solar spans cross when they run from an evening event to a morning one.
    /// Mixed spans are decided once resolved, see [`TimeSpan::compute`].
    pub fn spans_midnight(&self) -> bool {
        match (self.beginning, self.end) {
            (Time::Fixed(b), Time::Fixed(e)) => e <= b,
            (Time::Solar { event: b, .. }, Time::Solar { event: e, .. }) => b.is_evening() && !e.is_evening(),
            _ => false,
        }
    }

    pub fn uses_solar(&self) -> bool {
        self.beginning.is_solar() || self.end.is_solar()
    }

    /// Resolve this span for `date`. The end moves to the next day when the
    /// span crosses midnight.
    pub fn compute(&self, date: NaiveDate, hours: &SolarHours, status: RuleStatus) -> Result<ComputedTimeSpan> {
        let beginning = self.beginning.get_time(date, hours)?;
        let mut end = self.end.get_time(date, hours)?;
        if self.spans_midnight() || end <= beginning {
            end += Duration::days(1);
        }
        Ok(ComputedTimeSpan { beginning, end, status })
    }
}

impl fmt::Display for TimeSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.beginning, self.end)
    }
}

/// A span resolved to concrete datetimes.
///
/// Containment is half-open, except that an end at [`DAY_MAX`] stands for
/// `24:00` and includes the last instant of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComputedTimeSpan {
    pub beginning: NaiveDateTime,
    pub end: NaiveDateTime,
    pub status: RuleStatus,
}

impl ComputedTimeSpan {
    pub fn contains(&self, moment: NaiveDateTime) -> bool {
        self.beginning <= moment && (moment < self.end || (moment == self.end && self.end.time() == DAY_MAX))
    }

    pub fn duration(&self) -> Duration {
        self.end - self.beginning
    }

    /// True when `next` starts where this span stops, counting a `24:00` end
    /// followed by `00:00` on the next day as touching.
    pub(crate) fn touches(&self, next: &ComputedTimeSpan) -> bool {
        if next.beginning <= self.end {
            return true;
        }
        self.end.time() == DAY_MAX
            && next.beginning.time() == NaiveTime::MIN
            && self.end.date().succ_opt() == Some(next.beginning.date())
    }
}
