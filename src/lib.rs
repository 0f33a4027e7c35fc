//! Interpreter for the OpenStreetMap `opening_hours` field.
//!
//! A field is sanitized, parsed and compiled once into an [`OpeningHours`]
//! value, which then answers temporal queries given a [`Context`] carrying
//! holiday dates and solar hours:
//!
//! ```
//! use chrono::NaiveDate;
//! use ohcore::{Context, parse};
//!
//! let hours = parse("Mo-Fr 19:00-02:00").unwrap();
//! let tuesday = NaiveDate::from_ymd_opt(2018, 1, 2).unwrap();
//! let ctx = Context::default();
//!
//! assert!(hours.is_open(tuesday.and_hms_opt(1, 0, 0).unwrap(), &ctx).unwrap());
//! assert!(!hours.is_open(tuesday.and_hms_opt(3, 0, 0).unwrap(), &ctx).unwrap());
//! ```

#[macro_use]
mod macros;
mod api;
mod engine;
mod error;
mod grammar;
mod rules;
mod syntax;
mod time_expr;


pub use api::{Context, OpeningHours, Options, ParseResultVerbose, parse, parse_verbose_with, parse_with};
pub use engine::{
    CompileDetails, FieldTraits, FixedSolarHours, HolidayCalendar, HolidaySets, Location, ParsePath, SolarHours,
    SolarProvider,
};
pub use error::{Error, Result};
pub use grammar::sanitize;
pub use rules::{
    HolidayKind, HolidayRef, MonthDayDate, MonthDayKind, MonthDayRange, RangeSelector, Rule, RuleStatus, WeekRange,
    WeekdaySet, YearRange, easter_date,
};
pub use time_expr::{ComputedTimeSpan, DAY_MAX, SolarEvent, Time, TimeSpan};
