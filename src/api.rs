use std::collections::BTreeSet;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::debug;

use crate::engine::{
    CompileDetails, Evaluator, FieldTraits, FixedSolarHours, HolidayCalendar, HolidaySets, Location, ParsePath,
    SolarCache, SolarHours, SolarProvider,
};
use crate::error::Result;
use crate::grammar::{fast_path, parser, sanitize};
use crate::rules::{self, HolidayKind, RangeSelector, Rule, RuleStatus};
use crate::time_expr::{ComputedTimeSpan, DAY_MAX, SolarEvent};

/// Evaluation context.
///
/// Holds everything a query needs beyond the compiled field: holiday dates,
/// the facility's location and a solar provider. Solar hours are cached per
/// date for the lifetime of the context, so reuse one context across queries
/// for the same facility.
#[derive(Clone)]
pub struct Context {
    holidays: HolidaySets,
    location: Location,
    solar: Arc<dyn SolarProvider>,
    cache: SolarCache,
}

impl Default for Context {
    /// No holidays, a location at (0, 0) and no solar hours at all: fields
    /// using solar events fail with `SolarHoursUnavailable` until a provider
    /// is set.
    fn default() -> Self {
        Self {
            holidays: HolidaySets::default(),
            location: Location::default(),
            solar: Arc::new(FixedSolarHours::default()),
            cache: SolarCache::default(),
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("holidays", &self.holidays)
            .field("location", &self.location)
            .field("solar", &"<provider>")
            .field("cache", &self.cache)
            .finish()
    }
}

impl Context {
    pub fn with_public_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays = self.holidays.with_public(dates);
        self
    }

    pub fn with_school_holidays(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.holidays = self.holidays.with_school(dates);
        self
    }

    /// Replace the holiday sets with what `calendar` reports for `years`.
    pub fn with_holiday_calendar(mut self, calendar: &dyn HolidayCalendar, years: RangeInclusive<i32>) -> Self {
        self.holidays = HolidaySets::from_calendar(calendar, years);
        self
    }

    /// Changing the location drops cached solar hours.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self.cache = SolarCache::default();
        self
    }

    pub fn with_solar_provider(mut self, provider: impl SolarProvider + 'static) -> Self {
        self.solar = Arc::new(provider);
        self.cache = SolarCache::default();
        self
    }

    /// Use the same solar hours for every date.
    pub fn with_fixed_solar_hours(self, hours: SolarHours) -> Self {
        self.with_solar_provider(FixedSolarHours(hours))
    }

    pub fn holidays(&self) -> &HolidaySets {
        &self.holidays
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Solar hours for `date`, fetched from the provider at most once.
    pub fn solar_hours(&self, date: NaiveDate) -> SolarHours {
        self.cache.get_or_insert_with(date, || self.solar.solar_hours(&self.location, date))
    }
}

/// Options that affect compilation and queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Days `next_change` may walk past the starting date before giving up.
    pub max_lookahead_days: u32,
    /// Try the regex shortcut before the grammar.
    pub fast_path: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { max_lookahead_days: 366, fast_path: true }
    }
}

/// A compiled `opening_hours` field.
///
/// Immutable once built; all queries take the [`Context`] they need, so one
/// value can be shared across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpeningHours {
    field: String,
    rules: Vec<Rule>,
    options: Options,
}

impl OpeningHours {
    /// The sanitized field this value was compiled from.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Solar events any rule refers to; empty when no solar provider is needed.
    pub fn solar_events(&self) -> BTreeSet<SolarEvent> {
        self.rules.iter().flat_map(Rule::solar_events).collect()
    }

    /// Status the field gives to public and school holidays, as `(PH, SH)`.
    ///
    /// Only rules naming the holiday itself count (`PH +1 day` is another day);
    /// the last such rule wins. `None` when the field never mentions it.
    pub fn holidays_status(&self) -> (Option<RuleStatus>, Option<RuleStatus>) {
        let status_of = |kind: HolidayKind| {
            self.rules
                .iter()
                .filter(|rule| {
                    rule.range_selectors().iter().any(|selector| match selector {
                        RangeSelector::WeekdayOrHoliday { holidays, .. }
                        | RangeSelector::WeekdayInHoliday { holidays, .. } => {
                            holidays.iter().any(|h| h.kind == kind && h.offset_days == 0)
                        }
                        _ => false,
                    })
                })
                .next_back()
                .map(Rule::status)
        };
        (status_of(HolidayKind::Public), status_of(HolidayKind::School))
    }

    /// The rule that decides `date`, or `None` when no rule applies (closed all day).
    pub fn active_rule<'a>(&'a self, date: NaiveDate, context: &'a Context) -> Option<&'a Rule> {
        self.evaluator(context).active_rule(date)
    }

    pub fn is_open(&self, moment: NaiveDateTime, context: &Context) -> Result<bool> {
        self.evaluator(context).is_open(moment)
    }

    /// Like [`is_open`](Self::is_open) but keeps `unknown` apart from closed.
    pub fn state_at(&self, moment: NaiveDateTime, context: &Context) -> Result<RuleStatus> {
        self.evaluator(context).state_at(moment)
    }

    pub fn is_open_now(&self, context: &Context) -> Result<bool> {
        self.is_open(Local::now().naive_local(), context)
    }

    /// Next state change after `moment`, searching at most
    /// [`Options::max_lookahead_days`] days ahead.
    ///
    /// A change at midnight is reported as `23:59:59.999999999` of the day
    /// before (the field's `24:00`).
    pub fn next_change(&self, moment: NaiveDateTime, context: &Context) -> Result<NaiveDateTime> {
        self.next_change_within(moment, self.options.max_lookahead_days, context)
    }

    pub fn next_change_within(
        &self,
        moment: NaiveDateTime,
        max_lookahead_days: u32,
        context: &Context,
    ) -> Result<NaiveDateTime> {
        self.evaluator(context).next_change(moment, max_lookahead_days)
    }

    pub fn time_until_next_change(&self, moment: NaiveDateTime, context: &Context) -> Result<TimeDelta> {
        Ok(self.next_change(moment, context)? - moment)
    }

    /// Open periods between `start` and `end`, clipped to that window.
    ///
    /// # Example
    /// ```
    /// use chrono::NaiveDate;
    /// use ohcore::{Context, parse};
    ///
    /// let hours = parse("Mo-Fr 10:00-12:00,14:00-18:00").unwrap();
    /// let monday = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
    /// let start = monday.and_hms_opt(11, 0, 0).unwrap();
    /// let end = monday.and_hms_opt(23, 0, 0).unwrap();
    ///
    /// let periods = hours.opening_periods_between(start, end, false, &Context::default()).unwrap();
    /// assert_eq!(periods.len(), 2);
    /// assert_eq!(periods[0].beginning, start);
    /// ```
    pub fn opening_periods_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        merge: bool,
        context: &Context,
    ) -> Result<Vec<ComputedTimeSpan>> {
        self.evaluator(context).opening_periods_between(start, end, merge)
    }

    /// Open periods during `date`, including those carried over from the night before.
    pub fn day_periods(&self, date: NaiveDate, context: &Context) -> Result<Vec<ComputedTimeSpan>> {
        self.opening_periods_between(date.and_time(NaiveTime::MIN), date.and_time(DAY_MAX), true, context)
    }

    pub fn opens_on(&self, date: NaiveDate, context: &Context) -> Result<bool> {
        Ok(!self.day_periods(date, context)?.is_empty())
    }

    fn evaluator<'a>(&'a self, context: &'a Context) -> Evaluator<'a> {
        Evaluator::new(&self.rules, context)
    }
}

impl fmt::Display for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field)
    }
}

impl FromStr for OpeningHours {
    type Err = crate::Error;

    fn from_str(field: &str) -> Result<Self> {
        parse(field)
    }
}

/// Result from [`parse_verbose_with`].
#[derive(Debug, Clone)]
pub struct ParseResultVerbose {
    pub hours: OpeningHours,
    pub details: CompileDetails,
}

/// Compile `field` with default [`Options`].
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use ohcore::{Context, parse};
///
/// let hours = parse("Mo-Fr 08:00-19:00; Sa 10:00-12:00").unwrap();
/// let saturday = NaiveDate::from_ymd_opt(2018, 1, 6).unwrap();
/// assert!(hours.is_open(saturday.and_hms_opt(11, 0, 0).unwrap(), &Context::default()).unwrap());
/// ```
pub fn parse(field: &str) -> Result<OpeningHours> {
    parse_with(field, &Options::default())
}

pub fn parse_with(field: &str, options: &Options) -> Result<OpeningHours> {
    compile_field(field, options).map(|(hours, _)| hours)
}

/// Compile `field` and return timings and the path taken.
///
/// The plain [`parse_with`] path takes the same steps; the extra cost here is
/// only the clock reads.
pub fn parse_verbose_with(field: &str, options: &Options) -> Result<ParseResultVerbose> {
    let (hours, details) = compile_field(field, options)?;
    Ok(ParseResultVerbose { hours, details })
}

fn compile_field(field: &str, options: &Options) -> Result<(OpeningHours, CompileDetails)> {
    let started = Instant::now();

    let sanitized = sanitize(field)?;
    let sanitize_elapsed = started.elapsed();

    let traits = FieldTraits::scan(&sanitized);
    let parse_started = Instant::now();
    let shortcut = if options.fast_path && traits.fast_path_candidate() { fast_path::parse(&sanitized) } else { None };
    let (domain, path) = match shortcut {
        Some(domain) => (domain, ParsePath::FastPath),
        None => (parser::parse(&sanitized)?, ParsePath::Grammar),
    };
    let parse_elapsed = parse_started.elapsed();

    let compile_started = Instant::now();
    let rules = rules::compile(&domain)?;
    let compile_elapsed = compile_started.elapsed();

    debug!(field = %sanitized, ?path, rules = rules.len(), "compiled field");

    let details = CompileDetails {
        sanitized: sanitized.clone(),
        path,
        traits,
        rule_count: rules.len(),
        sanitize: sanitize_elapsed,
        parse: parse_elapsed,
        compile: compile_elapsed,
        total: started.elapsed(),
    };
    Ok((OpeningHours { field: sanitized, rules, options: options.clone() }, details))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn ctx() -> Context {
        Context::default()
    }

    fn solar_ctx() -> Context {
        let at = |h, m| NaiveTime::from_hms_opt(h, m, 0);
        Context::default().with_fixed_solar_hours(SolarHours {
            dawn: at(6, 30),
            sunrise: at(7, 0),
            sunset: at(19, 0),
            dusk: at(19, 30),
        })
    }

    fn open(field: &str, moment: NaiveDateTime) -> bool {
        parse(field).unwrap().is_open(moment, &ctx()).unwrap()
    }

    #[test]
    fn week_selector_outranks_weekday_range() {
        let field = "Mo-Fr 10:00-20:00; week 1 Mo 08:00-20:00";
        assert!(open(field, datetime!("2018-01-01 09:00")));
        assert!(!open(field, datetime!("2018-01-08 09:00")));
        assert!(open(field, datetime!("2018-01-08 10:00")));
    }

    #[test]
    fn spans_crossing_midnight_carry_into_next_day() {
        let field = "Mo-Fr 19:00-02:00";
        assert!(open(field, datetime!("2018-01-02 01:00")));
        assert!(!open(field, datetime!("2018-01-02 03:00")));
        assert!(open(field, datetime!("2018-01-01 20:00")));
        // Friday night runs into Saturday even though Saturday has no rule.
        assert!(open(field, datetime!("2018-01-06 01:30")));
        assert!(!open(field, datetime!("2018-01-01 01:00")));
    }

    #[test]
    fn always_open_needs_a_lookahead_bound() {
        let hours = parse("24/7").unwrap();
        let moment = datetime!("2018-01-01 10:00");
        assert_eq!(hours.next_change_within(moment, 0, &ctx()).unwrap(), date!("2018-01-01").and_time(DAY_MAX));
        assert_eq!(
            hours.next_change_within(moment, 366, &ctx()),
            Err(Error::NextChangeRecursion { max_lookahead_days: 366 })
        );
        assert!(hours.next_change(moment, &ctx()).is_err());
    }

    #[test]
    fn exceptional_closures() {
        let field = "08:00-19:00; May 1,Dec 25 off";
        assert!(!open(field, datetime!("2018-05-01 10:00")));
        assert!(open(field, datetime!("2018-05-02 10:00")));
        assert!(!open(field, datetime!("2018-12-25 10:00")));
    }

    #[test]
    fn month_ranges_roll_over_the_year() {
        let field = "Oct-Mar 07:30-19:30; Apr-Sep 07:00-21:00";
        assert!(open(field, datetime!("2018-12-01 12:30")));
        assert!(open(field, datetime!("2019-01-01 12:30")));
        assert!(!open(field, datetime!("2019-01-01 07:15")));
        assert!(open(field, datetime!("2019-06-01 07:15")));
    }

    #[test]
    fn rejected_fields() {
        assert_eq!(parse("closed"), Err(Error::AlwaysClosed));
        assert_eq!(parse("off"), Err(Error::AlwaysClosed));
        assert_eq!(parse("\"on appointment\""), Err(Error::CommentOnlyField));
        assert!(matches!(parse("Mo 10:00-20:00 \"call"), Err(Error::InconsistentField(_))));
        assert!(matches!(parse("Su[1] 10:00-20:00"), Err(Error::UnsupportedPattern(_))));
    }

    #[test]
    fn malformed_fields_are_parse_errors() {
        for field in ["Mo,Wx", "Pl-Mo", "(sunrise)", "(sunrise=02:00)", "(sunrise02:00)", "(sunrise+02:00"] {
            assert!(matches!(parse(field), Err(Error::Parse { .. })), "field: {field}");
        }
    }

    #[test]
    fn next_change_steps_over_full_days() {
        let hours = parse("Mo-Fr 00:00-24:00").unwrap();
        let sunday = datetime!("2018-01-07 10:00");
        assert_eq!(hours.next_change(sunday, &ctx()).unwrap(), datetime!("2018-01-08 00:00"));

        let monday = datetime!("2018-01-08 10:00");
        assert_eq!(hours.next_change(monday, &ctx()).unwrap(), date!("2018-01-12").and_time(DAY_MAX));
        assert_eq!(hours.next_change_within(monday, 0, &ctx()).unwrap(), date!("2018-01-08").and_time(DAY_MAX));
    }

    #[test]
    fn next_change_finds_closing_and_opening() {
        let hours = parse("Mo-Fr 10:00-20:00").unwrap();
        assert_eq!(hours.next_change(datetime!("2018-01-01 08:00"), &ctx()).unwrap(), datetime!("2018-01-01 10:00"));
        assert_eq!(hours.next_change(datetime!("2018-01-01 10:00"), &ctx()).unwrap(), datetime!("2018-01-01 20:00"));
        assert_eq!(hours.next_change(datetime!("2018-01-05 21:00"), &ctx()).unwrap(), datetime!("2018-01-08 10:00"));
        assert_eq!(
            hours.time_until_next_change(datetime!("2018-01-01 08:00"), &ctx()).unwrap(),
            TimeDelta::hours(2)
        );
    }

    #[test]
    fn next_change_across_midnight_span() {
        let hours = parse("Mo-Fr 19:00-02:00").unwrap();
        assert_eq!(hours.next_change(datetime!("2018-01-01 23:00"), &ctx()).unwrap(), datetime!("2018-01-02 02:00"));
        assert_eq!(hours.next_change(datetime!("2018-01-02 01:00"), &ctx()).unwrap(), datetime!("2018-01-02 02:00"));
    }

    #[test]
    fn periods_are_clipped_and_optionally_merged() {
        let hours = parse("Mo-Fr 00:00-24:00").unwrap();
        let start = datetime!("2018-01-01 12:00");
        let end = datetime!("2018-01-03 12:00");

        let split = hours.opening_periods_between(start, end, false, &ctx()).unwrap();
        assert_eq!(split.len(), 3);
        assert_eq!(split[0].beginning, start);
        assert_eq!(split[2].end, end);

        let merged = hours.opening_periods_between(start, end, true, &ctx()).unwrap();
        assert_eq!(merged.len(), 1);
        assert_eq!((merged[0].beginning, merged[0].end), (start, end));
    }

    #[test]
    fn periods_keep_gaps_separate() {
        let hours = parse("Mo 10:00-12:00,14:00-18:00").unwrap();
        let periods = hours
            .opening_periods_between(datetime!("2018-01-01 00:00"), datetime!("2018-01-02 00:00"), true, &ctx())
            .unwrap();
        let bounds: Vec<_> = periods.iter().map(|p| (p.beginning, p.end)).collect();
        assert_eq!(
            bounds,
            vec![
                (datetime!("2018-01-01 10:00"), datetime!("2018-01-01 12:00")),
                (datetime!("2018-01-01 14:00"), datetime!("2018-01-01 18:00")),
            ]
        );
        assert!(hours.opening_periods_between(datetime!("2018-01-02 00:00"), datetime!("2018-01-01 00:00"), false, &ctx()).unwrap().is_empty());
    }

    #[test]
    fn day_periods_include_carried_night() {
        let hours = parse("Fr 22:00-03:00").unwrap();
        let saturday = hours.day_periods(date!("2018-01-06"), &ctx()).unwrap();
        assert_eq!(saturday.len(), 1);
        assert_eq!(saturday[0].end, datetime!("2018-01-06 03:00"));
        assert!(hours.opens_on(date!("2018-01-05"), &ctx()).unwrap());
        assert!(!hours.opens_on(date!("2018-01-04"), &ctx()).unwrap());
    }

    #[test]
    fn holidays_override_weekdays() {
        let hours = parse("Mo-Fr 09:00-17:00; PH off").unwrap();
        let context = Context::default().with_public_holidays([date!("2018-01-01")]);
        assert!(!hours.is_open(datetime!("2018-01-01 10:00"), &context).unwrap());
        assert!(hours.is_open(datetime!("2018-01-02 10:00"), &context).unwrap());
        assert!(hours.is_open(datetime!("2018-01-01 10:00"), &ctx()).unwrap());
    }

    #[test]
    fn holiday_offsets_shift_the_closure() {
        let hours = parse("Mo-Su 10:00-20:00; PH +1 day off").unwrap();
        let context = Context::default().with_public_holidays([date!("2018-12-25")]);
        assert!(hours.is_open(datetime!("2018-12-25 12:00"), &context).unwrap());
        assert!(!hours.is_open(datetime!("2018-12-26 12:00"), &context).unwrap());
        assert!(hours.is_open(datetime!("2018-12-27 12:00"), &context).unwrap());
    }

    #[test]
    fn holidays_status_per_kind() {
        let cases = [
            ("Mo-Fr 10:00-20:00; PH off; SH 10:00-12:00", (Some(RuleStatus::Closed), Some(RuleStatus::Open))),
            ("Mo-Fr 10:00-20:00", (None, None)),
            ("Mo-Sa,PH 10:00-20:00; PH off", (Some(RuleStatus::Closed), None)),
            ("SH Mo-Fr 08:00-12:00 \"holiday hours\"", (None, Some(RuleStatus::Unknown))),
            ("Mo-Su 10:00-20:00; PH +1 day off", (None, None)),
        ];
        for (field, expected) in cases {
            assert_eq!(parse(field).unwrap().holidays_status(), expected, "field: {field}");
        }
    }

    #[test]
    fn holiday_calendar_feeds_the_context() {
        struct NewYear;
        impl HolidayCalendar for NewYear {
            fn public_holidays(&self, years: RangeInclusive<i32>) -> Vec<NaiveDate> {
                years.filter_map(|y| NaiveDate::from_ymd_opt(y, 1, 1)).collect()
            }
        }

        let hours = parse("Mo-Sa 10:00-20:00; PH 12:00-14:00").unwrap();
        let context = Context::default().with_holiday_calendar(&NewYear, 2018..=2019);
        assert!(!hours.is_open(datetime!("2019-01-01 11:00"), &context).unwrap());
        assert!(hours.is_open(datetime!("2019-01-01 13:00"), &context).unwrap());
    }

    #[test]
    fn fallback_applies_only_when_nothing_else_matches() {
        let hours = parse("Mo-Fr 10:00-18:00 || \"by appointment\"").unwrap();
        assert_eq!(hours.state_at(datetime!("2018-01-01 12:00"), &ctx()).unwrap(), RuleStatus::Open);
        assert_eq!(hours.state_at(datetime!("2018-01-01 09:00"), &ctx()).unwrap(), RuleStatus::Closed);
        assert_eq!(hours.state_at(datetime!("2018-01-06 12:00"), &ctx()).unwrap(), RuleStatus::Unknown);
        assert!(!hours.is_open(datetime!("2018-01-06 12:00"), &ctx()).unwrap());
    }

    #[test]
    fn solar_fields_use_the_provider() {
        let hours = parse("sunrise-sunset").unwrap();
        assert_eq!(hours.solar_events(), BTreeSet::from([SolarEvent::Sunrise, SolarEvent::Sunset]));
        assert!(hours.is_open(datetime!("2018-06-01 12:00"), &solar_ctx()).unwrap());
        assert!(!hours.is_open(datetime!("2018-06-01 06:45"), &solar_ctx()).unwrap());
        assert_eq!(
            hours.next_change(datetime!("2018-06-01 12:00"), &solar_ctx()).unwrap(),
            datetime!("2018-06-01 19:00")
        );

        let err = hours.is_open(datetime!("2018-06-01 12:00"), &ctx()).unwrap_err();
        assert!(matches!(err, Error::SolarHoursUnavailable { event: SolarEvent::Sunrise, .. }));
    }

    #[test]
    fn solar_offsets_and_night_spans() {
        let hours = parse("(sunrise+01:00)-(sunset-01:00)").unwrap();
        assert!(!hours.is_open(datetime!("2018-06-01 07:30"), &solar_ctx()).unwrap());
        assert!(hours.is_open(datetime!("2018-06-01 08:00"), &solar_ctx()).unwrap());
        assert!(!hours.is_open(datetime!("2018-06-01 18:30"), &solar_ctx()).unwrap());

        let night = parse("sunset-sunrise").unwrap();
        assert!(night.is_open(datetime!("2018-06-02 05:00"), &solar_ctx()).unwrap());
        assert!(night.is_open(datetime!("2018-06-01 22:00"), &solar_ctx()).unwrap());
        assert!(!night.is_open(datetime!("2018-06-01 12:00"), &solar_ctx()).unwrap());
    }

    #[test]
    fn active_rule_exposes_specificity() {
        let hours = parse("Mo-Fr 10:00-20:00; Dec 24 10:00-14:00").unwrap();
        let context = ctx();
        let rule = hours.active_rule(date!("2018-12-24"), &context).unwrap();
        assert_eq!(rule.index(), 1);
        assert_eq!(rule.specificity(), 5);
        assert!(hours.active_rule(date!("2018-12-23"), &context).is_none());
    }

    #[test]
    fn sanitized_field_round_trips_through_display() {
        let hours: OpeningHours = "mo-fr 10:00-20:00".parse().unwrap();
        assert_eq!(hours.to_string(), "Mo-Fr 10:00-20:00");
        assert_eq!(parse(&hours.to_string()).unwrap(), hours);
    }

    #[test]
    fn verbose_parse_reports_path() {
        let fast = parse_verbose_with("Mo-Fr 10:00-20:00", &Options::default()).unwrap();
        assert_eq!(fast.details.path, ParsePath::FastPath);
        assert_eq!(fast.details.rule_count, 1);
        assert!(fast.details.sanitize <= fast.details.total);

        let slow = parse_verbose_with("Mo-Fr 10:00-20:00", &Options { fast_path: false, ..Options::default() }).unwrap();
        assert_eq!(slow.details.path, ParsePath::Grammar);
        assert_eq!(slow.hours, fast.hours);

        let grammar = parse_verbose_with("Jan-Mar Mo 10:00-12:00", &Options::default()).unwrap();
        assert_eq!(grammar.details.path, ParsePath::Grammar);
        assert!(grammar.details.traits.contains(FieldTraits::MONTHISH));
    }

    #[test]
    fn missing_leap_day_closes_nothing() {
        let field = "Mo-Su 10:00-20:00; Feb 29 off";
        assert!(open(field, datetime!("2019-02-28 12:00")));
        assert!(open(field, datetime!("2019-03-01 12:00")));
        assert!(!open(field, datetime!("2020-02-29 12:00")));
    }

    #[test]
    fn year_range_closures_survive_sanitizing() {
        let hours = parse("Mo-Fr 10:00-20:00; 2020-2021 off").unwrap();
        assert_eq!(hours.field(), "Mo-Fr 10:00-20:00; 2020-2021 off");
        assert!(!hours.is_open(datetime!("2020-06-01 12:00"), &ctx()).unwrap());
        assert!(hours.is_open(datetime!("2019-06-03 12:00"), &ctx()).unwrap());
    }

    #[test]
    fn lookalike_letters_are_rejected() {
        assert!(matches!(parse("\u{17f}u 10:00-12:00"), Err(Error::Parse { .. })));
    }

    #[test]
    fn last_instant_of_the_day() {
        let end_of_day = date!("2018-01-01").and_time(DAY_MAX);
        assert!(open("24/7", end_of_day));
        assert!(open("Mo 20:00-24:00", end_of_day));
        assert!(open("Mo 22:00-02:00", end_of_day));
        assert!(!open("Mo 10:00-20:00", end_of_day));
    }

    #[test]
    fn values_are_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OpeningHours>();
        assert_send_sync::<Context>();

        let hours = parse("Mo-Fr 10:00-20:00; PH off").unwrap();
        let context = Context::default().with_public_holidays([date!("2018-01-01")]);
        let answers: Vec<bool> = std::thread::scope(|scope| {
            let workers: Vec<_> = [datetime!("2018-01-01 12:00"), datetime!("2018-01-02 12:00")]
                .into_iter()
                .map(|moment| {
                    let (hours, context) = (&hours, &context);
                    scope.spawn(move || hours.is_open(moment, context).unwrap())
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });
        assert_eq!(answers, vec![false, true]);
    }

    #[test]
    fn context_caches_solar_hours() {
        let context = solar_ctx();
        let hours = parse("sunrise-sunset").unwrap();
        for h in 8..12 {
            hours.is_open(date!("2018-06-01").and_hms_opt(h, 0, 0).unwrap(), &context).unwrap();
        }
        assert_eq!(context.solar_hours(date!("2018-06-01")).sunset, NaiveTime::from_hms_opt(19, 0, 0));
        assert!(format!("{context:?}").contains("SolarCache"));
    }
}
