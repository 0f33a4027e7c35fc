//! Recursive-descent parser over the token stream.
//!
//! ```text
//! time_domain       := fallback_group (';' fallback_group)* [';']
//! fallback_group    := rule_sequence ('||' rule_sequence)*
//! rule_sequence     := selector_sequence (',' selector_sequence)*
//! selector_sequence := '24/7' [modifier]
//!                    | [year] [monthday] [week] [':'] [weekday] [time] [modifier]
//! ```
//!
//! Commas are overloaded: inside a selector they separate list entries, and
//! between selector sequences they start an additional rule. Each list parser
//! only takes a comma when the token after it continues that list, so any
//! comma left over separates rules.

use chrono::{Duration, NaiveTime};

use super::lexer::{Token, TokenKind, tokenize};
use crate::error::{Error, Result};
use crate::rules::{HolidayRef, MonthDayDate, MonthDayKind, MonthDayRange, WeekRange, YearRange};
use crate::syntax::{
    FallbackGroup, RuleModifier, RuleSequence, SelectorSequence, TimeDomain, WeekdayRange, WeekdaySelector,
};
use crate::time_expr::{DAY_MAX, Time, TimeSpan};

pub(crate) fn parse(input: &str) -> Result<TimeDomain> {
    let tokens = tokenize(input)?;
    Parser { input, tokens, pos: 0 }.time_domain()
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    // --- Cursor ----------------------------------------------------------------

    fn peek(&self) -> Option<&TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<TokenKind> {
        let kind = self.tokens.get(self.pos).map(|t| t.kind.clone());
        if kind.is_some() {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == Some(kind) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn error(&self, message: &str) -> Error {
        match self.tokens.get(self.pos) {
            Some(token) => Error::parse(token.start + 1, &self.input[token.start..token.end], message),
            None => Error::parse(self.input.len() + 1, "", message),
        }
    }

    fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<()> {
        if self.eat(kind) { Ok(()) } else { Err(self.error(message)) }
    }

    // --- Structure ---------------------------------------------------------------

    fn time_domain(mut self) -> Result<TimeDomain> {
        let mut domain = TimeDomain::default();
        loop {
            domain.groups.push(self.fallback_group()?);
            if self.eat(&TokenKind::Semicolon) {
                if self.at_end() {
                    break;
                }
                continue;
            }
            if self.at_end() {
                break;
            }
            return Err(self.error("unexpected token"));
        }
        Ok(domain)
    }

    fn fallback_group(&mut self) -> Result<FallbackGroup> {
        let mut group = FallbackGroup { members: vec![self.rule_sequence()?] };
        while self.eat(&TokenKind::Fallback) {
            group.members.push(self.rule_sequence()?);
        }
        Ok(group)
    }

    fn rule_sequence(&mut self) -> Result<RuleSequence> {
        let mut sequence = RuleSequence { selectors: vec![self.selector_sequence()?] };
        while self.eat(&TokenKind::Comma) {
            sequence.selectors.push(self.selector_sequence()?);
        }
        Ok(sequence)
    }

    fn selector_sequence(&mut self) -> Result<SelectorSequence> {
        let mut sequence = SelectorSequence::default();

        if self.eat(&TokenKind::AlwaysOpen) {
            sequence.always_open = true;
            sequence.modifier = self.rule_modifier()?;
            return Ok(sequence);
        }

        if self.starts_year() {
            sequence.years = self.year_selector()?;
        }
        if self.starts_monthday() {
            sequence.monthdays = self.monthday_selector()?;
        }
        if self.peek() == Some(&TokenKind::Week) {
            sequence.weeks = self.week_selector()?;
        }
        let has_wide = !sequence.years.is_empty() || !sequence.monthdays.is_empty() || !sequence.weeks.is_empty();
        if has_wide {
            self.eat(&TokenKind::Colon);
        }

        if matches!(self.peek(), Some(TokenKind::Weekday(_) | TokenKind::Holiday(_))) {
            sequence.weekdays = Some(self.weekday_selector()?);
        }
        if self.starts_time() {
            sequence.times = self.time_selector()?;
        }
        if matches!(self.peek(), Some(TokenKind::Comment(_))) && self.peek_at(1) == Some(&TokenKind::Colon) {
            return Err(Error::unsupported("a comment used as a selector (\"comment\": times)"));
        }
        sequence.modifier = self.rule_modifier()?;

        if !sequence.has_range_selectors() && sequence.times.is_empty() && sequence.modifier.is_none() {
            return Err(self.error("expected a selector, a time span or a rule modifier"));
        }
        Ok(sequence)
    }

    fn rule_modifier(&mut self) -> Result<Option<RuleModifier>> {
        let status = match self.peek() {
            Some(TokenKind::Status(status)) => {
                let status = *status;
                self.pos += 1;
                Some(status)
            }
            _ => None,
        };
        let comment = match self.peek() {
            Some(TokenKind::Comment(text)) => {
                let text = text.clone();
                self.pos += 1;
                Some(text)
            }
            _ => None,
        };
        if status.is_none() && comment.is_none() {
            return Ok(None);
        }
        Ok(Some(RuleModifier { status, comment }))
    }

    // --- Years ------------------------------------------------------------------

    fn is_year_at(&self, offset: usize) -> bool {
        matches!(self.peek_at(offset), Some(TokenKind::Number { digits: 4, .. }))
    }

    /// A four-digit number starts a year selector unless it qualifies a date (`2020 Jan 05`).
    fn starts_year(&self) -> bool {
        self.is_year_at(0) && !matches!(self.peek_at(1), Some(TokenKind::Month(_) | TokenKind::Easter))
    }

    fn year_selector(&mut self) -> Result<Vec<YearRange>> {
        let mut ranges = vec![self.year_range()?];
        while self.peek() == Some(&TokenKind::Comma) && self.is_year_at(1) {
            self.pos += 1;
            ranges.push(self.year_range()?);
        }
        Ok(ranges)
    }

    fn year_range(&mut self) -> Result<YearRange> {
        let from = self.year()?;
        let mut range = YearRange::single(from);
        if self.eat(&TokenKind::Plus) {
            range.open_ended = true;
            return Ok(range);
        }
        if self.peek() == Some(&TokenKind::Dash) && self.is_year_at(1) {
            self.pos += 1;
            let to = self.year()?;
            if to < from {
                return Err(self.error("year range ends before it starts"));
            }
            range.to = Some(to);
            if self.eat(&TokenKind::Slash) {
                range.step = self.small_number("year step")?;
            }
        }
        Ok(range)
    }

    fn year(&mut self) -> Result<i32> {
        match self.peek() {
            Some(TokenKind::Number { value, digits: 4 }) => {
                let value = *value as i32;
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error("expected a year")),
        }
    }

    fn small_number(&mut self, what: &str) -> Result<u32> {
        match self.peek() {
            Some(TokenKind::Number { value, digits }) if *digits <= 2 && *value > 0 => {
                let value = *value;
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error(&format!("expected {what}"))),
        }
    }

    // --- Month/day --------------------------------------------------------------

    fn starts_monthday(&self) -> bool {
        match self.peek() {
            Some(TokenKind::Month(_) | TokenKind::Easter) => true,
            Some(TokenKind::Number { digits: 4, .. }) => {
                matches!(self.peek_at(1), Some(TokenKind::Month(_) | TokenKind::Easter))
            }
            _ => false,
        }
    }

    fn monthday_selector(&mut self) -> Result<Vec<MonthDayRange>> {
        let mut ranges = vec![self.monthday_range()?];
        while self.peek() == Some(&TokenKind::Comma) {
            self.pos += 1;
            if !self.starts_monthday() {
                self.pos -= 1;
                break;
            }
            ranges.push(self.monthday_range()?);
        }
        Ok(ranges)
    }

    fn monthday_range(&mut self) -> Result<MonthDayRange> {
        let mut from = self.date()?;
        self.reject_date_suffix()?;

        if self.peek() != Some(&TokenKind::Dash) {
            return Ok(MonthDayRange::single(from));
        }

        // `Jan 05-10`: a bare day after the dash stays within the month.
        if from.kind == MonthDayKind::MonthDay && self.is_day_at(1) {
            self.pos += 1;
            from.kind = MonthDayKind::MonthDayRange;
            from.day_to = Some(self.day()?);
            self.reject_date_suffix()?;
            return Ok(MonthDayRange::single(from));
        }

        if !matches!(self.peek_at(1), Some(TokenKind::Month(_) | TokenKind::Easter | TokenKind::Number { digits: 4, .. })) {
            return Err(self.error("expected a date after '-'"));
        }
        self.pos += 1;
        let to = self.date()?;
        self.reject_date_suffix()?;
        Ok(MonthDayRange { from, to: Some(to) })
    }

    fn date(&mut self) -> Result<MonthDayDate> {
        let year = if self.is_year_at(0) { Some(self.year()?) } else { None };
        match self.peek() {
            Some(TokenKind::Easter) => {
                self.pos += 1;
                Ok(MonthDayDate::easter(year))
            }
            Some(TokenKind::Month(month)) => {
                let month = *month;
                self.pos += 1;
                if self.is_day_at(0) {
                    let day = self.day()?;
                    return Ok(MonthDayDate::month_day(year, month, day));
                }
                Ok(MonthDayDate::month(year, month))
            }
            _ => Err(self.error("expected a month or 'easter'")),
        }
    }

    /// A one or two digit number that is not the start of a day offset (`+1 day`).
    fn is_day_at(&self, offset: usize) -> bool {
        matches!(self.peek_at(offset), Some(TokenKind::Number { digits: 1 | 2, .. }))
            && self.peek_at(offset + 1) != Some(&TokenKind::Day)
    }

    fn day(&mut self) -> Result<u32> {
        match self.peek() {
            Some(TokenKind::Number { value, digits: 1 | 2 }) if (1..=31).contains(value) => {
                let value = *value;
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error("expected a day of month (1-31)")),
        }
    }

    /// `Dec 25+` and `easter +1 day` are valid syntax this engine does not evaluate.
    fn reject_date_suffix(&self) -> Result<()> {
        let offset_follows =
            matches!(self.peek_at(1), Some(TokenKind::Number { .. })) && self.peek_at(2) == Some(&TokenKind::Day);
        match self.peek() {
            Some(TokenKind::Plus | TokenKind::Dash) if offset_follows => Err(Error::unsupported("date offsets")),
            Some(TokenKind::Plus) => Err(Error::unsupported("open-ended dates (date+)")),
            _ => Ok(()),
        }
    }

    // --- Weeks ------------------------------------------------------------------

    fn week_selector(&mut self) -> Result<Vec<WeekRange>> {
        self.expect(&TokenKind::Week, "expected 'week'")?;
        let mut ranges = vec![self.week_range()?];
        while self.peek() == Some(&TokenKind::Comma)
            && matches!(self.peek_at(1), Some(TokenKind::Number { digits: 1 | 2, .. }))
        {
            self.pos += 1;
            ranges.push(self.week_range()?);
        }
        Ok(ranges)
    }

    fn week_range(&mut self) -> Result<WeekRange> {
        let from = self.week_number()?;
        let mut range = WeekRange { from, to: None, step: 1 };
        if self.eat(&TokenKind::Dash) {
            range.to = Some(self.week_number()?);
            if self.eat(&TokenKind::Slash) {
                range.step = self.small_number("week step")?;
            }
        }
        Ok(range)
    }

    fn week_number(&mut self) -> Result<u32> {
        match self.peek() {
            Some(TokenKind::Number { value, digits: 1 | 2 }) if (1..=53).contains(value) => {
                let value = *value;
                self.pos += 1;
                Ok(value)
            }
            _ => Err(self.error("expected a week number (1-53)")),
        }
    }

    // --- Weekdays and holidays --------------------------------------------------

    fn weekday_selector(&mut self) -> Result<WeekdaySelector> {
        let (weekdays, holidays) = self.weekday_or_holiday_list()?;

        // `SH Mo-Fr`: holidays followed by weekdays without a comma.
        if weekdays.is_empty() && matches!(self.peek(), Some(TokenKind::Weekday(_))) {
            let (inner, extra) = self.weekday_or_holiday_list()?;
            if !extra.is_empty() {
                return Err(self.error("holidays must come first in '<holiday> <weekday>'"));
            }
            return Ok(WeekdaySelector::WeekdaysInHolidays { weekdays: inner, holidays });
        }

        Ok(match (weekdays.is_empty(), holidays.is_empty()) {
            (false, true) => WeekdaySelector::Weekdays(weekdays),
            (true, false) => WeekdaySelector::Holidays(holidays),
            _ => WeekdaySelector::WeekdaysOrHolidays { weekdays, holidays },
        })
    }

    fn weekday_or_holiday_list(&mut self) -> Result<(Vec<WeekdayRange>, Vec<HolidayRef>)> {
        let mut weekdays = Vec::new();
        let mut holidays = Vec::new();
        loop {
            match self.peek() {
                Some(TokenKind::Weekday(_)) => weekdays.push(self.weekday_range()?),
                Some(TokenKind::Holiday(_)) => holidays.push(self.holiday()?),
                _ => return Err(self.error("expected a weekday or a holiday")),
            }
            let continues = matches!(self.peek_at(1), Some(TokenKind::Weekday(_) | TokenKind::Holiday(_)));
            if self.peek() == Some(&TokenKind::Comma) && continues {
                self.pos += 1;
                continue;
            }
            return Ok((weekdays, holidays));
        }
    }

    fn weekday_range(&mut self) -> Result<WeekdayRange> {
        let from = self.weekday()?;
        if self.peek() == Some(&TokenKind::LBracket) {
            return Err(Error::unsupported("nth weekday of the month (Su[1])"));
        }
        if self.peek() == Some(&TokenKind::Dash) && matches!(self.peek_at(1), Some(TokenKind::Weekday(_))) {
            self.pos += 1;
            let to = self.weekday()?;
            return Ok(WeekdayRange { from, to });
        }
        Ok(WeekdayRange::single(from))
    }

    fn weekday(&mut self) -> Result<chrono::Weekday> {
        match self.peek() {
            Some(TokenKind::Weekday(day)) => {
                let day = *day;
                self.pos += 1;
                Ok(day)
            }
            _ => Err(self.error("expected a weekday")),
        }
    }

    fn holiday(&mut self) -> Result<HolidayRef> {
        let kind = match self.peek() {
            Some(TokenKind::Holiday(kind)) => *kind,
            _ => return Err(self.error("expected PH or SH")),
        };
        self.pos += 1;
        let mut holiday = HolidayRef::new(kind);
        let sign = match (self.peek(), self.peek_at(2)) {
            (Some(TokenKind::Plus), Some(TokenKind::Day)) => 1,
            (Some(TokenKind::Dash), Some(TokenKind::Day)) => -1,
            _ => return Ok(holiday),
        };
        self.pos += 1;
        let days = match self.peek() {
            Some(TokenKind::Number { value, .. }) => i32::try_from(*value).ok(),
            _ => return Err(self.error("expected a number of days")),
        };
        holiday.offset_days = match days {
            Some(days) => sign * days,
            None => return Err(self.error("holiday offset out of range")),
        };
        self.pos += 2;
        Ok(holiday)
    }

    // --- Times ------------------------------------------------------------------

    fn starts_time(&self) -> bool {
        matches!(self.peek(), Some(TokenKind::Clock { .. } | TokenKind::Event(_) | TokenKind::LParen))
    }

    fn time_selector(&mut self) -> Result<Vec<TimeSpan>> {
        let mut spans = vec![self.timespan()?];
        while self.peek() == Some(&TokenKind::Comma)
            && matches!(self.peek_at(1), Some(TokenKind::Clock { .. } | TokenKind::Event(_) | TokenKind::LParen))
        {
            self.pos += 1;
            spans.push(self.timespan()?);
        }
        Ok(spans)
    }

    fn timespan(&mut self) -> Result<TimeSpan> {
        let beginning = self.time()?;
        if beginning == Time::Fixed(DAY_MAX) {
            return Err(Error::parse(self.column_before(), "24:00", "a time span cannot start at 24:00"));
        }
        if !self.eat(&TokenKind::Dash) {
            if self.peek() == Some(&TokenKind::Plus) {
                return Err(Error::unsupported("open-ended time spans (time+)"));
            }
            return Err(Error::unsupported("points in time"));
        }
        let end = self.time()?;
        match self.peek() {
            Some(TokenKind::Plus) => return Err(Error::unsupported("open-ended time spans (time+)")),
            Some(TokenKind::Slash) => return Err(Error::unsupported("periodic points in time (time/interval)")),
            _ => {}
        }
        if beginning == end {
            return Err(Error::unsupported("points in time (zero-length time spans)"));
        }
        Ok(TimeSpan::new(beginning, end))
    }

    fn column_before(&self) -> usize {
        self.tokens.get(self.pos.saturating_sub(1)).map_or(1, |t| t.start + 1)
    }

    fn time(&mut self) -> Result<Time> {
        match self.peek().cloned() {
            Some(TokenKind::Clock { hour, minute }) => {
                let time = match (hour, minute) {
                    (24, 0) => Some(DAY_MAX),
                    (h, m) => NaiveTime::from_hms_opt(h, m, 0),
                };
                let time = time.ok_or_else(|| self.error("invalid time of day"))?;
                self.pos += 1;
                Ok(Time::Fixed(time))
            }
            Some(TokenKind::Event(event)) => {
                self.pos += 1;
                Ok(Time::solar(event))
            }
            Some(TokenKind::LParen) => {
                self.pos += 1;
                let event = match self.peek() {
                    Some(TokenKind::Event(event)) => *event,
                    _ => return Err(self.error("expected sunrise, sunset, dawn or dusk")),
                };
                self.pos += 1;
                let sign = match self.peek() {
                    Some(TokenKind::Plus) => 1,
                    Some(TokenKind::Dash) => -1,
                    _ => return Err(self.error("expected '+' or '-' after the solar event")),
                };
                self.pos += 1;
                let offset = match self.peek() {
                    Some(TokenKind::Clock { hour, minute }) if *minute < 60 => {
                        Duration::minutes(i64::from(*hour) * 60 + i64::from(*minute))
                    }
                    _ => return Err(self.error("expected an hh:mm offset")),
                };
                self.pos += 1;
                self.expect(&TokenKind::RParen, "expected ')'")?;
                Ok(Time::Solar { event, offset: offset * sign })
            }
            _ => Err(self.error("expected a time")),
        }
    }
}
