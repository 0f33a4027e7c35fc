//! Regex shortcut for the most common field shapes.
//!
//! Recognizes, per `;`-part: `Mo off`, `Mo 10:00-20:00`, `Mo-Fr 10:00-20:00`
//! and a bare `10:00-20:00`, plus the frequent whole fields `24/7`,
//! `sunrise-sunset` and `sunset-sunrise`. If any part falls outside these
//! shapes the whole field is left to the grammar. The tree built here must be
//! exactly the one the grammar would build.

use chrono::{NaiveTime, Weekday};

use crate::rules::RuleStatus;
use crate::syntax::{
    FallbackGroup, RuleModifier, RuleSequence, SelectorSequence, TimeDomain, WeekdayRange, WeekdaySelector,
};
use crate::time_expr::{DAY_MAX, SolarEvent, Time, TimeSpan};

pub(crate) fn parse(field: &str) -> Option<TimeDomain> {
    if let Some(sequence) = frequent_field(field) {
        return Some(domain(vec![sequence]));
    }

    let mut sequences = Vec::new();
    for part in field.split(';').map(str::trim) {
        sequences.push(simple_part(part)?);
    }
    Some(domain(sequences))
}

fn domain(sequences: Vec<SelectorSequence>) -> TimeDomain {
    let groups = sequences
        .into_iter()
        .map(|s| FallbackGroup { members: vec![RuleSequence { selectors: vec![s] }] })
        .collect();
    TimeDomain { groups }
}

fn frequent_field(field: &str) -> Option<SelectorSequence> {
    let solar = |from, to| SelectorSequence {
        times: vec![TimeSpan::new(Time::solar(from), Time::solar(to))],
        ..SelectorSequence::default()
    };
    match field {
        "24/7" => Some(SelectorSequence { always_open: true, ..SelectorSequence::default() }),
        "sunrise-sunset" => Some(solar(SolarEvent::Sunrise, SolarEvent::Sunset)),
        "sunset-sunrise" => Some(solar(SolarEvent::Sunset, SolarEvent::Sunrise)),
        _ => None,
    }
}

fn simple_part(part: &str) -> Option<SelectorSequence> {
    if let Some(caps) = regex!(r"^([A-Z][a-z]) off$").captures(part) {
        return Some(SelectorSequence {
            weekdays: Some(WeekdaySelector::Weekdays(vec![WeekdayRange::single(weekday(&caps[1])?)])),
            modifier: Some(RuleModifier { status: Some(RuleStatus::Closed), comment: None }),
            ..SelectorSequence::default()
        });
    }

    let caps = regex!(r"^(?:([A-Z][a-z])(?:-([A-Z][a-z]))? )?(\d{2}):(\d{2})-(\d{2}):(\d{2})$").captures(part)?;
    let weekdays = match (caps.get(1), caps.get(2)) {
        (Some(from), Some(to)) => {
            Some(WeekdaySelector::Weekdays(vec![WeekdayRange { from: weekday(from.as_str())?, to: weekday(to.as_str())? }]))
        }
        (Some(day), None) => Some(WeekdaySelector::Weekdays(vec![WeekdayRange::single(weekday(day.as_str())?)])),
        _ => None,
    };

    let beginning = clock(&caps[3], &caps[4])?;
    let end = clock(&caps[5], &caps[6])?;
    // Leave anything the grammar rejects to the grammar, so errors look the same.
    if beginning == DAY_MAX || beginning == end {
        return None;
    }

    Some(SelectorSequence {
        weekdays,
        times: vec![TimeSpan::new(Time::Fixed(beginning), Time::Fixed(end))],
        ..SelectorSequence::default()
    })
}

fn weekday(name: &str) -> Option<Weekday> {
    let day = match name {
        "Mo" => Weekday::Mon,
        "Tu" => Weekday::Tue,
        "We" => Weekday::Wed,
        "Th" => Weekday::Thu,
        "Fr" => Weekday::Fri,
        "Sa" => Weekday::Sat,
        "Su" => Weekday::Sun,
        _ => return None,
    };
    Some(day)
}

fn clock(hour: &str, minute: &str) -> Option<NaiveTime> {
    match (hour.parse().ok()?, minute.parse().ok()?) {
        (24, 0) => Some(DAY_MAX),
        (h, m) => NaiveTime::from_hms_opt(h, m, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parser;

    #[test]
    fn matches_grammar_output() {
        let fields = [
            "Mo off",
            "Mo 10:00-20:00",
            "Mo-Fr 08:00-12:30; Sa 09:00-12:00; Su off",
            "10:00-24:00",
            "Fr-Mo 22:00-04:00",
            "24/7",
            "sunrise-sunset",
            "sunset-sunrise",
        ];
        for field in fields {
            let fast = parse(field).unwrap_or_else(|| panic!("fast path rejected {field}"));
            assert_eq!(fast, parser::parse(field).unwrap(), "field: {field}");
        }
    }

    #[test]
    fn rejects_anything_else_whole() {
        for field in [
            "Mo 10:00-12:00,14:00-18:00",
            "Mo-Fr 10:00-20:00; PH off",
            "Jan 10:00-12:00",
            "Mo 25:00-26:00",
            "Mo 24:00-02:00",
            "Xx 10:00-12:00",
            "Mo 10:00-10:00",
        ] {
            assert_eq!(parse(field), None, "field: {field}");
        }
    }
}
