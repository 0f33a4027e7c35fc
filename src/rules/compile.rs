use std::collections::BTreeSet;

use super::selectors::{RangeSelector, WeekdaySet};
use super::{Rule, RuleStatus};
use crate::error::{Error, Result};
use crate::syntax::{SelectorSequence, TimeDomain, WeekdayRange, WeekdaySelector};
use crate::time_expr::TimeSpan;

/// Turn a syntax tree into the ordered rule list.
///
/// Every selector sequence becomes one rule. Rules remember the `;` group and
/// the `||` alternative they came from; the query engine uses both to decide
/// which rules compete on a given date.
pub(crate) fn compile(domain: &TimeDomain) -> Result<Vec<Rule>> {
    let mut rules = Vec::new();
    for (group, fallback) in domain.groups.iter().enumerate() {
        for (member, sequence) in fallback.members.iter().enumerate() {
            for selectors in &sequence.selectors {
                rules.push(compile_sequence(selectors, rules.len(), group, member));
            }
        }
    }

    if let [only] = rules.as_slice() {
        let sequence = domain.groups.first().and_then(|g| g.members.first()).and_then(|m| m.selectors.first());
        if let Some(sequence) = sequence {
            check_degenerate(sequence, only)?;
        }
    }
    if !rules.is_empty() && rules.iter().all(|r| r.status == RuleStatus::Closed && is_unrestricted(r)) {
        return Err(Error::AlwaysClosed);
    }

    Ok(rules)
}

fn check_degenerate(sequence: &SelectorSequence, rule: &Rule) -> Result<()> {
    if sequence.has_range_selectors() || !sequence.times.is_empty() {
        return Ok(());
    }
    match &sequence.modifier {
        Some(modifier) if modifier.status.is_none() && modifier.comment.is_some() => Err(Error::CommentOnlyField),
        _ if rule.status == RuleStatus::Closed => Err(Error::AlwaysClosed),
        _ => Ok(()),
    }
}

fn is_unrestricted(rule: &Rule) -> bool {
    rule.range_selectors.iter().all(|s| *s == RangeSelector::AlwaysOpen)
}

fn compile_sequence(sequence: &SelectorSequence, index: usize, group: usize, member: usize) -> Rule {
    let range_selectors = range_selectors(sequence);

    let (status, comment) = match &sequence.modifier {
        Some(modifier) => (modifier.status.unwrap_or(RuleStatus::Unknown), modifier.comment.clone()),
        None => (RuleStatus::Open, None),
    };

    let time_selectors = if !sequence.times.is_empty() {
        sequence.times.clone()
    } else if status == RuleStatus::Closed {
        Vec::new()
    } else {
        vec![TimeSpan::full_day()]
    };

    let specificity = range_selectors.iter().map(RangeSelector::weight).sum();
    Rule { range_selectors, time_selectors, status, comment, specificity, index, group, member }
}

fn range_selectors(sequence: &SelectorSequence) -> Vec<RangeSelector> {
    let mut selectors = Vec::new();
    if sequence.always_open {
        selectors.push(RangeSelector::AlwaysOpen);
    }
    if !sequence.years.is_empty() {
        selectors.push(RangeSelector::Year { ranges: sequence.years.clone() });
    }
    if !sequence.monthdays.is_empty() {
        selectors.push(RangeSelector::MonthDay { ranges: sequence.monthdays.clone() });
    }
    if !sequence.weeks.is_empty() {
        let numbers: BTreeSet<u32> = sequence.weeks.iter().flat_map(|w| w.numbers()).collect();
        selectors.push(RangeSelector::Week { numbers });
    }
    if let Some(weekdays) = &sequence.weekdays {
        selectors.push(match weekdays {
            WeekdaySelector::Weekdays(ranges) => RangeSelector::Weekday { days: weekday_set(ranges) },
            WeekdaySelector::Holidays(holidays) => {
                RangeSelector::WeekdayOrHoliday { days: WeekdaySet::empty(), holidays: holidays.clone() }
            }
            WeekdaySelector::WeekdaysOrHolidays { weekdays, holidays } => {
                RangeSelector::WeekdayOrHoliday { days: weekday_set(weekdays), holidays: holidays.clone() }
            }
            WeekdaySelector::WeekdaysInHolidays { weekdays, holidays } => {
                RangeSelector::WeekdayInHoliday { days: weekday_set(weekdays), holidays: holidays.clone() }
            }
        });
    }
    if selectors.is_empty() {
        selectors.push(RangeSelector::AlwaysOpen);
    }
    selectors
}

fn weekday_set(ranges: &[WeekdayRange]) -> WeekdaySet {
    ranges.iter().fold(WeekdaySet::empty(), |set, r| set | WeekdaySet::range(r.from, r.to))
}
