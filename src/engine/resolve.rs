//! Per-date rule resolution.
//!
//! For a date, the rules compete as follows:
//!
//! ```text
//! Vec<Rule> ──┬─ per `;` group: first `||` alternative with a matching rule
//!             │     └─ its matching rules become candidates
//!             └─ active rule = max (specificity, declaration index)
//! ```
//!
//! The active rule's spans are then resolved to datetimes. A day's full span
//! set also includes spans of the previous day's active rule that run past
//! midnight, so `Mo-Fr 19:00-02:00` is open at Tuesday 01:00.

use chrono::{NaiveDate, NaiveTime};
use tracing::trace;

use crate::Context;
use crate::engine::SolarHours;
use crate::error::Result;
use crate::rules::Rule;
use crate::time_expr::{ComputedTimeSpan, TimeSpan};

pub(crate) struct Evaluator<'a> {
    pub(super) rules: &'a [Rule],
    pub(super) context: &'a Context,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(rules: &'a [Rule], context: &'a Context) -> Self {
        Self { rules, context }
    }

    /// The rule that decides `date`, if any rule applies at all.
    pub(crate) fn active_rule(&self, date: NaiveDate) -> Option<&'a Rule> {
        let holidays = self.context.holidays();
        let mut best: Option<&'a Rule> = None;

        for group in self.rules.chunk_by(|a, b| a.group == b.group) {
            let Some(member) =
                group.chunk_by(|a, b| a.member == b.member).find(|m| m.iter().any(|r| r.matches(date, holidays)))
            else {
                continue;
            };
            for rule in member.iter().filter(|r| r.matches(date, holidays)) {
                if best.is_none_or(|b| (rule.specificity, rule.index) > (b.specificity, b.index)) {
                    best = Some(rule);
                }
            }
        }

        trace!(%date, rule = ?best.map(|r| r.index), "active rule");
        best
    }

    /// Spans of `date`'s own active rule.
    pub(crate) fn own_spans(&self, date: NaiveDate) -> Result<Vec<ComputedTimeSpan>> {
        match self.active_rule(date) {
            Some(rule) => self.compute(rule, date, rule.time_selectors.iter()),
            None => Ok(Vec::new()),
        }
    }

    /// Spans of the previous day's active rule that are still running at `date` 00:00.
    pub(crate) fn carried_spans(&self, date: NaiveDate) -> Result<Vec<ComputedTimeSpan>> {
        let Some(previous) = date.pred_opt() else {
            return Ok(Vec::new());
        };
        let Some(rule) = self.active_rule(previous) else {
            return Ok(Vec::new());
        };
        let midnight = date.and_time(NaiveTime::MIN);
        let crossing = rule.time_selectors.iter().filter(|s| s.spans_midnight() || s.uses_solar());
        let mut spans = self.compute(rule, previous, crossing)?;
        spans.retain(|s| s.end > midnight);
        Ok(spans)
    }

    /// Everything that applies during `date`: carried spans first, then the day's own.
    pub(crate) fn day_spans(&self, date: NaiveDate) -> Result<Vec<ComputedTimeSpan>> {
        let mut spans = self.carried_spans(date)?;
        spans.extend(self.own_spans(date)?);
        Ok(spans)
    }

    fn compute<'s>(
        &self,
        rule: &Rule,
        date: NaiveDate,
        spans: impl Iterator<Item = &'s TimeSpan> + Clone,
    ) -> Result<Vec<ComputedTimeSpan>> {
        // Solar hours are only fetched when a span needs them.
        let hours =
            if spans.clone().any(TimeSpan::uses_solar) { self.context.solar_hours(date) } else { SolarHours::default() };
        spans.map(|span| span.compute(date, &hours, rule.status)).collect()
    }
}
