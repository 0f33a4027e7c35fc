//! Temporal queries over resolved spans.

use chrono::{NaiveDateTime, NaiveTime};
use tracing::debug;

use super::resolve::Evaluator;
use crate::error::{Error, Result};
use crate::rules::RuleStatus;
use crate::time_expr::{ComputedTimeSpan, DAY_MAX};

impl Evaluator<'_> {
    pub(crate) fn is_open(&self, moment: NaiveDateTime) -> Result<bool> {
        Ok(self.state_at(moment)? == RuleStatus::Open)
    }

    /// Status at `moment`. An `Open` span wins over an `Unknown` one; no span means closed.
    pub(crate) fn state_at(&self, moment: NaiveDateTime) -> Result<RuleStatus> {
        let spans = self.day_spans(moment.date())?;
        let mut state = RuleStatus::Closed;
        for span in spans.iter().filter(|s| s.contains(moment)) {
            match span.status {
                RuleStatus::Open => return Ok(RuleStatus::Open),
                RuleStatus::Unknown => state = RuleStatus::Unknown,
                RuleStatus::Closed => {}
            }
        }
        Ok(state)
    }

    /// First instant after `moment` where the state changes.
    ///
    /// Walks forward one day at a time. A span ending at `24:00` that the next
    /// day continues from `00:00` with the same status is not a change; the
    /// walk goes on into that day. Every day entered counts against
    /// `max_lookahead_days`, so fields that never change (`24/7`) fail with
    /// [`Error::NextChangeRecursion`] instead of looping.
    pub(crate) fn next_change(&self, moment: NaiveDateTime, max_lookahead_days: u32) -> Result<NaiveDateTime> {
        let exhausted = || {
            debug!(%moment, max_lookahead_days, "no state change within lookahead");
            Error::NextChangeRecursion { max_lookahead_days }
        };

        let mut date = moment.date();
        let mut threshold = moment;
        let mut strict = true;
        let mut days = 0u32;

        loop {
            let spans = relevant_spans(self.day_spans(date)?);
            let boundary = spans
                .iter()
                .flat_map(|s| [(s.beginning, s), (s.end, s)])
                .filter(|(instant, _)| if strict { *instant > threshold } else { *instant >= threshold })
                .min_by_key(|(instant, _)| *instant);

            let next_date = date.succ_opt().ok_or_else(exhausted)?;
            match boundary {
                Some((instant, span)) if instant == span.end && instant.time() == DAY_MAX => {
                    let next_midnight = next_date.and_time(NaiveTime::MIN);
                    let continued = relevant_spans(self.day_spans(next_date)?)
                        .iter()
                        .any(|s| s.beginning == next_midnight && s.status == span.status);
                    if !continued || max_lookahead_days == 0 {
                        return Ok(instant);
                    }
                    strict = true;
                }
                Some((instant, _)) => return Ok(instant),
                None => strict = false,
            }

            days += 1;
            if days > max_lookahead_days {
                return Err(exhausted());
            }
            date = next_date;
            threshold = date.and_time(NaiveTime::MIN);
        }
    }

    /// Open spans between `start` and `end`, clipped to those bounds and sorted.
    ///
    /// With `merge`, spans that overlap or touch (including `24:00` followed
    /// by `00:00`) are joined.
    pub(crate) fn opening_periods_between(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        merge: bool,
    ) -> Result<Vec<ComputedTimeSpan>> {
        if end <= start {
            return Ok(Vec::new());
        }

        let mut spans = self.day_spans(start.date())?;
        let mut date = start.date();
        while date < end.date() {
            let Some(next) = date.succ_opt() else { break };
            date = next;
            spans.extend(self.own_spans(date)?);
        }

        let mut periods: Vec<ComputedTimeSpan> = spans
            .into_iter()
            .filter(|s| s.status == RuleStatus::Open)
            .map(|s| ComputedTimeSpan { beginning: s.beginning.max(start), end: s.end.min(end), status: s.status })
            .filter(|s| s.beginning < s.end)
            .collect();
        periods.sort_by_key(|s| (s.beginning, s.end));

        Ok(if merge { merge_touching(periods) } else { periods })
    }
}

/// Non-closed spans, sorted, with same-status neighbours joined.
fn relevant_spans(spans: Vec<ComputedTimeSpan>) -> Vec<ComputedTimeSpan> {
    let mut spans: Vec<ComputedTimeSpan> = spans.into_iter().filter(|s| s.status != RuleStatus::Closed).collect();
    spans.sort_by_key(|s| (s.beginning, s.end));

    let mut merged: Vec<ComputedTimeSpan> = Vec::with_capacity(spans.len());
    for span in spans {
        match merged.iter_mut().rev().find(|m| m.status == span.status) {
            Some(last) if last.touches(&span) => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}

fn merge_touching(periods: Vec<ComputedTimeSpan>) -> Vec<ComputedTimeSpan> {
    let mut merged: Vec<ComputedTimeSpan> = Vec::with_capacity(periods.len());
    for period in periods {
        match merged.last_mut() {
            Some(last) if last.touches(&period) => last.end = last.end.max(period.end),
            _ => merged.push(period),
        }
    }
    merged
}
