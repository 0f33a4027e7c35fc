//! Error types.
//!
//! Compile-time failures (`Parse`, `UnsupportedPattern`, `InconsistentField`,
//! `AlwaysClosed`, `CommentOnlyField`) reject a field as a whole: no partial
//! rule set is ever returned. Query-time failures (`SolarHoursUnavailable`,
//! `NextChangeRecursion`) are reported per call and are never replaced by a
//! guessed value.

use chrono::NaiveDate;
use thiserror::Error;

use crate::time_expr::SolarEvent;

/// Errors raised while compiling or querying an `opening_hours` field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The field violates the grammar.
    #[error("parse error at column {column}: {message} (near {context:?})")]
    Parse {
        /// 1-based column of the offending token in the sanitized field.
        column: usize,
        /// The offending substring.
        context: String,
        message: String,
    },

    /// Valid syntax that this engine deliberately does not evaluate.
    #[error("unsupported pattern: {0}")]
    UnsupportedPattern(String),

    /// Structural problem detected before parsing, such as unbalanced quotes.
    #[error("inconsistent field: {0}")]
    InconsistentField(String),

    /// The field only says the facility is closed, so there is nothing to query.
    #[error("the field describes a facility that is always closed")]
    AlwaysClosed,

    /// The field holds a comment and no rule.
    #[error("the field contains only a comment")]
    CommentOnlyField,

    /// A rule needs a solar event that the solar collaborator did not provide.
    #[error("{event} is not available on {date}")]
    SolarHoursUnavailable { date: NaiveDate, event: SolarEvent },

    /// `next_change` walked past its lookahead bound without finding a change.
    #[error("no state change found within {max_lookahead_days} days")]
    NextChangeRecursion { max_lookahead_days: u32 },
}

impl Error {
    pub(crate) fn parse(column: usize, context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse { column, context: context.into(), message: message.into() }
    }

    pub(crate) fn unsupported(what: impl Into<String>) -> Self {
        Self::UnsupportedPattern(what.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
