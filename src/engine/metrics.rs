//! Compile metrics.
//!
//! Collected by [`parse_verbose_with`](crate::parse_verbose_with) only; the
//! plain `parse` path does not time anything.
//!
//! The intended usage is profiling the sanitize/parse/compile split and
//! checking which fields take the regex fast path.

use std::time::Duration;

use super::trigger::FieldTraits;

/// Which parser produced the syntax tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParsePath {
    FastPath,
    Grammar,
}

#[derive(Debug, Clone)]
pub struct CompileDetails {
    /// The field after sanitization; this is what was parsed.
    pub sanitized: String,
    pub path: ParsePath,
    pub traits: FieldTraits,
    /// Number of compiled rules.
    pub rule_count: usize,
    pub sanitize: Duration,
    /// Fast path attempt plus grammar parse, when it ran.
    pub parse: Duration,
    pub compile: Duration,
    pub total: Duration,
}
