//! Compile pipeline support and query engine.
//!
//! Compiling a field and querying it are two separate stages. Compilation
//! happens once per field and yields an immutable `Vec<Rule>`; queries borrow
//! those rules together with a caller-supplied [`Context`](crate::Context).
//!
//! ## How the parts work together
//!
//! ```text
//! field ── sanitize ── FieldTraits::scan ──┬─ fast path (common shapes)
//!                      (trigger.rs)        └─ grammar parser
//!                                                   │
//!                                                   v
//!                                         compile ── Vec<Rule>
//!                                                   │
//! query(datetime, Context) ─────────────────────────┤
//!                                                   v
//!                                   Evaluator::active_rule (resolve.rs)
//!                                     - `;` groups, `||` fallbacks
//!                                     - max (specificity, index)
//!                                                   │
//!                                                   v
//!                                   Evaluator::day_spans (resolve.rs)
//!                                     - carried spans from the day before
//!                                     - the day's own spans
//!                                                   │
//!                                                   v
//!                            is_open / next_change / opening_periods_between
//!                                         (query.rs)
//! ```
//!
//! ## Responsibilities by module
//!
//! - `trigger.rs`: coarse scan of the sanitized field, used to skip the fast
//!   path for fields it can never handle.
//! - `resolve.rs`: picks the rule that decides a date and turns its spans into
//!   datetimes.
//! - `query.rs`: the temporal queries on top of resolved spans.
//! - `holidays.rs`, `solar.rs`: the external collaborators (holiday dates,
//!   solar hours) and the per-context solar cache.
//! - `metrics.rs`: timing data returned by `parse_verbose_with`.
//!
//! ## Debugging
//!
//! The engine emits `tracing` events: `debug` for compile decisions and
//! exhausted lookahead, `trace` for per-date rule resolution.

#[path = "engine/holidays.rs"]
mod holidays;
#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/query.rs"]
mod query;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/solar.rs"]
mod solar;
#[path = "engine/trigger.rs"]
mod trigger;

pub use holidays::{HolidayCalendar, HolidaySets};
pub use metrics::{CompileDetails, ParsePath};
pub(crate) use resolve::Evaluator;
pub(crate) use solar::SolarCache;
pub use solar::{FixedSolarHours, Location, SolarHours, SolarProvider};
pub use trigger::FieldTraits;
