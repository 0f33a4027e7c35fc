//! Field text to syntax tree.
//!
//! ```text
//! field ── sanitize (sanitize.rs) ──┬── fast_path::parse (fast_path.rs) ──┐
//!                                   │        (common shapes only)         │
//!                                   └── lexer + parser (lexer.rs, ───────┴──▶ TimeDomain
//!                                        parser.rs)
//! ```
//!
//! Both branches produce the same [`TimeDomain`](crate::syntax::TimeDomain)
//! for any field the fast path accepts.

#[path = "grammar/fast_path.rs"]
pub(crate) mod fast_path;
#[path = "grammar/lexer.rs"]
mod lexer;
#[path = "grammar/parser.rs"]
pub(crate) mod parser;
#[path = "grammar/sanitize.rs"]
mod sanitize;

pub use sanitize::sanitize;
