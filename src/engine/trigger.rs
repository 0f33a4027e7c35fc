//! Trigger scanning (field pre-classification).
//!
//! Before parsing, the sanitized field is scanned once for coarse traits
//! (quotes, holidays, months, fallback groups ...). The compile pipeline uses
//! them to decide whether the regex fast path is worth trying at all: a field
//! with any construct the fast path cannot express goes straight to the
//! grammar.
//!
//! ## Design notes
//!
//! - This is a *heuristic* scan. False positives only cost a fast-path
//!   attempt that fails; the grammar still decides what the field means.
//! - Traits are also surfaced in [`CompileDetails`](crate::CompileDetails)
//!   for debugging.

bitflags::bitflags! {
    /// Coarse features of a field.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FieldTraits: u32 {
        const HAS_DIGITS   = 1 << 0;
        const HAS_COLON    = 1 << 1;
        const HAS_COMMENT  = 1 << 2;
        const HAS_FALLBACK = 1 << 3;
        const HAS_LIST     = 1 << 4;
        const EXOTIC       = 1 << 5;
        const HAS_OFFSET   = 1 << 6;
        const WEEKDAYISH   = 1 << 7;
        const MONTHISH     = 1 << 8;
        const HOLIDAYISH   = 1 << 9;
        const WEEKISH      = 1 << 10;
        const SOLARISH     = 1 << 11;
        const YEARISH      = 1 << 12;
        const ALWAYS_OPEN  = 1 << 13;
    }
}

impl FieldTraits {
    /// Traits the fast path never handles.
    const FAST_PATH_BLOCKERS: FieldTraits = FieldTraits::HAS_COMMENT
        .union(FieldTraits::HAS_FALLBACK)
        .union(FieldTraits::HAS_LIST)
        .union(FieldTraits::EXOTIC)
        .union(FieldTraits::HAS_OFFSET)
        .union(FieldTraits::MONTHISH)
        .union(FieldTraits::HOLIDAYISH)
        .union(FieldTraits::WEEKISH)
        .union(FieldTraits::YEARISH);

    /// Scan a sanitized field.
    pub fn scan(field: &str) -> Self {
        let mut traits = FieldTraits::empty();

        if field.bytes().any(|b| b.is_ascii_digit()) {
            traits |= FieldTraits::HAS_DIGITS;
        }
        if field.contains(':') {
            traits |= FieldTraits::HAS_COLON;
        }
        if field.contains('"') {
            traits |= FieldTraits::HAS_COMMENT;
        }
        if field.contains("||") {
            traits |= FieldTraits::HAS_FALLBACK;
        }
        if field.contains(',') {
            traits |= FieldTraits::HAS_LIST;
        }
        if field.contains('[') || field.contains('+') || (field.contains('/') && !field.contains("24/7")) {
            traits |= FieldTraits::EXOTIC;
        }
        if field.contains('(') {
            traits |= FieldTraits::HAS_OFFSET;
        }
        if field.contains("24/7") {
            traits |= FieldTraits::ALWAYS_OPEN;
        }
        if regex!(r"\b\d{4}\b").is_match(field) {
            traits |= FieldTraits::YEARISH;
        }

        const WEEKDAYS: &[&str] = &["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];
        const MONTHS: &[&str] = &["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];
        const EVENTS: &[&str] = &["sunrise", "sunset", "dawn", "dusk"];

        for word in field.split(|c: char| !c.is_ascii_alphabetic()).filter(|w| !w.is_empty()) {
            if WEEKDAYS.contains(&word) {
                traits |= FieldTraits::WEEKDAYISH;
            } else if MONTHS.contains(&word) || word == "easter" {
                traits |= FieldTraits::MONTHISH;
            } else if word == "PH" || word == "SH" {
                traits |= FieldTraits::HOLIDAYISH;
            } else if word == "week" {
                traits |= FieldTraits::WEEKISH;
            } else if EVENTS.contains(&word) {
                traits |= FieldTraits::SOLARISH;
            }
        }

        traits
    }

    /// True when the regex fast path may recognize the field.
    pub fn fast_path_candidate(&self) -> bool {
        !self.intersects(Self::FAST_PATH_BLOCKERS)
    }
}
