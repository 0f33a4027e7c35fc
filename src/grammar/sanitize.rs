//! Field normalization.
//!
//! Real-world fields are full of near misses: lowercase keywords, `9:00`,
//! `10h30`, `0900-1800`, stray spaces around separators, space-separated
//! spans. Each `;`-part is rewritten into canonical form before parsing.
//! Quoted comments are lifted out first and put back untouched at the end.

use crate::error::{Error, Result};

/// Canonical spelling of every keyword the case-correction pass knows.
const KEYWORDS: &[&str] = &[
    "Mo", "Tu", "We", "Th", "Fr", "Sa", "Su", "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov",
    "Dec", "sunrise", "sunset", "dawn", "dusk", "PH", "SH", "open", "off", "closed", "unknown", "easter", "week",
];

/// Return the canonical form of `field`.
///
/// Fails with [`Error::InconsistentField`] when quotes are unbalanced.
pub fn sanitize(field: &str) -> Result<String> {
    let quotes = field.matches('"').count();
    if quotes % 2 != 0 {
        return Err(Error::InconsistentField(format!("{quotes} quote characters, comments must be closed")));
    }

    let (protected, comments) = lift_comments(field);
    let parts: Vec<String> = protected
        .trim_matches(|c: char| matches!(c, ' ' | '\n' | '\t' | ';'))
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(sanitize_part)
        .collect();

    Ok(restore_comments(&parts.join("; "), &comments))
}

fn lift_comments(field: &str) -> (String, Vec<String>) {
    let mut comments = Vec::new();
    let protected = regex!(r#""([^"]*)""#).replace_all(field, |caps: &regex::Captures| {
        comments.push(caps[1].to_string());
        "\"\"".to_string()
    });
    (protected.into_owned(), comments)
}

fn restore_comments(field: &str, comments: &[String]) -> String {
    let mut out = String::with_capacity(field.len());
    let mut pieces = field.split("\"\"");
    if let Some(first) = pieces.next() {
        out.push_str(first);
    }
    for (piece, comment) in pieces.zip(comments) {
        out.push('"');
        out.push_str(comment);
        out.push('"');
        out.push_str(piece);
    }
    out
}

fn sanitize_part(part: &str) -> String {
    if regex!(r"(?i)^24 ?(?:h|hours)?$").is_match(part) {
        return "24/7".to_string();
    }

    // Separator spacing.
    let part = regex!(r"\s*,\s*").replace_all(part, ",");
    let part = regex!(r"\s*\|\|\s*").replace_all(&part, " || ");
    let part = regex!(r"\s+").replace_all(&part, " ");

    // "mo-sa" -> "Mo-Sa", "SUNSET" -> "sunset"
    let part = regex!(
        r"(?i-u)\b(mo|tu|we|th|fr|sa|su|jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec|sunrise|sunset|dawn|dusk|ph|sh|open|off|closed|unknown|easter|week)\b"
    )
    .replace_all(&part, |caps: &regex::Captures| canonical_keyword(&caps[1]));
    let part = regex!(r"\b([A-Z][a-z]{1,2}) ?- ?([A-Z][a-z]{1,2})\b").replace_all(&part, "$1-$2");

    // "10h30" -> "10:30", "10h" -> "10:00"
    let part = regex!(r"\b(\d{1,2})h(\d{2})\b").replace_all(&part, "$1:$2");
    let part = regex!(r"\b(\d{1,2})h\b").replace_all(&part, "$1:00");

    // "0900-1800" -> "09:00-18:00", only where a time selector can stand: after
    // a day or date token, after another span in a list, or alone in the part.
    // "2019-2020 off" at the start of a part is a year range.
    let part = replace_until_stable(
        part.into_owned(),
        regex!(
            r#"(^|\b[A-Za-z]{2,3} |\b(?:\d{1,2}|\d{4}) |\d{2}:\d{2},)([01]\d|2[0-4])([0-5]\d) ?- ?([01]\d|2[0-4])([0-5]\d)(,\d{2}:?\d{2} ?-|$| off| closed| open| unknown| ")"#
        ),
        |caps: &regex::Captures| {
            let modifier_follows = !caps[6].is_empty() && !caps[6].starts_with(',');
            if caps[1].is_empty() && modifier_follows {
                caps[0].to_string()
            } else {
                format!("{}{}:{}-{}:{}{}", &caps[1], &caps[2], &caps[3], &caps[4], &caps[5], &caps[6])
            }
        },
    );

    // "7:30" -> "07:30"
    let part = regex!(r"(^|[^\d])(\d):(\d{2})").replace_all(&part, "${1}0$2:$3");

    // "10:00 - 20:00" -> "10:00-20:00"
    let part = regex!(r"(\d{2}:\d{2}|\)|sunrise|sunset|dawn|dusk) ?- ?(\d{2}:\d{2}|\(|sunrise|sunset|dawn|dusk)")
        .replace_all(&part, "$1-$2");

    // "22:00-00:00" -> "22:00-24:00", leaving "(sunrise-00:00)" offsets alone.
    let part = regex!(r"(\d{2}:\d{2}|\)|(?:^|[ ,])(?:sunrise|sunset|dawn|dusk))-00:00").replace_all(&part, "${1}-24:00");

    // "Mo 10:00-12:00, Tu 10:00-12:00" -> "Mo 10:00-12:00; Tu 10:00-12:00"
    let part = regex!(r"(\d{2}:\d{2}|\)|sunrise|sunset|dawn|dusk),((?:Mo|Tu|We|Th|Fr|Sa|Su)(?:[^a-z]|$))")
        .replace_all(&part, "$1; $2");

    // "10:00-12:00 14:00-19:00" -> "10:00-12:00,14:00-19:00"
    replace_until_stable(
        part.into_owned(),
        regex!(
            r"((?:\((?:sunrise|sunset|dawn|dusk)[+-]\d{2}:\d{2}\)|\d{2}:\d{2}|sunrise|sunset|dawn|dusk)-(?:\((?:sunrise|sunset|dawn|dusk)[+-]\d{2}:\d{2}\)|\d{2}:\d{2}|sunrise|sunset|dawn|dusk)) +((?:\((?:sunrise|sunset|dawn|dusk)[+-]\d{2}:\d{2}\)|\d{2}:\d{2}|sunrise|sunset|dawn|dusk)-)"
        ),
        "$1,$2",
    )
}

/// Unknown words come back as written so the parser can report them.
fn canonical_keyword(word: &str) -> String {
    KEYWORDS.iter().find(|k| k.eq_ignore_ascii_case(word)).map_or_else(|| word.to_string(), |k| k.to_string())
}

fn replace_until_stable(mut text: String, re: &regex::Regex, mut replacement: impl regex::Replacer) -> String {
    // Matches can overlap their neighbours; a few passes settle every list.
    for _ in 0..8 {
        let next = re.replace_all(&text, replacement.by_ref());
        if next == text {
            break;
        }
        text = next.into_owned();
    }
    text
}
