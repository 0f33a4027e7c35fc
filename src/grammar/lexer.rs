//! Tokenizer for sanitized fields.
//!
//! Keywords are matched case-sensitively: case correction is the
//! sanitizer's job. Any word that is not a keyword is a parse error carrying
//! the word itself, so `Mo,Wx 10:00-12:00` reports `Wx`.

use chrono::Weekday;

use crate::error::{Error, Result};
use crate::rules::{HolidayKind, RuleStatus};
use crate::time_expr::SolarEvent;

const WEEKDAYS: [(&str, Weekday); 7] = [
    ("Mo", Weekday::Mon),
    ("Tu", Weekday::Tue),
    ("We", Weekday::Wed),
    ("Th", Weekday::Thu),
    ("Fr", Weekday::Fri),
    ("Sa", Weekday::Sat),
    ("Su", Weekday::Sun),
];

const MONTHS: [&str; 12] = ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// Digits; `digits` keeps the written width so `2018` and `18` stay distinct.
    Number { value: u32, digits: usize },
    /// `hh:mm`
    Clock { hour: u32, minute: u32 },
    AlwaysOpen,
    Weekday(Weekday),
    Month(u32),
    Holiday(HolidayKind),
    Event(SolarEvent),
    Easter,
    Week,
    /// `day` or `days`
    Day,
    Status(RuleStatus),
    Comment(String),
    Semicolon,
    Comma,
    Dash,
    Plus,
    Slash,
    Colon,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offsets into the field.
    pub start: usize,
    pub end: usize,
}

pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let start = pos;

        if c.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let kind = if input[pos..].starts_with("24/7") {
            pos += 4;
            TokenKind::AlwaysOpen
        } else if c == b'"' {
            let close = input[pos + 1..]
                .find('"')
                .ok_or_else(|| Error::parse(start + 1, &input[start..], "unterminated comment"))?;
            let text = input[pos + 1..pos + 1 + close].to_string();
            pos += close + 2;
            TokenKind::Comment(text)
        } else if c.is_ascii_digit() {
            pos = scan_while(bytes, pos, |b| b.is_ascii_digit());
            let digits = &input[start..pos];
            if bytes.get(pos) == Some(&b':') && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) {
                let minute_start = pos + 1;
                pos = scan_while(bytes, minute_start, |b| b.is_ascii_digit());
                if pos - minute_start != 2 || digits.len() > 2 {
                    return Err(Error::parse(start + 1, &input[start..pos], "malformed time"));
                }
                TokenKind::Clock { hour: number(digits, start)?, minute: number(&input[minute_start..pos], start)? }
            } else {
                TokenKind::Number { value: number(digits, start)?, digits: digits.len() }
            }
        } else if c.is_ascii_alphabetic() {
            pos = scan_while(bytes, pos, |b| b.is_ascii_alphabetic());
            let word = &input[start..pos];
            keyword(word).ok_or_else(|| Error::parse(start + 1, word, "unknown keyword"))?
        } else {
            pos += 1;
            match c {
                b';' => TokenKind::Semicolon,
                b',' => TokenKind::Comma,
                b'-' => TokenKind::Dash,
                b'+' => TokenKind::Plus,
                b'/' => TokenKind::Slash,
                b':' => TokenKind::Colon,
                b'(' => TokenKind::LParen,
                b')' => TokenKind::RParen,
                b'[' => TokenKind::LBracket,
                b']' => TokenKind::RBracket,
                b'|' if bytes.get(pos) == Some(&b'|') => {
                    pos += 1;
                    TokenKind::Fallback
                }
                _ => {
                    let end = input[start..].chars().next().map_or(pos, |ch| start + ch.len_utf8());
                    return Err(Error::parse(start + 1, &input[start..end], "unexpected character"));
                }
            }
        };

        tokens.push(Token { kind, start, end: pos });
    }

    Ok(tokens)
}

fn scan_while(bytes: &[u8], mut pos: usize, pred: impl Fn(&u8) -> bool) -> usize {
    while bytes.get(pos).is_some_and(&pred) {
        pos += 1;
    }
    pos
}

fn number(digits: &str, start: usize) -> Result<u32> {
    digits.parse().map_err(|_| Error::parse(start + 1, digits, "number out of range"))
}

fn keyword(word: &str) -> Option<TokenKind> {
    if let Some((_, day)) = WEEKDAYS.iter().find(|(name, _)| *name == word) {
        return Some(TokenKind::Weekday(*day));
    }
    if let Some(idx) = MONTHS.iter().position(|m| *m == word) {
        return Some(TokenKind::Month(idx as u32 + 1));
    }
    if let Some(event) = SolarEvent::from_name(word) {
        return Some(TokenKind::Event(event));
    }
    let kind = match word {
        "PH" => TokenKind::Holiday(HolidayKind::Public),
        "SH" => TokenKind::Holiday(HolidayKind::School),
        "easter" => TokenKind::Easter,
        "week" => TokenKind::Week,
        "day" | "days" => TokenKind::Day,
        "open" => TokenKind::Status(RuleStatus::Open),
        "closed" | "off" => TokenKind::Status(RuleStatus::Closed),
        "unknown" => TokenKind::Status(RuleStatus::Unknown),
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenizes_a_simple_rule() {
        assert_eq!(
            kinds("Mo-Fr 08:00-12:30"),
            vec![
                TokenKind::Weekday(Weekday::Mon),
                TokenKind::Dash,
                TokenKind::Weekday(Weekday::Fri),
                TokenKind::Clock { hour: 8, minute: 0 },
                TokenKind::Dash,
                TokenKind::Clock { hour: 12, minute: 30 },
            ]
        );
    }

    #[test]
    fn keeps_number_width_and_comments() {
        assert_eq!(
            kinds("2018 Dec 05 off \"see; notes\""),
            vec![
                TokenKind::Number { value: 2018, digits: 4 },
                TokenKind::Month(12),
                TokenKind::Number { value: 5, digits: 2 },
                TokenKind::Status(RuleStatus::Closed),
                TokenKind::Comment("see; notes".to_string()),
            ]
        );
    }

    #[test]
    fn always_open_and_fallback() {
        assert_eq!(kinds("24/7 || \"x\""), vec![TokenKind::AlwaysOpen, TokenKind::Fallback, TokenKind::Comment("x".into())]);
    }

    #[test]
    fn unknown_words_report_the_word() {
        match tokenize("Mo,Wx 10:00-12:00") {
            Err(Error::Parse { column, context, .. }) => {
                assert_eq!(column, 4);
                assert_eq!(context, "Wx");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
        assert!(matches!(tokenize("(sunrise=02:00)"), Err(Error::Parse { .. })));
    }
}
