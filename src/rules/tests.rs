use crate::Error;
use crate::grammar::parser;
use crate::rules::{RangeSelector, Rule, RuleStatus, compile};
use crate::time_expr::TimeSpan;

fn compiled(field: &str) -> Vec<Rule> {
    let domain = parser::parse(field).unwrap_or_else(|e| panic!("'{field}' does not parse: {e}"));
    compile(&domain).unwrap_or_else(|e| panic!("'{field}' does not compile: {e}"))
}

#[test]
fn specificity_and_status_per_rule() {
    // (field, [(specificity, status)] per compiled rule)
    let cases: Vec<(&str, Vec<(u32, RuleStatus)>)> = vec![
        ("24/7", vec![(0, RuleStatus::Open)]),
        ("10:00-20:00", vec![(0, RuleStatus::Open)]),
        ("Mo-Fr 10:00-20:00", vec![(1, RuleStatus::Open)]),
        ("Mo-Fr 10:00-20:00; Sa off", vec![(1, RuleStatus::Open), (1, RuleStatus::Closed)]),
        ("week 1 Mo 08:00-20:00", vec![(4, RuleStatus::Open)]),
        ("week 1-53/2 10:00-12:00", vec![(3, RuleStatus::Open)]),
        ("Dec 24 10:00-14:00", vec![(5, RuleStatus::Open)]),
        ("Dec Mo-Sa 10:00-19:00", vec![(6, RuleStatus::Open)]),
        ("2018 Mo 10:00-12:00", vec![(5, RuleStatus::Open)]),
        ("2018-2020 Dec 10:00-12:00", vec![(9, RuleStatus::Open)]),
        // A year in front of a month qualifies the date instead of selecting years.
        ("2018 Dec 25 off", vec![(5, RuleStatus::Closed)]),
        ("PH off", vec![(1, RuleStatus::Closed)]),
        ("PH,Su 10:00-12:00", vec![(1, RuleStatus::Open)]),
        ("SH Mo-Fr 08:00-12:00", vec![(3, RuleStatus::Open)]),
        ("Mo 10:00-12:00 unknown", vec![(1, RuleStatus::Unknown)]),
        ("Mo 10:00-12:00 \"call ahead\"", vec![(1, RuleStatus::Unknown)]),
        ("Mo 10:00-12:00 open \"call ahead\"", vec![(1, RuleStatus::Open)]),
        ("May 1,Dec 25 off", vec![(5, RuleStatus::Closed)]),
        ("Mo 10:00-12:00, We 14:00-16:00", vec![(1, RuleStatus::Open), (1, RuleStatus::Open)]),
    ];

    for (field, expected) in cases {
        let rules = compiled(field);
        let got: Vec<(u32, RuleStatus)> = rules.iter().map(|r| (r.specificity(), r.status())).collect();
        assert_eq!(got, expected, "field '{field}' compiled to {rules:#?}");
    }
}

#[test]
fn groups_and_fallback_members() {
    let rules = compiled("Mo-Fr 10:00-18:00, Sa 10:00-14:00 || \"by appointment\"; PH off");
    let layout: Vec<(usize, usize, usize)> = rules.iter().map(|r| (r.index(), r.group(), r.member)).collect();
    assert_eq!(layout, vec![(0, 0, 0), (1, 0, 0), (2, 0, 1), (3, 1, 0)]);
    assert_eq!(rules[2].comment(), Some("by appointment"));
    assert_eq!(rules[2].status(), RuleStatus::Unknown);
    assert_eq!(rules[2].range_selectors(), &[RangeSelector::AlwaysOpen]);
}

#[test]
fn time_selectors_default_by_status() {
    let open = compiled("Mo");
    assert_eq!(open[0].time_selectors(), &[TimeSpan::full_day()]);

    let closed = compiled("Mo 10:00-20:00; Tu off");
    assert!(closed[1].time_selectors().is_empty());

    let listed = compiled("Mo 10:00-12:00,14:00-18:00");
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].time_selectors().len(), 2);
}

#[test]
fn degenerate_fields_are_rejected() {
    let cases: Vec<(&str, Error)> = vec![
        ("off", Error::AlwaysClosed),
        ("closed", Error::AlwaysClosed),
        ("24/7 off", Error::AlwaysClosed),
        ("\"ask the owner\"", Error::CommentOnlyField),
    ];

    for (field, expected) in cases {
        let domain = parser::parse(field).unwrap_or_else(|e| panic!("'{field}' does not parse: {e}"));
        assert_eq!(compile(&domain), Err(expected), "field '{field}'");
    }
}

#[test]
fn closed_rules_with_selectors_are_kept() {
    let rules = compiled("Mo off");
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].status(), RuleStatus::Closed);

    let rules = compiled("\"seasonal\" ; Mo 10:00-12:00");
    assert_eq!(rules.len(), 2);
    assert_eq!(rules[0].status(), RuleStatus::Unknown);
}

#[test]
fn unsupported_constructs() {
    for field in [
        "Su[1] 10:00-20:00",
        "Mo 10:00+",
        "Mo 10:00-16:00/01:00",
        "Dec 25 +Mo 10:00-12:00",
        "\"Sundays\": 10:00-12:00",
    ] {
        assert!(matches!(parser::parse(field), Err(Error::UnsupportedPattern(_))), "field '{field}'");
    }
}

#[test]
fn compiling_twice_is_stable() {
    for field in ["Mo-Fr 08:00-12:00,13:00-17:30; Sa 08:00-12:00; PH off", "Oct-Mar 07:30-19:30; Apr-Sep 07:00-21:00"] {
        let domain = parser::parse(field).unwrap();
        assert_eq!(compile(&domain).unwrap(), compile(&domain).unwrap(), "field '{field}'");
    }
}

#[test]
fn holiday_offsets() {
    let rules = compiled("PH +1 day off; SH -2 days 10:00-12:00");
    let offsets: Vec<i32> = rules
        .iter()
        .flat_map(|r| r.range_selectors())
        .filter_map(|s| match s {
            RangeSelector::WeekdayOrHoliday { holidays, .. } => holidays.first().map(|h| h.offset_days),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![1, -2]);

    let err = parser::parse("PH +3000000000 days off").unwrap_err();
    assert!(matches!(err, Error::Parse { column: 5, .. }), "got {err:?}");
}
