use chrono::NaiveDate;

/// Gregorian Easter Sunday for `year` (anonymous Gregorian / Butcher algorithm).
pub fn easter_date(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, month as u32, day as u32)
}

/// Inclusive slice of `items` from `start` to `end`, wrapping around when
/// `start > end` (so `Fr-Mo` yields Fr, Sa, Su, Mo).
pub(crate) fn cycle_slice<T: Clone>(items: &[T], start: usize, end: usize) -> Vec<T> {
    if start <= end {
        return items[start..=end].to_vec();
    }
    items[start..].iter().chain(&items[..=end]).cloned().collect()
}

pub(crate) fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 { NaiveDate::from_ymd_opt(year + 1, 1, 1) } else { NaiveDate::from_ymd_opt(year, month + 1, 1) };
    match (first, next) {
        (Some(first), Some(next)) => (next - first).num_days() as u32,
        _ => 31,
    }
}
