macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}

#[cfg(test)]
macro_rules! date {
    ($s:literal) => {
        chrono::NaiveDate::parse_from_str($s, "%Y-%m-%d").unwrap()
    };
}

#[cfg(test)]
macro_rules! datetime {
    ($s:literal) => {
        chrono::NaiveDateTime::parse_from_str($s, "%Y-%m-%d %H:%M").unwrap()
    };
}
