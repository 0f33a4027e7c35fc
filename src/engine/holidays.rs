//! Holiday collaborator.
//!
//! The engine never computes holidays. Callers hand over public (`PH`) and
//! school (`SH`) holiday dates, either directly or through a
//! [`HolidayCalendar`] queried for a range of years.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use chrono::NaiveDate;

use crate::rules::HolidayKind;

/// Source of holiday dates for a range of years.
pub trait HolidayCalendar {
    fn public_holidays(&self, years: RangeInclusive<i32>) -> Vec<NaiveDate>;

    fn school_holidays(&self, _years: RangeInclusive<i32>) -> Vec<NaiveDate> {
        Vec::new()
    }
}

/// Immutable `PH` and `SH` date sets consulted by selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidaySets {
    public: BTreeSet<NaiveDate>,
    school: BTreeSet<NaiveDate>,
}

impl HolidaySets {
    pub fn new(public: impl IntoIterator<Item = NaiveDate>, school: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self { public: public.into_iter().collect(), school: school.into_iter().collect() }
    }

    pub fn from_calendar(calendar: &dyn HolidayCalendar, years: RangeInclusive<i32>) -> Self {
        Self::new(calendar.public_holidays(years.clone()), calendar.school_holidays(years))
    }

    pub fn with_public(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.public.extend(dates);
        self
    }

    pub fn with_school(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.school.extend(dates);
        self
    }

    pub fn contains(&self, kind: HolidayKind, date: NaiveDate) -> bool {
        match kind {
            HolidayKind::Public => self.public.contains(&date),
            HolidayKind::School => self.school.contains(&date),
        }
    }

    pub fn public(&self) -> &BTreeSet<NaiveDate> {
        &self.public
    }

    pub fn school(&self) -> &BTreeSet<NaiveDate> {
        &self.school
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl HolidayCalendar for Fixed {
        fn public_holidays(&self, years: RangeInclusive<i32>) -> Vec<NaiveDate> {
            years.filter_map(|y| NaiveDate::from_ymd_opt(y, 5, 1)).collect()
        }
    }

    #[test]
    fn calendar_fills_requested_years() {
        let sets = HolidaySets::from_calendar(&Fixed, 2018..=2020);
        assert_eq!(sets.public().len(), 3);
        assert!(sets.contains(HolidayKind::Public, date!("2019-05-01")));
        assert!(!sets.contains(HolidayKind::School, date!("2019-05-01")));
        assert!(sets.school().is_empty());
    }
}
