//! Solar collaborator and the per-date solar hours cache.
//!
//! Computing sunrise and friends is out of scope: a [`SolarProvider`] maps a
//! [`Location`] and a date to [`SolarHours`]. A `None` event means it does not
//! happen that day (polar day or night) and surfaces as
//! `Error::SolarHoursUnavailable` when a rule needs it.

use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use chrono::{NaiveDate, NaiveTime};

use crate::time_expr::SolarEvent;

/// Local clock times of the solar events on one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SolarHours {
    pub dawn: Option<NaiveTime>,
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    pub dusk: Option<NaiveTime>,
}

impl SolarHours {
    pub fn get(&self, event: SolarEvent) -> Option<NaiveTime> {
        match event {
            SolarEvent::Dawn => self.dawn,
            SolarEvent::Sunrise => self.sunrise,
            SolarEvent::Sunset => self.sunset,
            SolarEvent::Dusk => self.dusk,
        }
    }
}

/// Where the facility is. Only the solar provider looks at it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// IANA timezone name, e.g. `Europe/Paris`.
    pub timezone: Option<String>,
    /// Elevation in meters.
    pub elevation: f64,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude, ..Self::default() }
    }
}

pub trait SolarProvider: Send + Sync {
    fn solar_hours(&self, location: &Location, date: NaiveDate) -> SolarHours;
}

impl<F> SolarProvider for F
where
    F: Fn(&Location, NaiveDate) -> SolarHours + Send + Sync,
{
    fn solar_hours(&self, location: &Location, date: NaiveDate) -> SolarHours {
        self(location, date)
    }
}

/// The same solar hours every day, for callers that set them by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixedSolarHours(pub SolarHours);

impl SolarProvider for FixedSolarHours {
    fn solar_hours(&self, _location: &Location, _date: NaiveDate) -> SolarHours {
        self.0
    }
}

/// Solar hours already fetched, keyed by date.
///
/// Concurrent callers may both compute the same date; the last write wins,
/// which is harmless since the provider is deterministic for a date.
#[derive(Default)]
pub(crate) struct SolarCache {
    entries: RwLock<HashMap<NaiveDate, SolarHours>>,
}

impl SolarCache {
    pub fn get_or_insert_with(&self, date: NaiveDate, fetch: impl FnOnce() -> SolarHours) -> SolarHours {
        let cached = match self.entries.read() {
            Ok(entries) => entries.get(&date).copied(),
            Err(poisoned) => poisoned.into_inner().get(&date).copied(),
        };
        if let Some(hours) = cached {
            return hours;
        }

        let hours = fetch();
        match self.entries.write() {
            Ok(mut entries) => entries.insert(date, hours),
            Err(poisoned) => poisoned.into_inner().insert(date, hours),
        };
        hours
    }

    pub fn len(&self) -> usize {
        match self.entries.read() {
            Ok(entries) => entries.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl Clone for SolarCache {
    fn clone(&self) -> Self {
        let entries = match self.entries.read() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        Self { entries: RwLock::new(entries) }
    }
}

impl fmt::Debug for SolarCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolarCache").field("dates", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn closures_are_providers() {
        let provider = |_: &Location, _: NaiveDate| SolarHours { sunrise: NaiveTime::from_hms_opt(6, 0, 0), ..SolarHours::default() };
        let hours = provider.solar_hours(&Location::new(48.85, 2.35), date!("2018-06-01"));
        assert_eq!(hours.get(SolarEvent::Sunrise), NaiveTime::from_hms_opt(6, 0, 0));
        assert_eq!(hours.get(SolarEvent::Dusk), None);
    }

    #[test]
    fn cache_fetches_each_date_once() {
        let cache = SolarCache::default();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            cache.get_or_insert_with(date!("2018-06-01"), || {
                calls.fetch_add(1, Ordering::SeqCst);
                SolarHours::default()
            });
        }
        cache.get_or_insert_with(date!("2018-06-02"), SolarHours::default);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 2);
    }
}
