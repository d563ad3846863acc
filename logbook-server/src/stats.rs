//! Monthly and all-time logbook totals.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Duration};
use serde::Serialize;

use crate::domain::{FlightLeg, format_duration};

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    /// Month of a leg's nominal flight date.
    pub fn of(leg: &FlightLeg) -> Self {
        Self {
            year: leg.date().year(),
            month: leg.date().month(),
        }
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Accumulated time over a set of legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub legs: usize,
    pub self_flown_legs: usize,
    pub pilot_flying_legs: usize,
    pub block: Duration,
    pub flight: Duration,
    pub taxi: Duration,
}

impl Default for Totals {
    fn default() -> Self {
        Self {
            legs: 0,
            self_flown_legs: 0,
            pilot_flying_legs: 0,
            block: Duration::zero(),
            flight: Duration::zero(),
            taxi: Duration::zero(),
        }
    }
}

impl Totals {
    /// Add one leg.
    pub fn add(&mut self, leg: &FlightLeg) {
        let d = leg.durations();
        self.legs += 1;
        if leg.crew().is_self {
            self.self_flown_legs += 1;
        }
        if leg.crew().is_pilot_flying {
            self.pilot_flying_legs += 1;
        }
        self.block += d.block;
        self.flight += d.flight;
        self.taxi += d.taxi();
    }

    /// Block time rendered as `H:MM`.
    pub fn block_display(&self) -> String {
        format_duration(self.block)
    }

    /// Flight time rendered as `H:MM`.
    pub fn flight_display(&self) -> String {
        format_duration(self.flight)
    }
}

/// Totals over every leg.
pub fn all_time_totals<'a>(legs: impl IntoIterator<Item = &'a FlightLeg>) -> Totals {
    let mut totals = Totals::default();
    for leg in legs {
        totals.add(leg);
    }
    totals
}

/// Totals per calendar month of the flight date, oldest first.
pub fn monthly_totals<'a>(
    legs: impl IntoIterator<Item = &'a FlightLeg>,
) -> BTreeMap<MonthKey, Totals> {
    let mut months: BTreeMap<MonthKey, Totals> = BTreeMap::new();
    for leg in legs {
        months.entry(MonthKey::of(leg)).or_default().add(leg);
    }
    months
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CrewFields, LegDraft};
    use chrono::NaiveDate;

    fn leg(y: i32, m: u32, d: u32, times: [&str; 4], crew: CrewFields) -> FlightLeg {
        let mut draft = LegDraft::new(NaiveDate::from_ymd_opt(y, m, d).unwrap()).with_times(times);
        draft.flight_number = "BA1".into();
        draft.aircraft_registration = "G-EUPA".into();
        draft.aircraft_type = "A319".into();
        draft.departure_airport = "EGLL".into();
        draft.arrival_airport = "EDDF".into();
        draft.crew = crew;
        draft.commit().unwrap()
    }

    #[test]
    fn empty_logbook() {
        let legs: Vec<FlightLeg> = Vec::new();
        let totals = all_time_totals(&legs);
        assert_eq!(totals, Totals::default());
        assert_eq!(totals.block_display(), "0:00");
        assert!(monthly_totals(&legs).is_empty());
    }

    #[test]
    fn all_time_sums() {
        let legs = [
            leg(2024, 10, 1, ["0800", "0815", "0930", "0940"], CrewFields::self_flown()),
            leg(2024, 10, 1, ["1100", "1110", "1200", "1205"], CrewFields::under("Smith")),
        ];
        let totals = all_time_totals(&legs);

        assert_eq!(totals.legs, 2);
        assert_eq!(totals.self_flown_legs, 1);
        assert_eq!(totals.pilot_flying_legs, 1);
        assert_eq!(totals.block, Duration::minutes(100 + 65));
        assert_eq!(totals.flight, Duration::minutes(75 + 50));
        assert_eq!(totals.taxi, Duration::minutes(25 + 15));
        assert_eq!(totals.block_display(), "2:45");
        assert_eq!(totals.flight_display(), "2:05");
    }

    #[test]
    fn monthly_grouping_uses_flight_date() {
        let legs = [
            // Overnight leg dated the 31st counts toward October
            leg(2024, 10, 31, ["2300", "2315", "0130", "0140"], CrewFields::self_flown()),
            leg(2024, 11, 1, ["0800", "0815", "0930", "0940"], CrewFields::self_flown()),
            leg(2024, 9, 2, ["0800", "0815", "0930", "0940"], CrewFields::self_flown()),
        ];
        let months = monthly_totals(&legs);

        let keys: Vec<String> = months.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["2024-09", "2024-10", "2024-11"]);
        assert_eq!(
            months[&MonthKey { year: 2024, month: 10 }].block,
            Duration::minutes(160)
        );
    }

    #[test]
    fn month_key_serializes_as_string() {
        let key = MonthKey { year: 2024, month: 3 };
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-03\"");
    }
}
