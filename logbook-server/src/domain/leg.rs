//! Flight leg types.
//!
//! A [`LegDraft`] is what the edit surface and the importer work with: the
//! four time entries are kept as the raw text the user typed. Instants are
//! never stored on the draft; [`LegDraft::normalized`] derives them on demand,
//! so raw and normalized values cannot drift apart.
//!
//! A [`FlightLeg`] is a validated, normalized leg ready for persistence. It
//! is only produced by [`LegDraft::commit`].

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::clock::{ClockParseError, DayAdjustment, RawClockTime};
use super::duration::DurationSet;
use super::event::{FlightEvent, LegTimes};
use super::normalize::{DateOutOfRange, NormalizationContext, normalize_with_adjustments};
use super::validate::{ValidationError, ValidationRules, check_fields, check_times, validate};

/// Crew details that affect validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewFields {
    /// The logbook owner was pilot in command.
    pub is_self: bool,

    /// Name of the pilot in command; required when `is_self` is false.
    pub pilot_in_command: String,

    /// The logbook owner was pilot flying.
    #[serde(default)]
    pub is_pilot_flying: bool,
}

impl CrewFields {
    /// Crew fields for a self-flown leg.
    pub fn self_flown() -> Self {
        Self {
            is_self: true,
            pilot_in_command: String::new(),
            is_pilot_flying: true,
        }
    }

    /// Crew fields for a leg under another pilot in command.
    pub fn under(pilot_in_command: impl Into<String>) -> Self {
        Self {
            is_self: false,
            pilot_in_command: pilot_in_command.into(),
            is_pilot_flying: false,
        }
    }
}

/// Error deriving instants from a draft's time entries.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftTimeError {
    /// One of the entries is not a valid strict "HHmm" time.
    #[error("{event} time: {source}")]
    Parse {
        event: FlightEvent,
        source: ClockParseError,
    },

    /// The resolved instants left chrono's date range.
    #[error(transparent)]
    OutOfRange(#[from] DateOutOfRange),
}

/// Capability to receive a picked instant for one event.
///
/// Implemented by every context that lets a user set a time from a picker
/// rather than by typing.
pub trait TimeUpdatable {
    /// Set `event` from an absolute instant.
    fn update_time(&mut self, instant: DateTime<Utc>, event: FlightEvent);
}

/// A leg being edited or imported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegDraft {
    /// Set when editing an existing leg.
    #[serde(default)]
    pub id: Option<Uuid>,

    /// Nominal flight date (UTC calendar day).
    pub date: NaiveDate,

    pub flight_number: String,
    pub aircraft_registration: String,
    pub aircraft_type: String,
    pub departure_airport: String,
    pub arrival_airport: String,

    #[serde(default)]
    pub crew: CrewFields,

    /// Raw OUT, OFF, ON, IN entries.
    times: [String; 4],
}

impl LegDraft {
    /// An empty draft for `date` with blank fields and times.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: None,
            date,
            flight_number: String::new(),
            aircraft_registration: String::new(),
            aircraft_type: String::new(),
            departure_airport: String::new(),
            arrival_airport: String::new(),
            crew: CrewFields::default(),
            times: Default::default(),
        }
    }

    /// A fresh draft with placeholder times: OUT now, OFF +30 min, ON +2 h,
    /// IN +2.5 h.
    pub fn placeholder(now: DateTime<Utc>) -> Self {
        let mut draft = Self::new(now.date_naive());
        let offsets = [0, 30, 120, 150];
        for event in FlightEvent::ALL {
            let instant = now + Duration::minutes(offsets[event.index()]);
            draft.set_time(event, RawClockTime::from_time(&instant).to_string());
        }
        draft
    }

    /// A draft for editing a stored leg.
    ///
    /// Entries are plain "HHmm" wherever inference reproduces the stored
    /// instant; otherwise a `(+1)`/`(-1)`/`(0)` marker relative to the
    /// flight date is kept so the leg round-trips exactly.
    pub fn from_leg(leg: &FlightLeg) -> Self {
        let mut draft = Self {
            id: Some(leg.id),
            date: leg.date,
            flight_number: leg.flight_number.clone(),
            aircraft_registration: leg.aircraft_registration.clone(),
            aircraft_type: leg.aircraft_type.clone(),
            departure_airport: leg.departure_airport.clone(),
            arrival_airport: leg.arrival_airport.clone(),
            crew: leg.crew.clone(),
            times: Default::default(),
        };

        let mut context = NormalizationContext::new(leg.date);
        for event in FlightEvent::ALL {
            let stored = leg.times.get(event);
            let raw = RawClockTime::from_time(&stored);
            let inferred = context.resolve(raw).ok();

            let entry = if inferred == Some(stored) {
                raw.to_string()
            } else {
                match day_marker(leg.date, stored) {
                    Some(adj) => format!("{raw} {}", adj.annotation()),
                    None => raw.to_string(),
                }
            };

            draft.times[event.index()] = entry;
            context = NormalizationContext::after(leg.date, stored);
        }

        draft
    }

    /// The raw entry for one event.
    pub fn time(&self, event: FlightEvent) -> &str {
        &self.times[event.index()]
    }

    /// All four raw entries in OUT, OFF, ON, IN order.
    pub fn times(&self) -> &[String; 4] {
        &self.times
    }

    /// Replace the raw entry for one event.
    ///
    /// Later events are re-resolved on the next call to
    /// [`LegDraft::normalized`].
    pub fn set_time(&mut self, event: FlightEvent, entry: impl Into<String>) {
        self.times[event.index()] = entry.into();
    }

    /// Builder-style [`LegDraft::set_time`] for all four entries.
    pub fn with_times(mut self, times: [&str; 4]) -> Self {
        self.times = times.map(str::to_string);
        self
    }

    /// Strictly parse every entry, keeping any day marker.
    pub fn parsed_times(
        &self,
    ) -> Result<[(RawClockTime, Option<DayAdjustment>); 4], DraftTimeError> {
        let parse = |event: FlightEvent| {
            RawClockTime::parse_annotated(self.time(event))
                .map_err(|source| DraftTimeError::Parse { event, source })
        };
        Ok([
            parse(FlightEvent::Out)?,
            parse(FlightEvent::Off)?,
            parse(FlightEvent::On)?,
            parse(FlightEvent::In)?,
        ])
    }

    /// Resolve the entries into absolute instants.
    pub fn normalized(&self) -> Result<LegTimes, DraftTimeError> {
        let parsed = self.parsed_times()?;
        Ok(normalize_with_adjustments(self.date, parsed)?)
    }

    /// Validate and turn the draft into a persistable leg.
    ///
    /// A draft without an id gets a fresh one.
    pub fn commit(self) -> Result<FlightLeg, ValidationError> {
        let times = validate(&self)?;
        Ok(FlightLeg {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            date: self.date,
            flight_number: self.flight_number.trim().to_string(),
            aircraft_registration: self.aircraft_registration.trim().to_string(),
            aircraft_type: self.aircraft_type.trim().to_string(),
            departure_airport: self.departure_airport.trim().to_string(),
            arrival_airport: self.arrival_airport.trim().to_string(),
            crew: self.crew,
            times,
        })
    }
}

impl TimeUpdatable for LegDraft {
    /// Writes the instant's HHmm into the entry. Setting OUT also moves the
    /// flight date to the instant's UTC day.
    fn update_time(&mut self, instant: DateTime<Utc>, event: FlightEvent) {
        if event == FlightEvent::Out {
            self.date = instant.date_naive();
        }
        self.set_time(event, RawClockTime::from_time(&instant).to_string());
    }
}

/// Marker that puts `instant` on its own day relative to `flight_date`.
fn day_marker(flight_date: NaiveDate, instant: DateTime<Utc>) -> Option<DayAdjustment> {
    match (instant.date_naive() - flight_date).num_days() {
        -1 => Some(DayAdjustment::Previous),
        0 => Some(DayAdjustment::Same),
        1 => Some(DayAdjustment::Next),
        _ => None,
    }
}

/// A validated, normalized flight leg.
///
/// # Invariants
///
/// - `out <= off <= on <= in`
/// - block and flight time are at least one minute
/// - required text fields are non-empty
///
/// Deserializing re-checks these, so a hand-edited store file cannot bring
/// in a leg that `commit` would have refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredLeg")]
pub struct FlightLeg {
    id: Uuid,
    date: NaiveDate,
    flight_number: String,
    aircraft_registration: String,
    aircraft_type: String,
    departure_airport: String,
    arrival_airport: String,
    crew: CrewFields,
    times: LegTimes,
}

impl FlightLeg {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn flight_number(&self) -> &str {
        &self.flight_number
    }

    pub fn aircraft_registration(&self) -> &str {
        &self.aircraft_registration
    }

    pub fn aircraft_type(&self) -> &str {
        &self.aircraft_type
    }

    pub fn departure_airport(&self) -> &str {
        &self.departure_airport
    }

    pub fn arrival_airport(&self) -> &str {
        &self.arrival_airport
    }

    pub fn crew(&self) -> &CrewFields {
        &self.crew
    }

    pub fn times(&self) -> &LegTimes {
        &self.times
    }

    /// Block, flight and taxi intervals.
    pub fn durations(&self) -> DurationSet {
        DurationSet::compute(&self.times)
    }
}

/// Unchecked wire form of [`FlightLeg`].
#[derive(Deserialize)]
struct StoredLeg {
    id: Uuid,
    date: NaiveDate,
    flight_number: String,
    aircraft_registration: String,
    aircraft_type: String,
    departure_airport: String,
    arrival_airport: String,
    crew: CrewFields,
    times: LegTimes,
}

impl TryFrom<StoredLeg> for FlightLeg {
    type Error = ValidationError;

    fn try_from(stored: StoredLeg) -> Result<Self, Self::Error> {
        check_fields(
            [
                stored.flight_number.as_str(),
                stored.aircraft_registration.as_str(),
                stored.aircraft_type.as_str(),
                stored.departure_airport.as_str(),
                stored.arrival_airport.as_str(),
            ],
            &stored.crew,
        )?;
        check_times(&stored.times, &ValidationRules::default())?;

        Ok(Self {
            id: stored.id,
            date: stored.date,
            flight_number: stored.flight_number,
            aircraft_registration: stored.aircraft_registration,
            aircraft_type: stored.aircraft_type,
            departure_airport: stored.departure_airport,
            arrival_airport: stored.arrival_airport,
            crew: stored.crew,
            times: stored.times,
        })
    }
}
