//! Business rules that gate persistence of a leg.
//!
//! Rules are checked in a fixed order and the first violation wins:
//! required text fields, pilot in command, time format, chronological
//! order, block time, flight time, taxi times.

use chrono::Duration;

use super::duration::DurationSet;
use super::event::LegTimes;
use super::leg::{CrewFields, DraftTimeError, LegDraft};

/// The first rule a draft violates.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Flight number is required")]
    MissingFlightNumber,

    #[error("Aircraft registration is required")]
    MissingAircraftRegistration,

    #[error("Aircraft type is required")]
    MissingAircraftType,

    #[error("Departure airport is required")]
    MissingDepartureAirport,

    #[error("Arrival airport is required")]
    MissingArrivalAirport,

    #[error("Pilot in Command name is required when not self")]
    MissingPilotInCommand,

    #[error("Times must follow: OUT → OFF → ON → IN")]
    InvalidTimeSequence,

    #[error("Time must be in HHmm format (e.g., 1230z)")]
    InvalidTimeFormat,

    #[error("Block time must be at least 1 minute")]
    InvalidBlockTime,

    #[error("Flight time must be at least 1 minute")]
    InvalidFlightTime,

    #[error("Taxi times cannot be negative")]
    InvalidTaxiTime,
}

impl ValidationError {
    /// Stable identifier, e.g. `"missingFlightNumber"`.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFlightNumber => "missingFlightNumber",
            Self::MissingAircraftRegistration => "missingAircraftRegistration",
            Self::MissingAircraftType => "missingAircraftType",
            Self::MissingDepartureAirport => "missingDepartureAirport",
            Self::MissingArrivalAirport => "missingArrivalAirport",
            Self::MissingPilotInCommand => "missingPilotInCommand",
            Self::InvalidTimeSequence => "invalidTimeSequence",
            Self::InvalidTimeFormat => "invalidTimeFormat",
            Self::InvalidBlockTime => "invalidBlockTime",
            Self::InvalidFlightTime => "invalidFlightTime",
            Self::InvalidTaxiTime => "invalidTaxiTime",
        }
    }
}

/// Minimum durations a leg must reach.
#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub min_block: Duration,
    pub min_flight: Duration,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_block: Duration::seconds(60),
            min_flight: Duration::seconds(60),
        }
    }
}

/// Validate a draft with the default rules.
///
/// Returns the normalized times on success so callers do not have to
/// normalize twice.
///
/// # Examples
///
/// ```
/// use logbook_server::domain::{LegDraft, ValidationError, validate};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
/// let draft = LegDraft::new(date).with_times(["1000", "1000", "1000", "1000"]);
///
/// // Fields are checked before times
/// assert_eq!(validate(&draft), Err(ValidationError::MissingFlightNumber));
/// ```
pub fn validate(draft: &LegDraft) -> Result<LegTimes, ValidationError> {
    validate_with(draft, &ValidationRules::default())
}

/// Validate a draft against explicit rules.
pub fn validate_with(draft: &LegDraft, rules: &ValidationRules) -> Result<LegTimes, ValidationError> {
    check_fields(
        [
            draft.flight_number.as_str(),
            draft.aircraft_registration.as_str(),
            draft.aircraft_type.as_str(),
            draft.departure_airport.as_str(),
            draft.arrival_airport.as_str(),
        ],
        &draft.crew,
    )?;

    let times = draft.normalized().map_err(|e| match e {
        DraftTimeError::Parse { .. } => ValidationError::InvalidTimeFormat,
        DraftTimeError::OutOfRange(_) => ValidationError::InvalidTimeSequence,
    })?;

    check_times(&times, rules)?;
    Ok(times)
}

/// Required text fields in catalog order: flight number, registration,
/// type, departure, arrival.
pub(super) fn check_fields(fields: [&str; 5], crew: &CrewFields) -> Result<(), ValidationError> {
    let errors = [
        ValidationError::MissingFlightNumber,
        ValidationError::MissingAircraftRegistration,
        ValidationError::MissingAircraftType,
        ValidationError::MissingDepartureAirport,
        ValidationError::MissingArrivalAirport,
    ];
    for (value, error) in fields.into_iter().zip(errors) {
        require(value, error)?;
    }

    if !crew.is_self {
        require(&crew.pilot_in_command, ValidationError::MissingPilotInCommand)?;
    }
    Ok(())
}

/// Ordering and minimum-duration rules on normalized times.
pub(super) fn check_times(times: &LegTimes, rules: &ValidationRules) -> Result<(), ValidationError> {
    if !times.is_chronological() {
        return Err(ValidationError::InvalidTimeSequence);
    }

    let durations = DurationSet::compute(times);
    if durations.block < rules.min_block {
        return Err(ValidationError::InvalidBlockTime);
    }
    if durations.flight < rules.min_flight {
        return Err(ValidationError::InvalidFlightTime);
    }
    if durations.taxi_out < Duration::zero() || durations.taxi_in < Duration::zero() {
        return Err(ValidationError::InvalidTaxiTime);
    }
    Ok(())
}

/// Whitespace-only counts as empty.
fn require(value: &str, error: ValidationError) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error)
    } else {
        Ok(())
    }
}
