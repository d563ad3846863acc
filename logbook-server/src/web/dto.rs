//! Data transfer objects for web requests and responses.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    CrewFields, DurationSet, FlightEvent, FlightLeg, LegDraft, LegTimes, ValidationError,
    format_duration, format_zulu,
};
use crate::import::{ColumnMapping, ImportRow};
use crate::logbook::ImportOutcome;
use crate::stats::{MonthKey, Totals};

/// Request to preview normalization of partially typed times.
#[derive(Debug, Deserialize)]
pub struct TimesPreviewRequest {
    /// Flight date (defaults to today, UTC)
    pub date: Option<NaiveDate>,

    pub out: String,
    pub off: String,
    pub on: String,
    #[serde(rename = "in")]
    pub r#in: String,
}

impl TimesPreviewRequest {
    /// Entries in OUT, OFF, ON, IN order.
    pub fn entries(&self) -> [&str; 4] {
        [&self.out, &self.off, &self.on, &self.r#in]
    }
}

/// One resolved event.
#[derive(Debug, Serialize)]
pub struct EventResult {
    /// Event name, e.g. "OFF"
    pub event: &'static str,

    /// Absolute UTC instant
    pub instant: DateTime<Utc>,

    /// Zulu display, e.g. "0024z (+1)"
    pub display: String,
}

/// Block, flight and taxi times as `H:MM`.
#[derive(Debug, Serialize)]
pub struct DurationsResult {
    pub block: String,
    pub flight: String,
    pub taxi_out: String,
    pub taxi_in: String,
}

/// Response for a times preview.
#[derive(Debug, Serialize)]
pub struct TimesPreviewResponse {
    pub date: NaiveDate,
    pub events: Vec<EventResult>,
    pub durations: DurationsResult,
}

/// A leg as submitted for validation or saving.
#[derive(Debug, Deserialize)]
pub struct LegRequest {
    /// Nominal flight date
    pub date: NaiveDate,

    pub flight_number: String,
    pub aircraft_registration: String,
    pub aircraft_type: String,
    pub departure_airport: String,
    pub arrival_airport: String,

    /// Whether the user was pilot in command
    #[serde(default)]
    pub is_self: bool,

    /// Pilot in command name when not self
    #[serde(default)]
    pub pilot_in_command: String,

    #[serde(default)]
    pub is_pilot_flying: bool,

    /// Raw "HHmm" entries, optionally with a "(+1)" style marker
    pub out: String,
    pub off: String,
    pub on: String,
    #[serde(rename = "in")]
    pub r#in: String,
}

impl LegRequest {
    /// Convert into an editable draft.
    pub fn into_draft(self, id: Option<Uuid>) -> LegDraft {
        let mut draft = LegDraft::new(self.date).with_times([
            self.out.as_str(),
            self.off.as_str(),
            self.on.as_str(),
            self.r#in.as_str(),
        ]);
        draft.id = id;
        draft.flight_number = self.flight_number;
        draft.aircraft_registration = self.aircraft_registration;
        draft.aircraft_type = self.aircraft_type;
        draft.departure_airport = self.departure_airport;
        draft.arrival_airport = self.arrival_airport;
        draft.crew = CrewFields {
            is_self: self.is_self,
            pilot_in_command: self.pilot_in_command,
            is_pilot_flying: self.is_pilot_flying,
        };
        draft
    }
}

/// A stored leg.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub id: Uuid,
    pub date: NaiveDate,
    pub flight_number: String,
    pub aircraft_registration: String,
    pub aircraft_type: String,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub is_self: bool,
    pub pilot_in_command: String,
    pub is_pilot_flying: bool,
    pub events: Vec<EventResult>,
    pub durations: DurationsResult,
}

/// Result of validating a leg without saving it.
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,

    /// First violated rule, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorResponse>,

    /// Durations of the normalized times, when they could be computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durations: Option<DurationsResult>,
}

/// Request to import tokenized rows.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    /// Token lists, one per row
    pub rows: Vec<Vec<String>>,

    /// Column layout (defaults to `DATE FLT REG TYPE DEP ARR OUT OFF ON IN`)
    #[serde(default)]
    pub mapping: ColumnMapping,
}

impl ImportRequest {
    /// Rows numbered from 1.
    pub fn import_rows(&self) -> Vec<ImportRow> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, tokens)| ImportRow::new(i + 1, tokens.iter().map(String::as_str)))
            .collect()
    }
}

/// A skipped import row.
#[derive(Debug, Serialize)]
pub struct ImportFailureResult {
    pub line: usize,
    pub error: String,
}

/// Response for an import.
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: Vec<LegResult>,
    pub failures: Vec<ImportFailureResult>,
}

/// Totals over a set of legs.
#[derive(Debug, Serialize)]
pub struct TotalsResult {
    pub legs: usize,
    pub self_flown_legs: usize,
    pub pilot_flying_legs: usize,
    pub block: String,
    pub flight: String,
    pub taxi: String,
}

/// Totals for one month.
#[derive(Debug, Serialize)]
pub struct MonthTotalsResult {
    /// "YYYY-MM"
    pub month: MonthKey,
    #[serde(flatten)]
    pub totals: TotalsResult,
}

/// Response for logbook statistics.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub all_time: TotalsResult,
    pub monthly: Vec<MonthTotalsResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,

    /// Stable code for validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
}

impl From<ValidationError> for ErrorResponse {
    fn from(e: ValidationError) -> Self {
        Self {
            error: e.to_string(),
            code: Some(e.code()),
        }
    }
}

// Conversion implementations

impl EventResult {
    /// All four events, displayed relative to OUT.
    pub fn from_times(times: &LegTimes) -> Vec<Self> {
        FlightEvent::ALL
            .into_iter()
            .map(|event| {
                let instant = times.get(event);
                let reference = (event != FlightEvent::Out).then_some(times.out);
                Self {
                    event: event.label(),
                    instant,
                    display: format_zulu(instant, reference),
                }
            })
            .collect()
    }
}

impl DurationsResult {
    pub fn from_durations(d: &DurationSet) -> Self {
        Self {
            block: format_duration(d.block),
            flight: format_duration(d.flight),
            taxi_out: format_duration(d.taxi_out),
            taxi_in: format_duration(d.taxi_in),
        }
    }
}

impl LegResult {
    /// Create from a stored leg.
    pub fn from_leg(leg: &FlightLeg) -> Self {
        let crew = leg.crew();
        Self {
            id: leg.id(),
            date: leg.date(),
            flight_number: leg.flight_number().to_string(),
            aircraft_registration: leg.aircraft_registration().to_string(),
            aircraft_type: leg.aircraft_type().to_string(),
            departure_airport: leg.departure_airport().to_string(),
            arrival_airport: leg.arrival_airport().to_string(),
            is_self: crew.is_self,
            pilot_in_command: crew.pilot_in_command.clone(),
            is_pilot_flying: crew.is_pilot_flying,
            events: EventResult::from_times(leg.times()),
            durations: DurationsResult::from_durations(&leg.durations()),
        }
    }
}

impl ImportResponse {
    pub fn from_outcome(outcome: &ImportOutcome) -> Self {
        let mut failures: Vec<ImportFailureResult> = outcome
            .rejected
            .iter()
            .map(|f| ImportFailureResult {
                line: f.line,
                error: f.error.to_string(),
            })
            .chain(outcome.store_failures.iter().map(|f| ImportFailureResult {
                line: f.line,
                error: f.error.to_string(),
            }))
            .collect();
        failures.sort_by_key(|f| f.line);

        Self {
            imported: outcome.saved.iter().map(LegResult::from_leg).collect(),
            failures,
        }
    }
}

impl TotalsResult {
    pub fn from_totals(t: &Totals) -> Self {
        Self {
            legs: t.legs,
            self_flown_legs: t.self_flown_legs,
            pilot_flying_legs: t.pilot_flying_legs,
            block: t.block_display(),
            flight: t.flight_display(),
            taxi: format_duration(t.taxi),
        }
    }
}
