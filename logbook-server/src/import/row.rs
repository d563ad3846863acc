//! Conversion of tokenized logbook rows into legs.
//!
//! Tokenizing pasted text is the caller's job. This module receives each
//! row as a list of string tokens plus a [`ColumnMapping`] saying which
//! token holds which field. A bad row is reported and skipped; it never
//! aborts the batch.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{CrewFields, DayAdjustment, FlightEvent, FlightLeg, LegDraft, ValidationError};

use super::extractor::LogImportTimeExtractor;

/// Which token index holds each field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: usize,
    pub flight_number: usize,
    pub aircraft_registration: usize,
    pub aircraft_type: usize,
    pub departure_airport: usize,
    pub arrival_airport: usize,
    pub out: usize,
    pub off: usize,
    pub on: usize,
    #[serde(rename = "in")]
    pub r#in: usize,

    /// Pilot in command name. Rows without one are treated as self-flown.
    #[serde(default)]
    pub pilot_in_command: Option<usize>,

    /// Separate `+1`/`-1` day marker columns. A marker here wins over one
    /// embedded in the time token; an empty cell means no marker.
    #[serde(default)]
    pub out_day: Option<usize>,
    #[serde(default)]
    pub off_day: Option<usize>,
    #[serde(default)]
    pub on_day: Option<usize>,
    #[serde(default)]
    pub in_day: Option<usize>,
}

impl ColumnMapping {
    /// Column holding the given event's time.
    pub fn time_column(&self, event: FlightEvent) -> usize {
        match event {
            FlightEvent::Out => self.out,
            FlightEvent::Off => self.off,
            FlightEvent::On => self.on,
            FlightEvent::In => self.r#in,
        }
    }

    /// Column holding the given event's day marker, if mapped.
    pub fn day_column(&self, event: FlightEvent) -> Option<usize> {
        match event {
            FlightEvent::Out => self.out_day,
            FlightEvent::Off => self.off_day,
            FlightEvent::On => self.on_day,
            FlightEvent::In => self.in_day,
        }
    }
}

impl Default for ColumnMapping {
    /// `DATE FLT REG TYPE DEP ARR OUT OFF ON IN`
    fn default() -> Self {
        Self {
            date: 0,
            flight_number: 1,
            aircraft_registration: 2,
            aircraft_type: 3,
            departure_airport: 4,
            arrival_airport: 5,
            out: 6,
            off: 7,
            on: 8,
            r#in: 9,
            pilot_in_command: None,
            out_day: None,
            off_day: None,
            on_day: None,
            in_day: None,
        }
    }
}

/// One tokenized row of import text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRow {
    /// Line number in the source text, for reporting.
    pub line: usize,
    pub tokens: Vec<String>,
}

impl ImportRow {
    pub fn new(line: usize, tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            line,
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    fn column(&self, index: usize, field: &'static str) -> Result<&str, ImportRowError> {
        self.tokens
            .get(index)
            .map(|t| t.trim())
            .ok_or(ImportRowError::MissingColumn { field, index })
    }
}

/// Why a single row could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImportRowError {
    /// The row has fewer tokens than the mapping expects.
    #[error("missing column {index} ({field})")]
    MissingColumn { field: &'static str, index: usize },

    /// The date token is not in a recognised format.
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// A time token could not be resolved.
    #[error("unresolved {event} time: {token:?}")]
    UnresolvedTime { event: FlightEvent, token: String },

    /// A day marker cell is not `+1`, `-1` or `0`.
    #[error("invalid {event} day marker: {token:?}")]
    InvalidDayMarker { event: FlightEvent, token: String },

    /// The row parsed but the leg fails validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A row that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFailure {
    pub line: usize,
    pub error: ImportRowError,
}

/// A row that validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedLeg {
    pub line: usize,
    pub leg: FlightLeg,
}

/// Outcome of importing a batch of rows.
#[derive(Debug, Clone, Default)]
pub struct ImportReport {
    /// Validated legs, in row order.
    pub legs: Vec<ImportedLeg>,
    /// Skipped rows, in row order.
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    /// Total rows seen.
    pub fn rows(&self) -> usize {
        self.legs.len() + self.failures.len()
    }
}

/// Date formats seen in logbook exports.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%d%b%y", "%d%b%Y"];

/// Parse an import date token.
pub fn parse_import_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Convert one row into a draft, resolving every time token.
pub fn row_to_draft(row: &ImportRow, mapping: &ColumnMapping) -> Result<LegDraft, ImportRowError> {
    let date_token = row.column(mapping.date, "date")?;
    let date = parse_import_date(date_token)
        .ok_or_else(|| ImportRowError::InvalidDate(date_token.to_string()))?;

    let mut draft = LegDraft::new(date);
    draft.flight_number = row.column(mapping.flight_number, "flight number")?.to_string();
    draft.aircraft_registration = row
        .column(mapping.aircraft_registration, "aircraft registration")?
        .to_string();
    draft.aircraft_type = row.column(mapping.aircraft_type, "aircraft type")?.to_string();
    draft.departure_airport = row
        .column(mapping.departure_airport, "departure airport")?
        .to_uppercase();
    draft.arrival_airport = row
        .column(mapping.arrival_airport, "arrival airport")?
        .to_uppercase();

    draft.crew = match mapping.pilot_in_command {
        Some(index) => {
            let pic = row.column(index, "pilot in command")?;
            if pic.is_empty() || pic.eq_ignore_ascii_case("self") {
                CrewFields::self_flown()
            } else {
                CrewFields::under(pic)
            }
        }
        None => CrewFields::self_flown(),
    };

    let mut extractor = LogImportTimeExtractor::new(date);
    for event in FlightEvent::ALL {
        let token = row.column(mapping.time_column(event), event.label())?;
        let marker = match mapping.day_column(event) {
            Some(index) => day_marker(row, index, event)?,
            None => None,
        };
        let time = extractor
            .extract_time(token, marker)
            .ok_or_else(|| ImportRowError::UnresolvedTime {
                event,
                token: token.to_string(),
            })?;
        draft.set_time(event, time.entry());
    }

    Ok(draft)
}

fn day_marker(
    row: &ImportRow,
    index: usize,
    event: FlightEvent,
) -> Result<Option<DayAdjustment>, ImportRowError> {
    let token = row.column(index, "day marker")?;
    if token.is_empty() {
        return Ok(None);
    }
    DayAdjustment::parse(token)
        .map(Some)
        .ok_or_else(|| ImportRowError::InvalidDayMarker {
            event,
            token: token.to_string(),
        })
}

/// Convert and validate one row.
pub fn import_row(row: &ImportRow, mapping: &ColumnMapping) -> Result<FlightLeg, ImportRowError> {
    Ok(row_to_draft(row, mapping)?.commit()?)
}

/// Import a batch, collecting per-row failures.
pub fn import_rows(rows: &[ImportRow], mapping: &ColumnMapping) -> ImportReport {
    let mut report = ImportReport::default();

    for row in rows {
        match import_row(row, mapping) {
            Ok(leg) => report.legs.push(ImportedLeg {
                line: row.line,
                leg,
            }),
            Err(error) => {
                warn!(line = row.line, %error, "skipping import row");
                report.failures.push(RowFailure {
                    line: row.line,
                    error,
                });
            }
        }
    }

    debug!(
        imported = report.legs.len(),
        skipped = report.failures.len(),
        "import batch complete"
    );
    report
}
