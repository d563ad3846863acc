//! Day-rollover inference for OUT/OFF/ON/IN sequences.
//!
//! Pilots record four bare "HHmm" times per leg. A leg that crosses
//! midnight has times that appear to go backwards (e.g. OUT 2350, OFF
//! 0010). Each event is resolved against the instant of the event before
//! it: the candidate lands on the predecessor's calendar day, and moves
//! forward one day if that would put it before the predecessor.
//!
//! OUT is anchored to the start of the flight date, so it always lands on
//! the flight date itself.
//!
//! At most one rollover is inferred per step. Two consecutive events more
//! than 24 hours apart cannot be told apart from a same-day pair and will
//! resolve a day (or more) too early.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use tracing::trace;

use super::clock::{DayAdjustment, RawClockTime};
use super::event::{FlightEvent, LegTimes};

/// Error returned when a resolved instant falls outside chrono's date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("date out of range near {0}")]
pub struct DateOutOfRange(pub NaiveDate);

/// The anchor used to resolve a [`RawClockTime`] into an absolute instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationContext {
    flight_date: NaiveDate,
    previous: DateTime<Utc>,
}

impl NormalizationContext {
    /// Context for the first event of a leg: the previous instant is
    /// midnight at the start of `flight_date`.
    pub fn new(flight_date: NaiveDate) -> Self {
        Self {
            flight_date,
            previous: start_of_day(flight_date),
        }
    }

    /// Context anchored on an already resolved instant.
    pub fn after(flight_date: NaiveDate, previous: DateTime<Utc>) -> Self {
        Self {
            flight_date,
            previous,
        }
    }

    /// The nominal flight date.
    pub fn flight_date(&self) -> NaiveDate {
        self.flight_date
    }

    /// The instant the next event is resolved against.
    pub fn previous(&self) -> DateTime<Utc> {
        self.previous
    }

    /// Resolve by inference: the previous instant's day plus `raw`, moved
    /// one day forward if that is strictly earlier than the previous instant.
    pub fn resolve(&self, raw: RawClockTime) -> Result<DateTime<Utc>, DateOutOfRange> {
        let day = self.previous.date_naive();
        let candidate = day.and_time(raw.to_naive_time()).and_utc();

        if candidate >= self.previous {
            return Ok(candidate);
        }

        let rolled = candidate
            .checked_add_days(Days::new(1))
            .ok_or(DateOutOfRange(day))?;
        trace!(
            previous = %self.previous,
            raw = %raw,
            resolved = %rolled,
            "inferred day rollover"
        );
        Ok(rolled)
    }

    /// Resolve with an explicit day marker, relative to the flight date.
    ///
    /// The marker replaces inference for this event only.
    pub fn resolve_explicit(
        &self,
        raw: RawClockTime,
        adjustment: DayAdjustment,
    ) -> Result<DateTime<Utc>, DateOutOfRange> {
        let date = match adjustment {
            DayAdjustment::Previous => self.flight_date.checked_sub_days(Days::new(1)),
            DayAdjustment::Same => Some(self.flight_date),
            DayAdjustment::Next => self.flight_date.checked_add_days(Days::new(1)),
        }
        .ok_or(DateOutOfRange(self.flight_date))?;

        Ok(date.and_time(raw.to_naive_time()).and_utc())
    }

    /// Resolve the next event and make it the anchor for the one after.
    pub fn step(
        &mut self,
        raw: RawClockTime,
        adjustment: Option<DayAdjustment>,
    ) -> Result<DateTime<Utc>, DateOutOfRange> {
        let instant = match adjustment {
            Some(adj) => self.resolve_explicit(raw, adj)?,
            None => self.resolve(raw)?,
        };
        self.previous = instant;
        Ok(instant)
    }
}

/// Midnight UTC at the start of `date`.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Resolve four raw times into absolute instants by forward inference.
///
/// This is a left-to-right fold over OUT, OFF, ON, IN. It is re-run from
/// scratch whenever any raw time changes, since an earlier event can change
/// every later rollover decision.
///
/// # Examples
///
/// ```
/// use logbook_server::domain::{RawClockTime, normalize_sequence};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
/// let raw = ["2309", "0024", "0736", "0742"].map(|s| RawClockTime::parse(s).unwrap());
/// let times = normalize_sequence(date, raw).unwrap();
///
/// let next_day = NaiveDate::from_ymd_opt(2024, 10, 2).unwrap();
/// assert_eq!(times.out.date_naive(), date);
/// assert_eq!(times.off.date_naive(), next_day);
/// assert_eq!(times.r#in.date_naive(), next_day);
/// ```
pub fn normalize_sequence(
    flight_date: NaiveDate,
    raw: [RawClockTime; 4],
) -> Result<LegTimes, DateOutOfRange> {
    normalize_with_adjustments(flight_date, raw.map(|t| (t, None)))
}

/// Resolve four raw times where some carry an explicit day marker.
///
/// A marked event is placed on `flight_date` plus its offset. Inference
/// resumes for later events relative to that instant.
pub fn normalize_with_adjustments(
    flight_date: NaiveDate,
    entries: [(RawClockTime, Option<DayAdjustment>); 4],
) -> Result<LegTimes, DateOutOfRange> {
    let mut context = NormalizationContext::new(flight_date);
    let mut instants = [context.previous(); 4];

    for event in FlightEvent::ALL {
        let (raw, adjustment) = entries[event.index()];
        instants[event.index()] = context.step(raw, adjustment)?;
    }

    Ok(LegTimes::from_array(instants))
}
