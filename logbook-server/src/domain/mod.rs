//! Domain types for the flight logbook.
//!
//! This module holds the time engine: parsing bare zulu clock times,
//! resolving them into a chronologically consistent sequence of UTC
//! instants, deriving block/flight/taxi durations and validating a leg
//! before it is persisted. Everything here is pure and synchronous.

mod clock;
mod display;
mod duration;
mod event;
mod leg;
mod normalize;
mod validate;

pub use clock::{ClockParseError, DayAdjustment, RawClockTime};
pub use display::format_zulu;
pub use duration::{DurationSet, format_duration};
pub use event::{FlightEvent, LegTimes};
pub use leg::{CrewFields, DraftTimeError, FlightLeg, LegDraft, TimeUpdatable};
pub use normalize::{
    DateOutOfRange, NormalizationContext, normalize_sequence, normalize_with_adjustments,
    start_of_day,
};
pub use validate::{ValidationError, ValidationRules, validate, validate_with};
