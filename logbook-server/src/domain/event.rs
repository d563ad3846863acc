//! Flight timing events and the instants they resolve to.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One of the four standard timing events of a flight leg, in sequence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightEvent {
    /// Pushback / taxi start.
    Out,
    /// Wheels up.
    Off,
    /// Wheels down.
    On,
    /// Arrival at gate.
    In,
}

impl FlightEvent {
    /// All events in the order they happen.
    pub const ALL: [FlightEvent; 4] = [Self::Out, Self::Off, Self::On, Self::In];

    /// Position in the OUT → OFF → ON → IN chain.
    pub fn index(self) -> usize {
        match self {
            Self::Out => 0,
            Self::Off => 1,
            Self::On => 2,
            Self::In => 3,
        }
    }

    /// The event whose instant anchors this one, if any.
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Out => None,
            Self::Off => Some(Self::Out),
            Self::On => Some(Self::Off),
            Self::In => Some(Self::On),
        }
    }

    /// Upper-case label, e.g. `"OFF"`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Out => "OUT",
            Self::Off => "OFF",
            Self::On => "ON",
            Self::In => "IN",
        }
    }
}

impl fmt::Display for FlightEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The four absolute UTC instants of a leg.
///
/// Produced by the normalizer. A normalized sequence is non-decreasing
/// unless explicit day markers pulled an event backwards, which
/// [`LegTimes::is_chronological`] detects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LegTimes {
    pub out: DateTime<Utc>,
    pub off: DateTime<Utc>,
    pub on: DateTime<Utc>,
    #[serde(rename = "in")]
    pub r#in: DateTime<Utc>,
}

impl LegTimes {
    /// Build from instants in OUT, OFF, ON, IN order.
    pub fn from_array([out, off, on, r#in]: [DateTime<Utc>; 4]) -> Self {
        Self { out, off, on, r#in }
    }

    /// Instants in OUT, OFF, ON, IN order.
    pub fn to_array(&self) -> [DateTime<Utc>; 4] {
        [self.out, self.off, self.on, self.r#in]
    }

    /// The instant of a single event.
    pub fn get(&self, event: FlightEvent) -> DateTime<Utc> {
        match event {
            FlightEvent::Out => self.out,
            FlightEvent::Off => self.off,
            FlightEvent::On => self.on,
            FlightEvent::In => self.r#in,
        }
    }

    /// `out <= off <= on <= in`.
    pub fn is_chronological(&self) -> bool {
        self.out <= self.off && self.off <= self.on && self.on <= self.r#in
    }
}
