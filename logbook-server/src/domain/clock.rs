//! Zulu clock-time parsing.
//!
//! Logbook entries carry bare "HHmm" wall-clock times with no date. This
//! module turns those strings into a [`RawClockTime`], which only becomes an
//! absolute instant once it is anchored by the normalizer.
//!
//! Two parse paths exist:
//!
//! - [`RawClockTime::parse`] is the strict form used when a leg is committed:
//!   exactly four digits after stripping the `z` suffix and any `(+1)`/`(-1)`
//!   annotation.
//! - [`RawClockTime::parse_interactive`] is the lenient form used while an
//!   entry is still being typed: one to four digits, where one or two digits
//!   are read as an hour and three digits as `HMM`.

use std::fmt;

use chrono::{NaiveTime, Timelike};

/// Error returned when a clock-time string cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockParseError {
    /// Wrong length or non-digit characters.
    #[error("invalid time format: {0}")]
    InvalidFormat(&'static str),

    /// Digits parsed but hour or minute is out of range.
    #[error("invalid time: {0}")]
    InvalidTime(&'static str),
}

/// An explicit day marker attached to a time entry, relative to the flight date.
///
/// Some logbook exports write `0024+1` or `0024 (+1)` for an event that
/// happened the day after the nominal flight date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DayAdjustment {
    /// `-1`: the day before the flight date.
    Previous,
    /// `0`: the flight date itself.
    Same,
    /// `+1`: the day after the flight date.
    Next,
}

impl DayAdjustment {
    /// Parse a bare marker: `"+1"`, `"-1"`, `"0"` or `"+0"`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "+1" => Some(Self::Next),
            "-1" => Some(Self::Previous),
            "0" | "+0" | "-0" => Some(Self::Same),
            _ => None,
        }
    }

    /// Signed day offset.
    pub fn days(self) -> i64 {
        match self {
            Self::Previous => -1,
            Self::Same => 0,
            Self::Next => 1,
        }
    }

    /// Marker text as written after a time, e.g. `"(+1)"`.
    pub fn annotation(self) -> &'static str {
        match self {
            Self::Previous => "(-1)",
            Self::Same => "(0)",
            Self::Next => "(+1)",
        }
    }
}

/// An hour and minute with no date attached.
///
/// # Examples
///
/// ```
/// use logbook_server::domain::RawClockTime;
///
/// let t = RawClockTime::parse("2350z").unwrap();
/// assert_eq!((t.hour(), t.minute()), (23, 50));
/// assert_eq!(t.to_string(), "2350");
///
/// assert!(RawClockTime::parse("2400").is_err());
/// assert!(RawClockTime::parse("930").is_err());
/// assert_eq!(RawClockTime::parse_interactive("930").unwrap().to_string(), "0930");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawClockTime {
    hour: u32,
    minute: u32,
}

impl RawClockTime {
    /// Create a clock time, rejecting values outside 00:00-23:59.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ClockParseError> {
        if hour > 23 {
            return Err(ClockParseError::InvalidTime("hour must be 00-23"));
        }
        if minute > 59 {
            return Err(ClockParseError::InvalidTime("minute must be 00-59"));
        }
        Ok(Self { hour, minute })
    }

    /// Take the hour and minute of any time value, dropping seconds.
    pub fn from_time<T: Timelike>(t: &T) -> Self {
        Self {
            hour: t.hour(),
            minute: t.minute(),
        }
    }

    /// Strict "HHmm" parse used at commit time.
    ///
    /// A trailing `z` and a `(+1)`/`(-1)` annotation are stripped first; the
    /// annotation is discarded. Use [`RawClockTime::parse_annotated`] to keep it.
    pub fn parse(s: &str) -> Result<Self, ClockParseError> {
        Self::parse_annotated(s).map(|(time, _)| time)
    }

    /// Strict parse that also returns any `(+1)`/`(-1)` annotation.
    pub fn parse_annotated(s: &str) -> Result<(Self, Option<DayAdjustment>), ClockParseError> {
        let (digits, adjustment) = strip_decorations(s);
        let bytes = digits.as_bytes();

        if bytes.len() != 4 {
            return Err(ClockParseError::InvalidFormat("expected HHmm"));
        }

        let hour = parse_two_digits(&bytes[0..2])
            .ok_or(ClockParseError::InvalidFormat("invalid hour digits"))?;
        let minute = parse_two_digits(&bytes[2..4])
            .ok_or(ClockParseError::InvalidFormat("invalid minute digits"))?;

        Ok((Self::new(hour, minute)?, adjustment))
    }

    /// Lenient parse for partially typed entries.
    ///
    /// - `"9"`, `"09"`, `"23"` are read as an hour with minute 0
    /// - `"930"` is read as `H` + `MM` (09:30)
    /// - four digits behave exactly like [`RawClockTime::parse`]
    pub fn parse_interactive(s: &str) -> Result<Self, ClockParseError> {
        let (digits, _) = strip_decorations(s);
        let bytes = digits.as_bytes();

        if bytes.is_empty() || bytes.len() > 4 {
            return Err(ClockParseError::InvalidFormat("expected 1 to 4 digits"));
        }
        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ClockParseError::InvalidFormat("expected digits only"));
        }

        let value: u32 = bytes
            .iter()
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'));

        match bytes.len() {
            1 | 2 => Self::new(value, 0),
            _ => Self::new(value / 100, value % 100),
        }
    }

    /// Returns the hour (0-23).
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Returns the minute (0-59).
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Converts to a NaiveTime with zero seconds.
    pub fn to_naive_time(&self) -> NaiveTime {
        // hour and minute are range-checked at construction
        NaiveTime::from_hms_opt(self.hour, self.minute, 0).unwrap_or(NaiveTime::MIN)
    }
}

impl fmt::Debug for RawClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawClockTime({:02}{:02})", self.hour, self.minute)
    }
}

impl fmt::Display for RawClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}", self.hour, self.minute)
    }
}

/// Strip surrounding whitespace, one `z` suffix and a parenthesized day
/// marker.
///
/// Both `"2350z (+1)"` and `"2350 (+1)z"` reduce to `"2350"`.
fn strip_decorations(s: &str) -> (&str, Option<DayAdjustment>) {
    let mut rest = s.trim();
    let mut adjustment = None;

    let trailing_z = strip_zulu(rest);
    if let Some(head) = trailing_z {
        rest = head;
    }
    if let Some((head, adj)) = split_parenthesized_marker(rest) {
        adjustment = Some(adj);
        rest = head.trim_end();
    }
    if trailing_z.is_none() {
        if let Some(head) = strip_zulu(rest) {
            rest = head;
        }
    }

    (rest, adjustment)
}

fn strip_zulu(s: &str) -> Option<&str> {
    s.strip_suffix(['z', 'Z']).map(str::trim_end)
}

fn split_parenthesized_marker(s: &str) -> Option<(&str, DayAdjustment)> {
    let inner_end = s.strip_suffix(')')?;
    let open = inner_end.rfind('(')?;
    let adj = DayAdjustment::parse(&inner_end[open + 1..])?;
    Some((&s[..open], adj))
}

/// Parse two ASCII digit bytes into a u32.
fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    if bytes.len() != 2 {
        return None;
    }
    let d1 = (bytes[0] as char).to_digit(10)?;
    let d2 = (bytes[1] as char).to_digit(10)?;
    Some(d1 * 10 + d2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_times() {
        let t = RawClockTime::parse("0000").unwrap();
        assert_eq!((t.hour(), t.minute()), (0, 0));

        let t = RawClockTime::parse("2359").unwrap();
        assert_eq!((t.hour(), t.minute()), (23, 59));

        let t = RawClockTime::parse("1230").unwrap();
        assert_eq!((t.hour(), t.minute()), (12, 30));
    }

    #[test]
    fn parse_strips_suffix_and_annotation() {
        assert_eq!(RawClockTime::parse("1230z").unwrap().to_string(), "1230");
        assert_eq!(RawClockTime::parse("1230Z").unwrap().to_string(), "1230");
        assert_eq!(RawClockTime::parse(" 0742 ").unwrap().to_string(), "0742");
        assert_eq!(
            RawClockTime::parse("0742z (+1)").unwrap().to_string(),
            "0742"
        );
        assert_eq!(RawClockTime::parse("0742(-1)").unwrap().to_string(), "0742");
    }

    #[test]
    fn parse_annotated_keeps_marker() {
        let (t, adj) = RawClockTime::parse_annotated("0024z (+1)").unwrap();
        assert_eq!(t.to_string(), "0024");
        assert_eq!(adj, Some(DayAdjustment::Next));

        let (_, adj) = RawClockTime::parse_annotated("2355 (-1)").unwrap();
        assert_eq!(adj, Some(DayAdjustment::Previous));

        let (t, adj) = RawClockTime::parse_annotated("2350 (+1)z").unwrap();
        assert_eq!(t.to_string(), "2350");
        assert_eq!(adj, Some(DayAdjustment::Next));

        let (_, adj) = RawClockTime::parse_annotated("2355").unwrap();
        assert_eq!(adj, None);
    }

    #[test]
    fn parse_invalid_format() {
        assert_eq!(
            RawClockTime::parse("123"),
            Err(ClockParseError::InvalidFormat("expected HHmm"))
        );
        assert!(matches!(
            RawClockTime::parse("12345"),
            Err(ClockParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            RawClockTime::parse(""),
            Err(ClockParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            RawClockTime::parse("12:30"),
            Err(ClockParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            RawClockTime::parse("1a30"),
            Err(ClockParseError::InvalidFormat(_))
        ));
        assert!(matches!(
            RawClockTime::parse("0024+1"),
            Err(ClockParseError::InvalidFormat(_))
        ));
        for doubled in ["2350zz", "2350Zz", "2350z (+1)z"] {
            assert!(
                matches!(
                    RawClockTime::parse(doubled),
                    Err(ClockParseError::InvalidFormat(_))
                ),
                "{doubled}"
            );
        }
    }

    #[test]
    fn parse_invalid_values() {
        assert!(matches!(
            RawClockTime::parse("2400"),
            Err(ClockParseError::InvalidTime(_))
        ));
        assert!(matches!(
            RawClockTime::parse("1260"),
            Err(ClockParseError::InvalidTime(_))
        ));
        assert!(matches!(
            RawClockTime::parse("9999"),
            Err(ClockParseError::InvalidTime(_))
        ));
    }

    #[test]
    fn interactive_hour_only() {
        assert_eq!(RawClockTime::parse_interactive("9").unwrap().to_string(), "0900");
        assert_eq!(RawClockTime::parse_interactive("09").unwrap().to_string(), "0900");
        assert_eq!(RawClockTime::parse_interactive("23").unwrap().to_string(), "2300");
        assert!(RawClockTime::parse_interactive("24").is_err());
    }

    #[test]
    fn interactive_three_digits() {
        assert_eq!(
            RawClockTime::parse_interactive("930").unwrap().to_string(),
            "0930"
        );
        assert_eq!(
            RawClockTime::parse_interactive("005").unwrap().to_string(),
            "0005"
        );
        assert!(RawClockTime::parse_interactive("975").is_err());
    }

    #[test]
    fn interactive_rejects_garbage() {
        assert!(RawClockTime::parse_interactive("").is_err());
        assert!(RawClockTime::parse_interactive("z").is_err());
        assert!(RawClockTime::parse_interactive("12345").is_err());
        assert!(RawClockTime::parse_interactive("1:3").is_err());
    }

    #[test]
    fn interactive_four_digits_matches_strict() {
        for s in ["0000", "0742", "2359", "2400", "1260"] {
            assert_eq!(RawClockTime::parse_interactive(s), RawClockTime::parse(s));
        }
    }

    #[test]
    fn day_adjustment_parse() {
        assert_eq!(DayAdjustment::parse("+1"), Some(DayAdjustment::Next));
        assert_eq!(DayAdjustment::parse("-1"), Some(DayAdjustment::Previous));
        assert_eq!(DayAdjustment::parse(" 0 "), Some(DayAdjustment::Same));
        assert_eq!(DayAdjustment::parse("+2"), None);
        assert_eq!(DayAdjustment::Next.days(), 1);
        assert_eq!(DayAdjustment::Previous.annotation(), "(-1)");
    }

    #[test]
    fn debug_format() {
        let t = RawClockTime::new(7, 5).unwrap();
        assert_eq!(format!("{:?}", t), "RawClockTime(0705)");
    }
}
