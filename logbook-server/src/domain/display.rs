//! Zulu display strings.

use chrono::{DateTime, Utc};

/// Render `instant` as `HHmmz`, with ` (+1)` when it falls on a later UTC
/// calendar day than `reference`.
///
/// The reference is conventionally the leg's OUT instant. Any later day is
/// marked `(+1)`; the marker does not count days.
///
/// # Examples
///
/// ```
/// use logbook_server::domain::format_zulu;
/// use chrono::{TimeZone, Utc};
///
/// let out = Utc.with_ymd_and_hms(2024, 10, 1, 23, 50, 0).unwrap();
/// let arrival = Utc.with_ymd_and_hms(2024, 10, 2, 7, 42, 0).unwrap();
///
/// assert_eq!(format_zulu(out, None), "2350z");
/// assert_eq!(format_zulu(arrival, Some(out)), "0742z (+1)");
/// ```
pub fn format_zulu(instant: DateTime<Utc>, reference: Option<DateTime<Utc>>) -> String {
    let clock = instant.format("%H%Mz");
    match reference {
        Some(reference) if instant.date_naive() > reference.date_naive() => {
            format!("{clock} (+1)")
        }
        _ => clock.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, d, h, m, 0).unwrap()
    }

    #[test]
    fn no_reference() {
        assert_eq!(format_zulu(at(1, 23, 50), None), "2350z");
        assert_eq!(format_zulu(at(2, 0, 5), None), "0005z");
    }

    #[test]
    fn same_day_as_reference() {
        assert_eq!(format_zulu(at(1, 23, 59), Some(at(1, 0, 0))), "2359z");
    }

    #[test]
    fn later_day_than_reference() {
        assert_eq!(format_zulu(at(2, 0, 10), Some(at(1, 23, 50))), "0010z (+1)");
        // Two days later is still marked (+1)
        assert_eq!(format_zulu(at(3, 0, 10), Some(at(1, 23, 50))), "0010z (+1)");
    }

    #[test]
    fn earlier_day_than_reference_is_unmarked() {
        assert_eq!(format_zulu(at(1, 23, 50), Some(at(2, 0, 10))), "2350z");
    }

    #[test]
    fn seconds_are_dropped() {
        let t = Utc.with_ymd_and_hms(2024, 10, 1, 9, 5, 59).unwrap();
        assert_eq!(format_zulu(t, None), "0905z");
    }
}
