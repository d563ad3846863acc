//! Derived leg durations.

use chrono::Duration;

use super::event::LegTimes;

/// Block, flight and taxi intervals of a leg.
///
/// Values are signed. An unnormalized or broken sequence produces a
/// visibly negative interval instead of wrapping around midnight; rejecting
/// it is the validator's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationSet {
    /// IN − OUT
    pub block: Duration,
    /// ON − OFF
    pub flight: Duration,
    /// OFF − OUT
    pub taxi_out: Duration,
    /// IN − ON
    pub taxi_in: Duration,
}

impl DurationSet {
    /// Compute all four intervals by straight subtraction.
    pub fn compute(times: &LegTimes) -> Self {
        Self {
            block: times.r#in.signed_duration_since(times.out),
            flight: times.on.signed_duration_since(times.off),
            taxi_out: times.off.signed_duration_since(times.out),
            taxi_in: times.r#in.signed_duration_since(times.on),
        }
    }

    /// Total taxi time, out plus in.
    pub fn taxi(&self) -> Duration {
        self.taxi_out + self.taxi_in
    }
}

/// Render an interval as `H:MM`, truncating to whole minutes.
///
/// Hours are unbounded; minutes are always two digits. Negative intervals
/// get a leading `-`.
///
/// # Examples
///
/// ```
/// use logbook_server::domain::format_duration;
/// use chrono::Duration;
///
/// assert_eq!(format_duration(Duration::seconds(6666)), "1:51");
/// assert_eq!(format_duration(Duration::seconds(59)), "0:00");
/// assert_eq!(format_duration(Duration::hours(123)), "123:00");
/// ```
pub fn format_duration(interval: Duration) -> String {
    let total_minutes = interval.num_minutes();
    let sign = if total_minutes < 0 { "-" } else { "" };
    let total_minutes = total_minutes.unsigned_abs();
    format!("{sign}{}:{:02}", total_minutes / 60, total_minutes % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 10, d, h, m, 0).unwrap()
    }

    #[test]
    fn compute_same_day() {
        let times = LegTimes::from_array([at(1, 8, 0), at(1, 8, 30), at(1, 10, 0), at(1, 10, 5)]);
        let d = DurationSet::compute(&times);

        assert_eq!(d.block, Duration::minutes(125));
        assert_eq!(d.flight, Duration::minutes(90));
        assert_eq!(d.taxi_out, Duration::minutes(30));
        assert_eq!(d.taxi_in, Duration::minutes(5));
        assert_eq!(d.taxi(), Duration::minutes(35));
    }

    #[test]
    fn compute_overnight() {
        let times = LegTimes::from_array([at(1, 23, 9), at(2, 0, 24), at(2, 7, 36), at(2, 7, 42)]);
        let d = DurationSet::compute(&times);

        assert_eq!(format_duration(d.block), "8:33");
        assert_eq!(format_duration(d.flight), "7:12");
        assert_eq!(format_duration(d.taxi_out), "1:15");
        assert_eq!(format_duration(d.taxi_in), "0:06");
    }

    #[test]
    fn compute_does_not_clamp() {
        // Unnormalized: OFF before OUT on the same day
        let times = LegTimes::from_array([at(1, 23, 50), at(1, 0, 10), at(1, 1, 0), at(1, 1, 10)]);
        let d = DurationSet::compute(&times);

        assert!(d.taxi_out < Duration::zero());
        assert_eq!(d.taxi_out, -Duration::minutes(23 * 60 + 40));
        assert_eq!(format_duration(d.taxi_out), "-23:40");
    }

    #[test]
    fn format_truncates() {
        assert_eq!(format_duration(Duration::seconds(6666)), "1:51");
        assert_eq!(format_duration(Duration::seconds(59)), "0:00");
        assert_eq!(format_duration(Duration::seconds(119)), "0:01");
        assert_eq!(format_duration(Duration::seconds(-59)), "0:00");
    }

    #[test]
    fn format_wide_hours() {
        assert_eq!(format_duration(Duration::zero()), "0:00");
        assert_eq!(format_duration(Duration::minutes(605)), "10:05");
        assert_eq!(format_duration(Duration::hours(1500)), "1500:00");
    }
}
