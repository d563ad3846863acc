//! Time extraction from imported logbook tokens.
//!
//! Logbook exports disagree on how they write times and day changes:
//!
//! - `0024`, `0024z`, `00:24`, `0:24`
//! - explicit day markers: `0024+1`, `00:24 -1`, `0024 (+1)`
//! - no marker at all, relying on the reader to notice the clock went backwards
//!
//! [`LogImportTimeExtractor`] supports both strategies on a single row. An
//! explicit marker pins that event relative to the flight date; unmarked
//! events are inferred from the event before them.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::domain::{DayAdjustment, NormalizationContext, RawClockTime};

/// A time token resolved by the extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTime {
    /// The absolute instant.
    pub instant: DateTime<Utc>,
    /// The clock time read from the token.
    pub raw: RawClockTime,
    /// The explicit marker that applied, if any.
    pub adjustment: Option<DayAdjustment>,
}

impl ExtractedTime {
    /// Canonical draft entry: `"HHmm"` or `"HHmm (+1)"`.
    ///
    /// Re-normalizing a row of canonical entries yields the same instants.
    pub fn entry(&self) -> String {
        match self.adjustment {
            Some(adj) => format!("{} {}", self.raw, adj.annotation()),
            None => self.raw.to_string(),
        }
    }
}

/// Resolves a row's time tokens in OUT, OFF, ON, IN order.
#[derive(Debug, Clone)]
pub struct LogImportTimeExtractor {
    context: NormalizationContext,
}

impl LogImportTimeExtractor {
    /// Start a row anchored on `flight_date`.
    pub fn new(flight_date: NaiveDate) -> Self {
        Self {
            context: NormalizationContext::new(flight_date),
        }
    }

    /// Resolve the next token of the row.
    ///
    /// `day_adjustment` comes from a separate marker column, if the source
    /// has one; it takes precedence over a marker embedded in the token.
    /// Returns `None` for a malformed token and leaves the anchor unchanged,
    /// so later tokens are still inferred from the last resolved one.
    ///
    /// # Examples
    ///
    /// ```
    /// use logbook_server::import::LogImportTimeExtractor;
    /// use chrono::NaiveDate;
    ///
    /// let date = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
    /// let mut extractor = LogImportTimeExtractor::new(date);
    ///
    /// let out = extractor.extract("23:09", None).unwrap();
    /// let off = extractor.extract("0024", None).unwrap();
    /// assert_eq!((off - out).num_minutes(), 75);
    ///
    /// assert!(extractor.extract("7:3", None).is_none());
    /// ```
    pub fn extract(
        &mut self,
        token: &str,
        day_adjustment: Option<DayAdjustment>,
    ) -> Option<DateTime<Utc>> {
        self.extract_time(token, day_adjustment).map(|t| t.instant)
    }

    /// Like [`LogImportTimeExtractor::extract`], keeping the parsed pieces.
    pub fn extract_time(
        &mut self,
        token: &str,
        day_adjustment: Option<DayAdjustment>,
    ) -> Option<ExtractedTime> {
        let Some((raw, embedded)) = parse_import_token(token) else {
            debug!(token, "unparseable time token");
            return None;
        };

        let adjustment = day_adjustment.or(embedded);
        match self.context.step(raw, adjustment) {
            Ok(instant) => Some(ExtractedTime {
                instant,
                raw,
                adjustment,
            }),
            Err(e) => {
                debug!(token, error = %e, "time token out of range");
                None
            }
        }
    }
}

/// Parse an import time token into a clock time and optional day marker.
///
/// Accepts `HHmm`, `H:mm`, `HH:mm`, an optional `z` suffix, and a day
/// marker either bare (`+1`, `-1`) or parenthesized (`(+1)`).
pub fn parse_import_token(token: &str) -> Option<(RawClockTime, Option<DayAdjustment>)> {
    let (body, bare) = split_bare_marker(token.trim());

    let (raw, parenthesized) = if body.contains(':') {
        RawClockTime::parse_annotated(&colon_to_hhmm(body)?).ok()?
    } else {
        RawClockTime::parse_annotated(body).ok()?
    };

    Some((raw, bare.or(parenthesized)))
}

/// Split a trailing `+1`/`-1`/`+0` that is not wrapped in parentheses.
fn split_bare_marker(token: &str) -> (&str, Option<DayAdjustment>) {
    if token.len() < 3 || !token.is_char_boundary(token.len() - 2) {
        return (token, None);
    }
    let (body, tail) = token.split_at(token.len() - 2);
    if !tail.starts_with(['+', '-']) {
        return (token, None);
    }
    match DayAdjustment::parse(tail) {
        Some(adj) => (body.trim_end(), Some(adj)),
        None => (token, None),
    }
}

/// Rewrite `H:mm...` or `HH:mm...` as `HHmm...`.
fn colon_to_hhmm(body: &str) -> Option<String> {
    let (hour, rest) = body.split_once(':')?;
    if hour.is_empty() || hour.len() > 2 || !hour.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{hour:0>2}{rest}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn token(s: &str) -> Option<(String, Option<DayAdjustment>)> {
        parse_import_token(s).map(|(raw, adj)| (raw.to_string(), adj))
    }

    #[test]
    fn plain_tokens() {
        assert_eq!(token("0024"), Some(("0024".into(), None)));
        assert_eq!(token("0024z"), Some(("0024".into(), None)));
        assert_eq!(token(" 2359 "), Some(("2359".into(), None)));
    }

    #[test]
    fn colon_tokens() {
        assert_eq!(token("00:24"), Some(("0024".into(), None)));
        assert_eq!(token("7:36"), Some(("0736".into(), None)));
        assert_eq!(token("23:09z"), Some(("2309".into(), None)));
    }

    #[test]
    fn marker_tokens() {
        assert_eq!(token("0024+1"), Some(("0024".into(), Some(DayAdjustment::Next))));
        assert_eq!(
            token("00:24 -1"),
            Some(("0024".into(), Some(DayAdjustment::Previous)))
        );
        assert_eq!(
            token("0024 (+1)"),
            Some(("0024".into(), Some(DayAdjustment::Next)))
        );
        assert_eq!(
            token("00:24z (+1)"),
            Some(("0024".into(), Some(DayAdjustment::Next)))
        );
    }

    #[test]
    fn malformed_tokens() {
        for bad in ["", "24", "930", "12345", "7:3", "123:45", "ab:cd", "25:00", "12:60", "+1", "--"] {
            assert_eq!(parse_import_token(bad), None, "token {bad:?}");
        }
    }

    #[test]
    fn inference_without_markers() {
        let mut ex = LogImportTimeExtractor::new(date(2024, 10, 1));
        let out = ex.extract("2309", None).unwrap();
        let off = ex.extract("0024", None).unwrap();
        let on = ex.extract("0736", None).unwrap();
        let arrival = ex.extract("0742", None).unwrap();

        assert_eq!(out.date_naive(), date(2024, 10, 1));
        assert_eq!(off.date_naive(), date(2024, 10, 2));
        assert_eq!(on.date_naive(), date(2024, 10, 2));
        assert_eq!(arrival.date_naive(), date(2024, 10, 2));
    }

    #[test]
    fn embedded_markers_match_inference() {
        let mut marked = LogImportTimeExtractor::new(date(2024, 10, 1));
        let mut plain = LogImportTimeExtractor::new(date(2024, 10, 1));

        for (m, p) in [("2309", "2309"), ("0024+1", "0024"), ("0736+1", "0736"), ("0742+1", "0742")] {
            assert_eq!(marked.extract(m, None), plain.extract(p, None));
        }
    }

    #[test]
    fn explicit_argument_overrides_embedded_marker() {
        let mut ex = LogImportTimeExtractor::new(date(2024, 10, 1));
        ex.extract("2300", None).unwrap();
        let off = ex
            .extract("2330+1", Some(DayAdjustment::Same))
            .unwrap();
        assert_eq!(off.date_naive(), date(2024, 10, 1));
    }

    #[test]
    fn override_then_resume_inference() {
        let mut ex = LogImportTimeExtractor::new(date(2024, 10, 1));
        ex.extract("1000", None).unwrap();
        // Explicit +1 on OFF even though inference would keep it same-day
        let off = ex.extract("1030", Some(DayAdjustment::Next)).unwrap();
        assert_eq!(off.date_naive(), date(2024, 10, 2));

        // ON is inferred relative to the overridden OFF
        let on = ex.extract("0900", None).unwrap();
        assert_eq!(on.date_naive(), date(2024, 10, 3));
    }

    #[test]
    fn malformed_token_keeps_anchor() {
        let mut ex = LogImportTimeExtractor::new(date(2024, 10, 1));
        ex.extract("2300", None).unwrap();
        assert!(ex.extract("garbage", None).is_none());
        let on = ex.extract("0100", None).unwrap();
        assert_eq!(on.date_naive(), date(2024, 10, 2));
    }

    #[test]
    fn canonical_entry() {
        let mut ex = LogImportTimeExtractor::new(date(2024, 10, 1));
        let out = ex.extract_time("23:09", None).unwrap();
        let off = ex.extract_time("00:24+1", None).unwrap();

        assert_eq!(out.entry(), "2309");
        assert_eq!(off.entry(), "0024 (+1)");
    }
}
