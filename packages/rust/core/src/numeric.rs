//! Duration and view-count text parsing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

/// Label shown in place of a duration on short-form items.
const SHORT_FORM_LABEL: &str = "SHORTS";

/// Matches English view counts: `1,234 views`, `1.2M views`, `1 view`.
static VIEW_COUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:,\d+)*(?:\.\d+)?)([KMB])?\s+views?$").expect("view count regex")
});

/// Result of parsing a duration label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDuration {
    /// Total length in seconds.
    Seconds(u64),
    /// The short-form label; sentinel `-2`.
    ShortForm,
    /// More than three `:`-separated parts; sentinel `-1`.
    TooManyParts,
    /// Anything else.
    Unparseable,
}

impl ParsedDuration {
    /// Numeric form: seconds, a negative sentinel, or NaN.
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Seconds(s) => s as f64,
            Self::ShortForm => -2.0,
            Self::TooManyParts => -1.0,
            Self::Unparseable => f64::NAN,
        }
    }
}

impl Serialize for ParsedDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Seconds(s) => serializer.serialize_u64(*s),
            Self::ShortForm => serializer.serialize_i64(-2),
            Self::TooManyParts => serializer.serialize_i64(-1),
            Self::Unparseable => serializer.serialize_none(),
        }
    }
}

/// Parse `H:MM:SS`, `MM:SS` or bare seconds.
pub fn parse_duration(text: &str) -> ParsedDuration {
    let text = text.trim();
    if text.eq_ignore_ascii_case(SHORT_FORM_LABEL) {
        return ParsedDuration::ShortForm;
    }

    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > 3 {
        return ParsedDuration::TooManyParts;
    }

    let mut total: u64 = 0;
    for part in parts {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return ParsedDuration::Unparseable;
        }
        let Ok(value) = part.parse::<u64>() else {
            return ParsedDuration::Unparseable;
        };
        let Some(next) = total.checked_mul(60).and_then(|t| t.checked_add(value)) else {
            return ParsedDuration::Unparseable;
        };
        total = next;
    }

    ParsedDuration::Seconds(total)
}

/// Parse an English view-count label.
///
/// Thousands separators are stripped, a `K`/`M`/`B` suffix scales the value
/// and fractions round to the nearest integer. Other text (including other
/// locales) yields `None`.
pub fn parse_view_count(text: &str) -> Option<u64> {
    let caps = VIEW_COUNT_RE.captures(text.trim())?;
    let number: f64 = caps[1].replace(',', "").parse().ok()?;
    let scale = match caps.get(2).map(|m| m.as_str()) {
        Some("K") => 1e3,
        Some("M") => 1e6,
        Some("B") => 1e9,
        _ => 1.0,
    };
    Some((number * scale).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("1:02:03"), ParsedDuration::Seconds(3723));
        assert_eq!(parse_duration("4:20"), ParsedDuration::Seconds(260));
        assert_eq!(parse_duration("95"), ParsedDuration::Seconds(95));
        assert_eq!(parse_duration(" 0:30 "), ParsedDuration::Seconds(30));
    }

    #[test]
    fn duration_sentinels() {
        assert_eq!(parse_duration("SHORTS"), ParsedDuration::ShortForm);
        assert_eq!(parse_duration("1:2:3:4"), ParsedDuration::TooManyParts);
        assert_eq!(parse_duration("LIVE"), ParsedDuration::Unparseable);
        assert_eq!(parse_duration(""), ParsedDuration::Unparseable);
        assert_eq!(parse_duration("1::3"), ParsedDuration::Unparseable);
        assert_eq!(parse_duration("-5"), ParsedDuration::Unparseable);

        assert_eq!(ParsedDuration::ShortForm.as_f64(), -2.0);
        assert_eq!(ParsedDuration::TooManyParts.as_f64(), -1.0);
        assert!(ParsedDuration::Unparseable.as_f64().is_nan());
    }

    #[test]
    fn view_counts() {
        assert_eq!(parse_view_count("1,234 views"), Some(1234));
        assert_eq!(parse_view_count("1 view"), Some(1));
        assert_eq!(parse_view_count("12K views"), Some(12_000));
        assert_eq!(parse_view_count("1.25M views"), Some(1_250_000));
        assert_eq!(parse_view_count("2.5B views"), Some(2_500_000_000));
        assert_eq!(parse_view_count("1.4 views"), Some(1));
    }

    #[test]
    fn view_counts_unmatched() {
        assert_eq!(parse_view_count("No views"), None);
        assert_eq!(parse_view_count("1.2m views"), None);
        assert_eq!(parse_view_count("1.234 Aufrufe"), None);
        assert_eq!(parse_view_count("views"), None);
    }
}
