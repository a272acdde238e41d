//! Utility functions and helpers.

pub mod http;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use unicode_segmentation::UnicodeSegmentation;

use crate::models::{Provenance, UNKNOWN_AUTHOR};

/// Join a base URL string and a path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Parse the first number in a string like "12,345 stars today".
///
/// Returns 0 when no number is present.
pub fn parse_count(text: &str) -> u32 {
    let Ok(re) = Regex::new(r"[\d,]+") else {
        return 0;
    };
    re.find_iter(text)
        .map(|m| m.as_str().replace(',', ""))
        .find(|digits| !digits.is_empty())
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}

/// Parse a timestamp in any of the formats the sources use.
///
/// Unparsable or empty input falls back to `now`, flagged as such.
pub fn parse_timestamp(raw: &str, now: DateTime<Utc>) -> (DateTime<Utc>, Provenance) {
    let raw = raw.trim();
    if raw.is_empty() {
        return (now, Provenance::Fallback);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return (dt.with_timezone(&Utc), Provenance::Source);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return (Utc.from_utc_datetime(&naive), Provenance::Source);
    }
    for layout in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, layout) {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return (Utc.from_utc_datetime(&naive), Provenance::Source);
            }
        }
    }

    (now, Provenance::Fallback)
}

/// Unix seconds to a timestamp, falling back to `now` when out of range.
pub fn from_unix(secs: i64, now: DateTime<Utc>) -> (DateTime<Utc>, Provenance) {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) if secs > 0 => (dt, Provenance::Source),
        _ => (now, Provenance::Fallback),
    }
}

/// Normalize an author field that may be a string, a list of strings or a
/// list of `{"name": ...}` objects.
pub fn normalize_authors(value: &Value) -> Vec<String> {
    let authors: Vec<String> = match value {
        Value::String(s) => vec![s.trim().to_string()],
        Value::Array(entries) => entries
            .iter()
            .filter_map(|entry| match entry {
                Value::String(s) => Some(s.trim().to_string()),
                Value::Object(map) => map
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|s| s.trim().to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    let authors: Vec<String> = authors.into_iter().filter(|a| !a.is_empty()).collect();
    if authors.is_empty() {
        vec![UNKNOWN_AUTHOR.to_string()]
    } else {
        authors
    }
}

/// Truncate to at most `max` graphemes, appending "..." when cut.
pub fn truncate_text(text: &str, max: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max {
        return text.to_string();
    }
    format!("{}...", graphemes[..max].concat())
}

/// Collapse runs of whitespace into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("https://a.b/", "/x"), "https://a.b/x");
        assert_eq!(join_url("https://a.b", "x?y=1"), "https://a.b/x?y=1");
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("  12,345 "), 12345);
        assert_eq!(parse_count("1,024 stars today"), 1024);
        assert_eq!(parse_count(""), 0);
        assert_eq!(parse_count("stars"), 0);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let now = Utc::now();
        let (dt, prov) = parse_timestamp("2024-03-01T10:00:00Z", now);
        assert_eq!(prov, Provenance::Source);
        assert_eq!(dt.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        let (_, prov) = parse_timestamp("2024-03-01", now);
        assert_eq!(prov, Provenance::Source);

        let (_, prov) = parse_timestamp("2024/03/01", now);
        assert_eq!(prov, Provenance::Source);
    }

    #[test]
    fn test_parse_timestamp_fallback_is_flagged() {
        let now = Utc::now();
        let (dt, prov) = parse_timestamp("last tuesday", now);
        assert_eq!(dt, now);
        assert_eq!(prov, Provenance::Fallback);

        let (_, prov) = parse_timestamp("", now);
        assert_eq!(prov, Provenance::Fallback);
    }

    #[test]
    fn test_normalize_authors_shapes() {
        assert_eq!(normalize_authors(&json!("Ada")), vec!["Ada"]);
        assert_eq!(normalize_authors(&json!(["Ada", "Alan"])), vec!["Ada", "Alan"]);
        assert_eq!(
            normalize_authors(&json!([{"name": "Ada"}, {"name": "Alan"}])),
            vec!["Ada", "Alan"]
        );
        assert_eq!(normalize_authors(&json!(42)), vec![UNKNOWN_AUTHOR]);
        assert_eq!(normalize_authors(&json!([])), vec![UNKNOWN_AUTHOR]);
        assert_eq!(normalize_authors(&Value::Null), vec![UNKNOWN_AUTHOR]);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("short", 10), "short");
        assert_eq!(truncate_text("abcdef", 3), "abc...");
        assert_eq!(truncate_text("文心一言模型", 4), "文心一言...");
    }
}
