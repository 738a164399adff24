//! Date parsing and pattern rendering

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde_json::Value;

/// Default pattern of the `date` formatter
pub const DATE_PATTERN: &str = "DD/MM/YYYY";

/// Default pattern of the `datetime` formatter
pub const DATETIME_PATTERN: &str = "DD/MM/YYYY HH:mm";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Interpret a JSON value as a wall-clock timestamp.
///
/// Numbers and digit-only strings are Unix epoch milliseconds (UTC).
/// Offset-carrying strings keep their own wall clock.
pub fn parse_datetime(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::Number(n) => from_millis(n.as_f64()?),
        Value::String(s) => parse_str(s.trim()),
        _ => None,
    }
}

fn from_millis(millis: f64) -> Option<NaiveDateTime> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64).map(|dt| dt.naive_utc())
}

fn parse_str(s: &str) -> Option<NaiveDateTime> {
    if s.is_empty() {
        return None;
    }
    if s.bytes().all(|b| b.is_ascii_digit()) {
        return s.parse::<i64>().ok().and_then(|ms| from_millis(ms as f64));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PatternState {
    Idle,
    AfterHour,
    AfterHourColon,
}

/// Render `dt` with a case-insensitive token pattern.
///
/// Tokens: `yyyy`, `yy`, `mm`, `dd`, `hh`, `ss`. `mm` is minutes right after
/// `hh:` and months everywhere else. Other characters are copied.
pub fn format_pattern(dt: &NaiveDateTime, pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut state = PatternState::Idle;
    let mut i = 0;

    let matches_at = |i: usize, token: &str| -> bool {
        let len = token.len();
        i + len <= chars.len()
            && chars[i..i + len]
                .iter()
                .zip(token.chars())
                .all(|(c, t)| c.to_ascii_lowercase() == t)
    };

    while i < chars.len() {
        if matches_at(i, "yyyy") {
            out.push_str(&format!("{:04}", dt.year()));
            state = PatternState::Idle;
            i += 4;
        } else if matches_at(i, "yy") {
            out.push_str(&format!("{:02}", dt.year().rem_euclid(100)));
            state = PatternState::Idle;
            i += 2;
        } else if matches_at(i, "mm") {
            if state == PatternState::AfterHourColon {
                out.push_str(&format!("{:02}", dt.minute()));
            } else {
                out.push_str(&format!("{:02}", dt.month()));
            }
            state = PatternState::Idle;
            i += 2;
        } else if matches_at(i, "dd") {
            out.push_str(&format!("{:02}", dt.day()));
            state = PatternState::Idle;
            i += 2;
        } else if matches_at(i, "hh") {
            out.push_str(&format!("{:02}", dt.hour()));
            state = PatternState::AfterHour;
            i += 2;
        } else if matches_at(i, "ss") {
            out.push_str(&format!("{:02}", dt.second()));
            state = PatternState::Idle;
            i += 2;
        } else {
            let c = chars[i];
            state = if c == ':' && state == PatternState::AfterHour {
                PatternState::AfterHourColon
            } else {
                PatternState::Idle
            };
            out.push(c);
            i += 1;
        }
    }

    out
}

/// Parse then render; unparseable input yields `None`
pub fn format_date(value: &Value, pattern: &str) -> Option<String> {
    parse_datetime(value).map(|dt| format_pattern(&dt, pattern))
}
