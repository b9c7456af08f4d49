//! Attribute series
//!
//! Flat (timestamp, value) samples built from one history response. A new
//! series is built on every successful poll and replaces the previous one.

use chrono::{DateTime, Local, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::sth::HistoryValue;
use crate::timefmt::format_short_time_in;

/// One observation of a tracked attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Receive time as sent by the API (ISO-8601 or empty)
    pub timestamp: String,
    /// Numeric reading
    pub value: f64,
}

/// A sample with its chart label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplaySample {
    pub timestamp: String,
    pub value: f64,
    /// Short local time, or the raw timestamp when it does not parse
    pub display_time: String,
}

/// Ordered samples currently shown for one attribute
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttributeSeries {
    pub attribute: String,
    pub samples: Vec<DisplaySample>,
}

impl Sample {
    /// Map one raw history entry.
    ///
    /// The value is coerced but not filtered, so it may be NaN.
    pub fn from_entry(entry: &HistoryValue) -> Self {
        Self {
            timestamp: timestamp_text(&entry.recv_time),
            value: coerce_number(entry.reading()),
        }
    }

    /// Attach a display time formatted in `tz`
    pub fn into_display<Tz>(self, tz: &Tz) -> DisplaySample
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let display_time = format_short_time_in(&self.timestamp, tz);
        DisplaySample {
            timestamp: self.timestamp,
            value: self.value,
            display_time,
        }
    }
}

impl DisplaySample {
    /// Label for the table: display time, or the raw timestamp if that is empty
    pub fn label(&self) -> &str {
        if self.display_time.is_empty() {
            &self.timestamp
        } else {
            &self.display_time
        }
    }
}

impl AttributeSeries {
    /// Build a series with display times in the local time zone
    pub fn from_values(attribute: impl Into<String>, values: &[HistoryValue]) -> Self {
        Self::from_values_in(attribute, values, &Local)
    }

    /// Build a series with display times in `tz`.
    ///
    /// Every entry is mapped first; entries whose value coerced to NaN are
    /// dropped afterwards. Upstream order is kept.
    pub fn from_values_in<Tz>(attribute: impl Into<String>, values: &[HistoryValue], tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        let samples = values
            .iter()
            .map(Sample::from_entry)
            .map(|s| s.into_display(tz))
            .filter(|s| !s.value.is_nan())
            .collect();

        Self {
            attribute: attribute.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[DisplaySample] {
        &self.samples
    }

    pub fn iter(&self) -> impl Iterator<Item = &DisplaySample> {
        self.samples.iter()
    }
}

/// Timestamp text for a `recvTime` field.
///
/// Falsy values become empty. Numbers are epoch milliseconds and are
/// rewritten as RFC 3339 so they format like string timestamps.
fn timestamp_text(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Null | Value::Bool(false) => String::new(),
        Value::Number(n) => match n.as_f64() {
            Some(ms) if ms == 0.0 => String::new(),
            Some(ms) => DateTime::<Utc>::from_timestamp_millis(ms.trunc() as i64)
                .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
                .unwrap_or_else(|| n.to_string()),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}

/// Coerce a JSON value to a number the way a loosely typed reading is read.
///
/// `null` and empty strings are 0, booleans are 0/1, numeric strings parse
/// (including `0x`/`0o`/`0b` literals and `Infinity`), everything else is NaN.
pub fn coerce_number(raw: &Value) -> f64 {
    match raw {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => coerce_str(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [Value::Bool(_)] | [Value::Object(_)] => f64::NAN,
            [single] => coerce_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn coerce_str(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    // Rust also accepts "inf" and "nan" spellings; a reading never does.
    if s.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}
