//! Reminder interval configuration and input normalization

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ReminderError, Result};

/// Interval between reminders, split the way the user enters it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderConfig {
    pub minutes: u64,
    pub seconds: u64,
}

impl ReminderConfig {
    pub const fn new(minutes: u64, seconds: u64) -> Self {
        Self { minutes, seconds }
    }

    /// Build a config from signed user input, rejecting negative parts
    pub fn from_signed(minutes: i64, seconds: i64) -> Result<Self> {
        match (u64::try_from(minutes), u64::try_from(seconds)) {
            (Ok(minutes), Ok(seconds)) => Ok(Self { minutes, seconds }),
            _ => Err(ReminderError::InvalidInterval { minutes, seconds }),
        }
    }

    /// Total interval in milliseconds
    pub fn total_ms(&self) -> u64 {
        self.minutes
            .saturating_mul(60)
            .saturating_add(self.seconds)
            .saturating_mul(1000)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.total_ms())
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self::new(0, 30)
    }
}

/// Raw minutes/seconds as they arrive from an input field: a string, a number, or nothing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervalInput {
    #[serde(default)]
    pub minutes: Value,
    #[serde(default)]
    pub seconds: Value,
}

/// Both fields after blur normalization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedInput {
    pub minutes: String,
    pub seconds: String,
}

impl IntervalInput {
    pub fn new(minutes: impl Into<Value>, seconds: impl Into<Value>) -> Self {
        Self {
            minutes: minutes.into(),
            seconds: seconds.into(),
        }
    }

    /// Signed parts with unparseable fields coerced to 0
    pub fn coerce(&self) -> (i64, i64) {
        (
            parse_value(&self.minutes).unwrap_or(0),
            parse_value(&self.seconds).unwrap_or(0),
        )
    }

    /// What each field shows after losing focus
    pub fn normalized(&self) -> NormalizedInput {
        NormalizedInput {
            minutes: normalize_value(&self.minutes),
            seconds: normalize_value(&self.seconds),
        }
    }
}

/// Parse the leading integer of a field: optional whitespace, optional sign, digits.
/// Returns `None` when no digits are present. Out-of-range values saturate.
pub fn parse_field(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits: Vec<i64> = rest
        .bytes()
        .take_while(u8::is_ascii_digit)
        .map(|b| i64::from(b - b'0'))
        .collect();
    if digits.is_empty() {
        return None;
    }

    let value = digits.iter().fold(0i64, |acc, d| {
        let next = acc.saturating_mul(10);
        if negative {
            next.saturating_sub(*d)
        } else {
            next.saturating_add(*d)
        }
    });
    Some(value)
}

/// Parse a JSON field value with the same leading-integer rules
pub fn parse_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => parse_field(s),
        _ => None,
    }
}

/// Blur normalization: a valid integer string, "0" when the field does not parse
pub fn normalize_field(raw: &str) -> String {
    parse_field(raw).unwrap_or(0).to_string()
}

fn normalize_value(value: &Value) -> String {
    parse_value(value).unwrap_or(0).to_string()
}
