//! Typed attribute values and raw-input classification.
//!
//! # Responsibility
//! - Represent the single coalesced value of an attribute row.
//! - Classify raw text input into the `value_int` / `value_real` /
//!   `value_text` column it is stored in.
//!
//! # Invariants
//! - A numeric string containing `.` is `Real`; any other numeric string is
//!   `Int` when an `i64` can hold it and `Real` otherwise. Everything else
//!   is `Text`.
//! - `Text` keeps the raw input verbatim (no trimming).

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").expect("valid numeric regex")
});

/// One attribute value, stored in exactly one typed column.
///
/// Serialized untagged, so JSON sees a bare number or string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Real(f64),
    Text(String),
}

impl AttributeValue {
    /// Name of the `resource_attribute` column holding this value.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Int(_) => "value_int",
            Self::Real(_) => "value_real",
            Self::Text(_) => "value_text",
        }
    }

    /// Whether the value counts as "absent" for compatibility lookups.
    ///
    /// Zero, zero-point-zero, the empty string and the string `"0"`.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Int(value) => *value == 0,
            Self::Real(value) => *value == 0.0,
            Self::Text(value) => value.is_empty() || value == "0",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    fn loose_number(&self) -> Option<f64> {
        match self {
            Self::Int(value) => Some(*value as f64),
            Self::Real(value) => Some(*value),
            Self::Text(value) => parse_numeric(value),
        }
    }
}

/// Classifies raw input into the column type it is stored as.
///
/// `"5"` → `Int(5)`, `"5.0"` → `Real(5.0)`, `"abc"` → `Text("abc")`.
/// Numeric input without a `.` is always `Int` when an `i64` can hold it,
/// including exponent notation (`"1e3"` → `Int(1000)`). Only values no
/// `i64` can represent (overflow, fractional exponents) fall back to `Real`.
pub fn classify_value(raw: &str) -> AttributeValue {
    let Some(number) = parse_numeric(raw) else {
        return AttributeValue::Text(raw.to_string());
    };

    let trimmed = raw.trim();
    if trimmed.contains('.') {
        return AttributeValue::Real(number);
    }

    match trimmed.parse::<i64>().ok().or_else(|| integral_i64(number)) {
        Some(value) => AttributeValue::Int(value),
        None => AttributeValue::Real(number),
    }
}

/// Integral value of `number` when it is finite and within `i64` range.
pub(crate) fn integral_i64(number: f64) -> Option<i64> {
    // 2^63 is exactly representable; i64::MAX as f64 rounds up to it.
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if number.is_finite() && number.fract() == 0.0 && (-LIMIT..LIMIT).contains(&number) {
        Some(number as i64)
    } else {
        None
    }
}

pub(crate) fn parse_numeric(raw: &str) -> Option<f64> {
    if !NUMERIC_RE.is_match(raw) {
        return None;
    }
    raw.trim().parse::<f64>().ok()
}

impl Display for AttributeValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Real(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

// Loose comparisons: numbers compare numerically across Int/Real/numeric
// Text, non-numeric text compares verbatim.

impl PartialEq<i64> for AttributeValue {
    fn eq(&self, other: &i64) -> bool {
        match self {
            Self::Int(value) => value == other,
            _ => self.loose_number() == Some(*other as f64),
        }
    }
}

impl PartialEq<f64> for AttributeValue {
    fn eq(&self, other: &f64) -> bool {
        self.loose_number() == Some(*other)
    }
}

impl PartialEq<&str> for AttributeValue {
    fn eq(&self, other: &&str) -> bool {
        if let Self::Text(value) = self {
            if value == other {
                return true;
            }
        }
        match (self.loose_number(), parse_numeric(other)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }
}
