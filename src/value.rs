//! Typed values stored in an instance or solution mapping.
//!
//! Specification lines produce scalars, data sections produce tables. Numbers
//! keep the integer/floating-point distinction of the source text so that a
//! written file reads back to the same values.

use serde::Serialize;
use std::fmt;

/// A single numeric cell of a data section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Parses an integer first, then a floating-point number.
    pub fn parse(token: &str) -> Option<Number> {
        if let Ok(int) = token.parse::<i64>() {
            return Some(Number::Int(int));
        }
        token.parse::<f64>().ok().map(Number::Float)
    }

    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    /// Integer value, accepting floats without a fractional part.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(v) if v.fract() == 0.0 => Some(v as i64),
            Number::Float(_) => None,
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Int(0)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            // Debug keeps a trailing ".0" so floats do not read back as integers.
            Number::Float(v) => write!(f, "{:?}", v),
        }
    }
}

/// A field of an instance: a scalar from a specification line or a table from a section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    /// Single-column section, flattened.
    Vector(Vec<Number>),
    /// Rows of equal length.
    Matrix(Vec<Vec<Number>>),
    /// Rows of differing length.
    Ragged(Vec<Vec<Number>>),
}

impl Value {
    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_) | Value::Str(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Float(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[Number]> {
        match self {
            Value::Vector(values) => Some(values),
            _ => None,
        }
    }

    /// Rows of a rectangular or ragged table.
    pub fn as_rows(&self) -> Option<&[Vec<Number>]> {
        match self {
            Value::Matrix(rows) | Value::Ragged(rows) => Some(rows),
            _ => None,
        }
    }
}

impl From<Number> for Value {
    fn from(number: Number) -> Self {
        match number {
            Number::Int(v) => Value::Int(v),
            Number::Float(v) => Value::Float(v),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Str(s) => f.write_str(s),
            Value::Vector(values) => write!(f, "[{} values]", values.len()),
            Value::Matrix(rows) | Value::Ragged(rows) => write!(f, "[{} rows]", rows.len()),
        }
    }
}

/// Infers the type of a token: integer, then floating-point, then the string itself.
pub fn infer_type(token: &str) -> Value {
    match Number::parse(token) {
        Some(number) => number.into(),
        None => Value::Str(token.to_string()),
    }
}
