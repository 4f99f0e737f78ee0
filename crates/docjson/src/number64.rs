//! `Number64`: an IEEE-754 double that remembers whether it was an integer.

use std::cmp::Ordering;
use std::fmt;

/// Numeric value carried by `Number` tokens.
///
/// Arithmetic and comparison follow `f64` semantics. The `Integer` variant only
/// exists so writers can pick a compact integer encoding.
#[derive(Debug, Clone, Copy)]
pub enum Number64 {
    Integer(i64),
    Double(f64),
}

impl Number64 {
    pub const MAX: Number64 = Number64::Double(f64::MAX);
    pub const MIN: Number64 = Number64::Double(f64::MIN);

    pub fn is_integer(&self) -> bool {
        matches!(self, Number64::Integer(_))
    }

    pub fn is_double(&self) -> bool {
        matches!(self, Number64::Double(_))
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Number64::Double(d) if d.is_nan())
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Number64::Double(d) if d.is_infinite())
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Number64::Integer(i) => i as f64,
            Number64::Double(d) => d,
        }
    }

    /// Truncates doubles toward zero, saturating at the `i64` bounds.
    pub fn to_i64(self) -> i64 {
        match self {
            Number64::Integer(i) => i,
            Number64::Double(d) => d as i64,
        }
    }

    /// Returns the integer form if the value is integral and fits in `i64`.
    pub fn as_exact_i64(self) -> Option<i64> {
        match self {
            Number64::Integer(i) => Some(i),
            Number64::Double(d) => {
                if d.fract() == 0.0 && d >= -9.223_372_036_854_776e18 && d < 9.223_372_036_854_776e18
                {
                    Some(d as i64)
                } else {
                    None
                }
            }
        }
    }
}

/// Maps the quoted spellings text writers use for non-finite doubles back to
/// their value.
pub(crate) fn non_finite_from_str(value: &str) -> Option<Number64> {
    match value {
        "NaN" => Some(Number64::Double(f64::NAN)),
        "Infinity" => Some(Number64::Double(f64::INFINITY)),
        "-Infinity" => Some(Number64::Double(f64::NEG_INFINITY)),
        _ => None,
    }
}

impl PartialEq for Number64 {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

impl PartialOrd for Number64 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Number64::Integer(a), Number64::Integer(b)) => Some(a.cmp(b)),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl From<i64> for Number64 {
    fn from(value: i64) -> Self {
        Number64::Integer(value)
    }
}

impl From<i32> for Number64 {
    fn from(value: i32) -> Self {
        Number64::Integer(value as i64)
    }
}

impl From<u32> for Number64 {
    fn from(value: u32) -> Self {
        Number64::Integer(value as i64)
    }
}

impl From<f64> for Number64 {
    fn from(value: f64) -> Self {
        Number64::Double(value)
    }
}

impl fmt::Display for Number64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number64::Integer(i) => write!(f, "{i}"),
            Number64::Double(d) => f.write_str(&format_f64(*d)),
        }
    }
}

/// Shortest round-trip text for a finite double, using exponent notation for
/// very large or very small magnitudes.
pub fn format_f64(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value}")
    } else {
        format!("{value:?}")
    }
}

/// Same as [`format_f64`] for single-precision values.
pub fn format_f32(value: f32) -> String {
    if value.fract() == 0.0 && value.abs() < 1e7 {
        format!("{value}")
    } else {
        format!("{value:?}")
    }
}
