// Handle temperature conversion concerns

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// The number of significant digits shown for any temperature.
const SIGNIFICANT_DIGITS: usize = 6;

/// One of the two supported temperature scales.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Unit {
    pub const ALL: [Unit; 2] = [Unit::Celsius, Unit::Fahrenheit];

    /// The name shown next to a value when describing a conversion.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Celsius => "Celsius (°C)",
            Unit::Fahrenheit => "Fahrenheit (°F)",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Fahrenheit => "°F",
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Unit::Celsius => "C",
            Unit::Fahrenheit => "F",
        }
    }

    /// The unit a value of this unit converts into.
    pub fn other(self) -> Unit {
        match self {
            Unit::Celsius => Unit::Fahrenheit,
            Unit::Fahrenheit => Unit::Celsius,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Unit {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(unit) = Unit::ALL.into_iter().find(|unit| unit.label() == s) {
            return Ok(unit);
        }
        match s.to_ascii_lowercase().as_str() {
            "c" | "celsius" => Ok(Unit::Celsius),
            "f" | "fahrenheit" => Ok(Unit::Fahrenheit),
            _ => Err(ValidationError::UnknownUnit(s.to_string())),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("temperature must be a finite number, got {0}")]
    NotFinite(f64),

    #[error("converting {0} leaves the range of representable numbers")]
    Overflow(f64),

    #[error("'{0}' is not a number")]
    InvalidNumber(String),

    #[error("unknown temperature unit '{0}'")]
    UnknownUnit(String),
}

/// A value paired with the scale it is measured in.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: Unit,
}

impl Temperature {
    pub fn new(value: f64, unit: Unit) -> Result<Self, ValidationError> {
        if value.is_finite() {
            Ok(Self { value, unit })
        } else {
            Err(ValidationError::NotFinite(value))
        }
    }

    /// The same temperature expressed in the other unit.
    pub fn convert(self) -> Result<Temperature, ValidationError> {
        let (value, unit) = try_convert(self.value, self.unit)?;
        Ok(Temperature { value, unit })
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", format(self.value), self.unit.label())
    }
}

pub fn c_to_f(c: f64) -> f64 {
    c * 9.0 / 5.0 + 32.0
}

pub fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 5.0 / 9.0
}

/// Convert `value` measured in `from` into the other unit.
pub fn convert(value: f64, from: Unit) -> (f64, Unit) {
    let result = match from {
        Unit::Celsius => c_to_f(value),
        Unit::Fahrenheit => f_to_c(value),
    };
    (result, from.other())
}

/// Like [`convert`], but refuses values that are not finite or that do not
/// stay finite once converted.
pub fn try_convert(value: f64, from: Unit) -> Result<(f64, Unit), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite(value));
    }
    let (result, to) = convert(value, from);
    if !result.is_finite() {
        return Err(ValidationError::Overflow(value));
    }
    Ok((result, to))
}

/// Render a value for display with six significant digits, choosing plain or
/// exponent notation the way C's `%g` does. The output is lossy and only
/// meant to be read.
pub fn format(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the significant digits first decides the exponent, and so
    // which notation is used.
    let scientific = format!("{:.*e}", SIGNIFICANT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or_default();

    if (-4..SIGNIFICANT_DIGITS as i32).contains(&exponent) {
        let precision = (SIGNIFICANT_DIGITS as i32 - 1 - exponent) as usize;
        trim_fraction(&format!("{value:.precision$}")).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!(
            "{}e{}{:02}",
            trim_fraction(mantissa),
            sign,
            exponent.unsigned_abs()
        )
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Parse a value typed by a user.
pub fn parse_value(text: &str) -> Result<f64, ValidationError> {
    let text = text.trim();
    let value = text
        .parse::<f64>()
        .map_err(|_| ValidationError::InvalidNumber(text.to_string()))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite(value))
    }
}
