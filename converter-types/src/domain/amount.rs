//! User-entered amount with the input normalization rules.

use serde::Serialize;
use std::fmt;

use crate::error::DomainError;

/// Maximum number of characters (digits and the decimal point) accepted.
pub const MAX_INPUT_LEN: usize = 10;

/// A non-negative amount of the source currency.
///
/// Construct it through [`Amount::parse`] (text input) or
/// [`Amount::from_value`] (numeric input); both enforce the same rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    /// Normalizes free-form text input.
    ///
    /// Everything except ASCII digits and `.` is dropped first, so `"1 000"`
    /// reads as `1000`. The remaining text must be at most
    /// [`MAX_INPUT_LEN`] characters and parse as a real number.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let filtered: String = input
            .chars()
            .filter(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        if filtered.len() > MAX_INPUT_LEN {
            return Err(DomainError::AmountTooLong {
                length: filtered.len(),
                max: MAX_INPUT_LEN,
            });
        }

        filtered
            .parse::<f64>()
            .map(Amount)
            .map_err(|_| DomainError::InvalidAmount(input.to_string()))
    }

    /// Validates a numeric input against the same rules as text input.
    pub fn from_value(value: f64) -> Result<Self, DomainError> {
        if !value.is_finite() {
            return Err(DomainError::InvalidAmount(value.to_string()));
        }
        if value < 0.0 {
            return Err(DomainError::NegativeAmount);
        }
        if value == 0.0 {
            return Ok(Self::ZERO);
        }

        let repr = value.to_string();
        if repr.len() > MAX_INPUT_LEN {
            return Err(DomainError::AmountTooLong {
                length: repr.len(),
                max: MAX_INPUT_LEN,
            });
        }
        Ok(Amount(value))
    }

    /// Returns the raw value.
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Only positive amounts are worth converting.
    pub fn is_positive(&self) -> bool {
        self.0 > 0.0
    }

    /// Shortest decimal text that parses back to the same value, always
    /// with a fractional part (`100.0`, `1.5`) and never in exponent form.
    /// Used verbatim in the URL.
    pub fn url_repr(&self) -> String {
        let repr = self.0.to_string();
        if repr.contains('.') {
            repr
        } else {
            format!("{repr}.0")
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
