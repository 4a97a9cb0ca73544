use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::AmountError;
use super::Decimal;

/// Number of fractional digits of every supported currency's minor unit.
pub const MINOR_UNIT_DIGITS: u32 = 2;

/// A non-negative, exact amount of money with at most 2 fractional digits.
///
/// Internally a `Decimal` rescaled to the minor unit, so every value is an
/// integer number of cents. Construction goes through [`Money::parse`],
/// [`Money::from_decimal`] or [`Money::validate_transfer_amount`], which reject
/// rather than round anything finer than a cent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Parse a decimal string.
    ///
    /// Rejects non-finite values (`NaN`, `Inf`), negative values and anything
    /// with more than 2 fractional digits. `-0` parses as zero.
    pub fn parse(text: &str) -> Result<Self, AmountError> {
        if is_non_finite(text) {
            return Err(AmountError::NotFinite);
        }

        let value = if text.contains(|c: char| c == 'e' || c == 'E') {
            Decimal::from_scientific(text)
        } else {
            Decimal::from_str_exact(text)
        }
        .map_err(|_| AmountError::InvalidFormat {
            input: text.to_string(),
        })?;

        Self::from_decimal(value)
    }

    /// Build from an exact decimal. Zero is accepted, negatives are not.
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
        if value.is_zero() {
            if value.scale() > MINOR_UNIT_DIGITS {
                return Err(AmountError::InvalidPrecision {
                    scale: value.scale(),
                });
            }
            return Ok(Self::ZERO);
        }
        if value.is_sign_negative() {
            return Err(AmountError::Negative);
        }
        Self::rescaled(value)
    }

    /// Stricter check applied to the amount of a transfer: present, strictly
    /// positive and with no more than 2 fractional digits.
    pub fn validate_transfer_amount(value: Option<Decimal>) -> Result<Self, AmountError> {
        let value = value.ok_or(AmountError::Missing)?;
        if value.is_zero() || value.is_sign_negative() {
            return Err(AmountError::NotPositive);
        }
        Self::rescaled(value)
    }

    fn rescaled(value: Decimal) -> Result<Self, AmountError> {
        if value.scale() > MINOR_UNIT_DIGITS {
            return Err(AmountError::InvalidPrecision {
                scale: value.scale(),
            });
        }
        Self::normalized(value)
    }

    /// Canonical form with exactly 2 fractional digits.
    pub fn format(&self) -> String {
        format!("{:.2}", self.0)
    }

    /// The amount as an integer count of minor units.
    pub fn minor_units(&self) -> i128 {
        let mut value = self.0;
        value.rescale(MINOR_UNIT_DIGITS);
        value.mantissa()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Money) -> Result<Money, AmountError> {
        self.0
            .checked_add(other.0)
            .ok_or(AmountError::Overflow)
            .and_then(Self::normalized)
    }

    /// Subtract, returning `None` if the result would be negative.
    pub fn checked_sub(self, other: Money) -> Option<Money> {
        if other > self {
            return None;
        }
        self.0
            .checked_sub(other.0)
            .and_then(|value| Self::normalized(value).ok())
    }

    /// Widen `value` to exactly 2 fractional digits. Widening only appends
    /// zeros, but `rescale` stops short when the mantissa has no room left.
    fn normalized(mut value: Decimal) -> Result<Money, AmountError> {
        value.rescale(MINOR_UNIT_DIGITS);
        if value.scale() != MINOR_UNIT_DIGITS {
            return Err(AmountError::Overflow);
        }
        Ok(Money(value))
    }
}

fn is_non_finite(text: &str) -> bool {
    let unsigned = text.trim_start_matches(&['+', '-'][..]);
    ["nan", "snan", "inf", "infinity"]
        .iter()
        .any(|word| unsigned.eq_ignore_ascii_case(word))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.format())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Money::parse(&text).map_err(serde::de::Error::custom)
    }
}
