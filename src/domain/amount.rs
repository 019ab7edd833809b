use crate::error::{PaymentError, Result};
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest decimal exponent, in either direction, an amount may carry once
/// trailing zeros are stripped. Rendering allocates one character per unit
/// of exponent, so `1e999999999` must not get through.
const MAX_EXPONENT: u64 = 4096;

/// A strictly positive monetary quantity.
///
/// Wraps an arbitrary-precision `BigDecimal` so that comparisons are exact:
/// `10.50` and `10.5` are the same amount, and no digit is ever rounded
/// away however long the literal is.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "BigDecimal", into = "BigDecimal")]
pub struct Amount(BigDecimal);

impl Amount {
    pub fn new(value: BigDecimal) -> Result<Self> {
        if value > BigDecimal::zero() {
            Ok(Self(value))
        } else {
            Err(PaymentError::InvalidAmount {
                value: value.to_string(),
                reason: "amount must be positive".to_string(),
            })
        }
    }

    /// Parses a decimal, integer or scientific literal into a positive
    /// amount.
    pub fn parse(text: &str) -> Result<Self> {
        let value = parse_decimal(text)?;
        Self::new(value).map_err(|_| PaymentError::InvalidAmount {
            value: text.trim().to_string(),
            reason: "amount must be positive".to_string(),
        })
    }

    pub fn value(&self) -> &BigDecimal {
        &self.0
    }
}

impl FromStr for Amount {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<BigDecimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: BigDecimal) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Amount> for BigDecimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

/// Trailing zeros are trimmed but one fractional digit always remains,
/// so `100` renders as `100.0` and `10.50` as `10.5`. Never uses
/// exponent notation.
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&plain_string(&self.0))
    }
}

fn plain_string(value: &BigDecimal) -> String {
    let (digits, scale) = value.normalized().as_bigint_and_exponent();
    let digits = digits.to_string();
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits.as_str()),
    };

    if scale <= 0 {
        let zeros = "0".repeat(scale.unsigned_abs() as usize);
        return format!("{sign}{digits}{zeros}.0");
    }

    let scale = scale as usize;
    if digits.len() > scale {
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        format!("{sign}{int_part}.{frac_part}")
    } else {
        let zeros = "0".repeat(scale - digits.len());
        format!("{sign}0.{zeros}{digits}")
    }
}

/// Parses a decimal literal without a sign check.
///
/// Every digit of the literal is kept.
pub fn parse_decimal(text: &str) -> Result<BigDecimal> {
    let text = text.trim();
    let invalid = |reason: String| PaymentError::InvalidAmount {
        value: text.to_string(),
        reason,
    };

    let value = BigDecimal::from_str(text)
        .map_err(|e| invalid(format!("invalid amount format ({e})")))?;
    let (_, exponent) = value.normalized().as_bigint_and_exponent();
    if exponent.unsigned_abs() > MAX_EXPONENT {
        return Err(invalid(format!("exponent out of range (limit is 1e{MAX_EXPONENT})")));
    }
    Ok(value)
}

/// Renders an optional amount, using `0` when there is none.
pub fn format_amount(amount: Option<&Amount>) -> String {
    amount.map_or_else(|| "0".to_string(), Amount::to_string)
}
