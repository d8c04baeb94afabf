//! Exact monetary amounts.
//!
//! Balances are repeatedly incremented and decremented by the same values, so
//! amounts are held as [`Decimal`] rather than binary floats: adding and then
//! removing a transaction restores the balance to the identical value.
//! On disk an amount is a plain JSON number.

use std::{
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
    str::FromStr,
};

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer, Serialize, Serializer,
};

use crate::errors::LedgerError;

/// Characters accepted (and ignored) in front of user-entered amounts.
const CURRENCY_SYMBOLS: &[char] = &['₹', '$', '€', '£', '¥'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(Decimal);

impl Amount {
    pub const ZERO: Amount = Amount(Decimal::ZERO);
    pub const MAX: Amount = Amount(Decimal::MAX);

    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Builds an amount from a whole number of currency units.
    pub fn from_units(units: i64) -> Self {
        Self(Decimal::from(units))
    }

    /// Converts a float, rejecting NaN and infinities.
    ///
    /// The shortest round-trip text of the float is parsed, so `0.1` becomes
    /// exactly `0.1` rather than its binary approximation.
    pub fn from_f64(value: f64) -> Result<Self, LedgerError> {
        if !value.is_finite() {
            return Err(LedgerError::InvalidAmount(format!(
                "{value} is not a finite number"
            )));
        }
        Decimal::from_str(&value.to_string())
            .map(Self)
            .map_err(|err| LedgerError::InvalidAmount(format!("{value}: {err}")))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }

    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or(0.0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    /// Adds, clamping at the largest representable amount.
    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    /// Sum of `amounts`, or `None` if it does not fit.
    pub fn checked_sum<I>(amounts: I) -> Option<Amount>
    where
        I: IntoIterator<Item = Amount>,
    {
        amounts
            .into_iter()
            .try_fold(Amount::ZERO, |total, amount| total.checked_add(amount))
    }

    /// Returns the amount unchanged when it is `> 0`, otherwise `InvalidAmount`.
    pub fn ensure_positive(self) -> Result<Self, LedgerError> {
        if self.is_positive() {
            Ok(self)
        } else {
            Err(LedgerError::InvalidAmount(format!(
                "{self} must be greater than zero"
            )))
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.normalize(), f)
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parses user input such as `250`, `1,250.50` or `₹ 99.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::InvalidAmount("amount is empty".into()));
        }
        let (negative, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, trimmed),
        };
        let digits: String = rest
            .trim_start_matches(CURRENCY_SYMBOLS)
            .trim_start()
            .chars()
            .filter(|c| *c != ',')
            .collect();
        if negative && digits.starts_with(['-', '+']) {
            return Err(LedgerError::InvalidAmount(format!(
                "`{trimmed}` has more than one sign"
            )));
        }
        let value = Decimal::from_str(&digits)
            .map_err(|_| LedgerError::InvalidAmount(format!("`{trimmed}` is not a number")))?;
        Ok(Self(if negative { -value } else { value }))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self(value)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0 - rhs.0)
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(-self.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        self.0 -= rhs.0;
    }
}

/// Saturates at [`Amount::MAX`] instead of panicking.
impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Amount::saturating_add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

/// Whole amounts and amounts a JSON float carries exactly are written as
/// numbers; anything finer is written as a decimal string so no digits are lost.
impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let normalized = self.0.normalize();
        if normalized.fract().is_zero() {
            if let Some(whole) = normalized.to_i64() {
                return serializer.serialize_i64(whole);
            }
        }
        if let Some(float) = normalized.to_f64() {
            if Decimal::from_str(&float.to_string()).ok() == Some(normalized) {
                return serializer.serialize_f64(float);
            }
        }
        serializer.serialize_str(&normalized.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(AmountVisitor)
    }
}

struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a number or a numeric string")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Amount, E> {
        Ok(Amount::from_units(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Amount, E> {
        Ok(Amount(Decimal::from(value)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Amount, E> {
        Amount::from_f64(value).map_err(E::custom)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Amount, E> {
        Amount::from_str(value).map_err(E::custom)
    }
}
