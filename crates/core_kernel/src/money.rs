//! Money types with exact integer arithmetic
//!
//! Amounts are held as non-negative integers in the currency's minor units
//! (cents for a two-decimal currency). No floating point is used anywhere in
//! this module and every operation returns a new value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Three-letter currency code (ISO 4217 style)
///
/// Codes are normalised to upper case. Any three ASCII letters are accepted so
/// the ledger is not tied to a fixed list of currencies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency([u8; 3]);

impl Currency {
    pub const USD: Currency = Currency(*b"USD");
    pub const EUR: Currency = Currency(*b"EUR");
    pub const GBP: Currency = Currency(*b"GBP");
    pub const JPY: Currency = Currency(*b"JPY");
    pub const TRY: Currency = Currency(*b"TRY");

    /// Parses a currency code
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::InvalidCurrency` if the code is empty or is not
    /// exactly three ASCII letters.
    pub fn new(code: &str) -> Result<Self, MoneyError> {
        let trimmed = code.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(MoneyError::InvalidCurrency(code.to_string()));
        }

        let mut normalised = [0u8; 3];
        for (slot, byte) in normalised.iter_mut().zip(bytes) {
            *slot = byte.to_ascii_uppercase();
        }
        Ok(Self(normalised))
    }

    /// Returns the code, e.g. `"USD"`
    pub fn code(&self) -> &str {
        // Only ASCII letters are ever stored.
        std::str::from_utf8(&self.0).unwrap_or("???")
    }

    /// Number of minor-unit digits used when rendering amounts
    pub fn decimal_places(&self) -> u32 {
        match &self.0 {
            b"JPY" | b"KRW" | b"VND" | b"CLP" | b"ISK" => 0,
            b"BHD" | b"KWD" | b"OMR" | b"JOD" | b"TND" => 3,
            _ => 2,
        }
    }
}

impl fmt::Debug for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Currency({})", self.code())
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = MoneyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> String {
        currency.code().to_string()
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Amount cannot be negative: {0}")]
    NegativeAmount(i64),

    #[error("Invalid currency code: '{0}'")]
    InvalidCurrency(String),

    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(Currency, Currency),

    #[error("Overflow during calculation")]
    Overflow,
}

/// A non-negative monetary amount in minor units with its currency
///
/// # Invariants
///
/// - `amount >= 0`
/// - binary operations only combine values of the same currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMoney")]
pub struct Money {
    amount: i64,
    currency: Currency,
}

#[derive(Deserialize)]
struct RawMoney {
    amount: i64,
    currency: Currency,
}

impl TryFrom<RawMoney> for Money {
    type Error = MoneyError;

    fn try_from(raw: RawMoney) -> Result<Self, Self::Error> {
        Money::new(raw.amount, raw.currency)
    }
}

impl Money {
    /// Creates a Money value from an amount in minor units
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::NegativeAmount` if `amount < 0`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use core_kernel::{Money, Currency};
    ///
    /// let m = Money::new(10050, Currency::USD).unwrap();
    /// assert_eq!(m.amount(), 10050);
    /// assert_eq!(m.to_string(), "USD 100.50");
    /// ```
    pub fn new(amount: i64, currency: Currency) -> Result<Self, MoneyError> {
        if amount < 0 {
            return Err(MoneyError::NegativeAmount(amount));
        }
        Ok(Self { amount, currency })
    }

    /// Parses the currency code and creates the value in one step
    pub fn from_code(amount: i64, currency: &str) -> Result<Self, MoneyError> {
        Self::new(amount, Currency::new(currency)?)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self { amount: 0, currency }
    }

    /// Returns the amount in minor units
    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount == 0
    }

    pub fn is_positive(&self) -> bool {
        self.amount > 0
    }

    pub fn same_currency(&self, other: &Money) -> bool {
        self.currency == other.currency
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(self.currency, other.currency));
        }
        Ok(())
    }

    /// Adds two amounts of the same currency
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let sum = self
            .amount
            .checked_add(other.amount)
            .ok_or(MoneyError::Overflow)?;
        Money::new(sum, self.currency)
    }

    /// Subtracts `other` from `self`
    ///
    /// # Errors
    ///
    /// - `CurrencyMismatch` on differing currencies
    /// - `NegativeAmount` if the result would drop below zero
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        Money::new(self.amount - other.amount, self.currency)
    }

    /// Strict `self > other`
    pub fn greater_than(&self, other: &Money) -> Result<bool, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount > other.amount)
    }

    /// Returns the smaller of two same-currency amounts
    pub fn min(&self, other: &Money) -> Result<Money, MoneyError> {
        if self.greater_than(other)? {
            Ok(*other)
        } else {
            Ok(*self)
        }
    }

    /// Sums an iterator of amounts that must all be in `currency`
    pub fn sum<'a, I>(currency: Currency, amounts: I) -> Result<Money, MoneyError>
    where
        I: IntoIterator<Item = &'a Money>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(currency), |acc, m| acc.checked_add(m))
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        if dp == 0 {
            return write!(f, "{} {}", self.currency, self.amount);
        }
        let scale = 10_i64.pow(dp);
        write!(
            f,
            "{} {}.{:0width$}",
            self.currency,
            self.amount / scale,
            self.amount % scale,
            width = dp as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usd(amount: i64) -> Money {
        Money::new(amount, Currency::USD).unwrap()
    }

    #[test]
    fn test_money_creation() {
        let m = usd(10050);
        assert_eq!(m.amount(), 10050);
        assert_eq!(m.currency(), Currency::USD);
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert_eq!(
            Money::new(-1, Currency::USD),
            Err(MoneyError::NegativeAmount(-1))
        );
    }

    #[test]
    fn test_empty_currency_rejected() {
        assert!(matches!(
            Money::from_code(100, ""),
            Err(MoneyError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_currency_is_normalised() {
        assert_eq!(Currency::new("usd").unwrap(), Currency::USD);
        assert_eq!(Currency::new(" eur ").unwrap(), Currency::EUR);
    }

    #[test]
    fn test_currency_mismatch() {
        let eur = Money::new(100, Currency::EUR).unwrap();
        assert!(matches!(
            usd(100).checked_add(&eur),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_subtract_below_zero() {
        assert_eq!(
            usd(100).checked_sub(&usd(101)),
            Err(MoneyError::NegativeAmount(-1))
        );
    }

    #[test]
    fn test_add_overflow() {
        let big = usd(i64::MAX);
        assert_eq!(big.checked_add(&usd(1)), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_display() {
        assert_eq!(usd(5).to_string(), "USD 0.05");
        assert_eq!(Money::new(10000, Currency::JPY).unwrap().to_string(), "JPY 10000");
    }
}
