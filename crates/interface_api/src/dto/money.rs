//! Money on the wire

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{Currency, Money, MoneyError};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct MoneyRequest {
    /// Minor units, e.g. cents
    #[validate(range(min = 1, message = "must be a positive number of minor units"))]
    pub amount: i64,
    #[validate(length(equal = 3, message = "must be a three-letter ISO 4217 code"))]
    pub currency: String,
}

impl MoneyRequest {
    pub fn to_money(&self) -> Result<Money, MoneyError> {
        Money::from_code(self.amount, &self.currency)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyResponse {
    pub amount: i64,
    pub currency: Currency,
    /// `amount` in major units, e.g. `"12.50"`
    pub display: Decimal,
}

/// Minor units as an exact decimal in the currency's major unit
pub fn to_major_units(amount: i64, currency: Currency) -> Decimal {
    Decimal::new(amount, currency.decimal_places())
}

impl From<Money> for MoneyResponse {
    fn from(money: Money) -> Self {
        Self {
            amount: money.amount(),
            currency: money.currency(),
            display: to_major_units(money.amount(), money.currency()),
        }
    }
}

pub fn money_list(amounts: Vec<Money>) -> Vec<MoneyResponse> {
    amounts.into_iter().map(MoneyResponse::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_display_uses_currency_decimals() {
        let usd = MoneyResponse::from(Money::new(1250, Currency::USD).unwrap());
        assert_eq!(usd.display, dec!(12.50));

        let jpy = MoneyResponse::from(Money::new(1250, Currency::JPY).unwrap());
        assert_eq!(jpy.display, dec!(1250));
    }

    #[test]
    fn test_request_validation() {
        let ok = MoneyRequest { amount: 100, currency: "USD".into() };
        assert!(ok.validate().is_ok());
        assert_eq!(ok.to_money().unwrap(), Money::new(100, Currency::USD).unwrap());

        let zero = MoneyRequest { amount: 0, currency: "USD".into() };
        assert!(zero.validate().is_err());

        let long = MoneyRequest { amount: 5, currency: "DOLLARS".into() };
        assert!(long.validate().is_err());
    }
}
