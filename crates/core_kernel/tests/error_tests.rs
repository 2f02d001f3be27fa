//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::{Currency, MoneyError};

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_invalid_identifier() {
    let error = CoreError::invalid_identifier("payment", "PAY-xyz");
    let display = error.to_string();

    assert!(display.contains("payment"));
    assert!(display.contains("PAY-xyz"));
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch(Currency::USD, Currency::EUR);
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
    assert!(core_error.to_string().contains("USD"));
}

#[test]
fn test_money_error_messages() {
    assert!(MoneyError::NegativeAmount(-3).to_string().contains("-3"));
    assert!(MoneyError::InvalidCurrency(String::new()).to_string().contains("Invalid currency"));
    assert!(MoneyError::Overflow.to_string().contains("Overflow"));
}
