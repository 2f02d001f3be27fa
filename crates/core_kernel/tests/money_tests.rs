//! Integration tests for the Money module
//!
//! Covers construction, arithmetic, comparison, currency handling,
//! serialization, and the property-based invariants of the value type.

use core_kernel::{Money, Currency, MoneyError};

fn usd(amount: i64) -> Money {
    Money::new(amount, Currency::USD).unwrap()
}

fn eur(amount: i64) -> Money {
    Money::new(amount, Currency::EUR).unwrap()
}

mod creation {
    use super::*;

    #[test]
    fn test_new_keeps_minor_units() {
        let m = Money::new(123_456, Currency::TRY).unwrap();
        assert_eq!(m.amount(), 123_456);
        assert_eq!(m.currency(), Currency::TRY);
    }

    #[test]
    fn test_zero_is_valid() {
        let m = Money::new(0, Currency::USD).unwrap();
        assert!(m.is_zero());
        assert_eq!(m, Money::zero(Currency::USD));
    }

    #[test]
    fn test_negative_amount_fails() {
        assert_eq!(
            Money::new(-1, Currency::USD),
            Err(MoneyError::NegativeAmount(-1))
        );
    }

    #[test]
    fn test_from_code_parses_currency() {
        let m = Money::from_code(500, "gbp").unwrap();
        assert_eq!(m.currency(), Currency::GBP);
    }

    #[test]
    fn test_from_code_rejects_empty_currency() {
        assert!(matches!(
            Money::from_code(500, ""),
            Err(MoneyError::InvalidCurrency(_))
        ));
    }

    #[test]
    fn test_from_code_rejects_malformed_currency() {
        for code in ["US", "USDX", "U$D", "12A"] {
            assert!(
                matches!(Money::from_code(1, code), Err(MoneyError::InvalidCurrency(_))),
                "expected {code} to be rejected"
            );
        }
    }

    #[test]
    fn test_negative_amount_checked_before_currency() {
        assert_eq!(
            Money::new(-5, Currency::new("CHF").unwrap()),
            Err(MoneyError::NegativeAmount(-5))
        );
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_add_same_currency() {
        assert_eq!(usd(150).checked_add(&usd(50)).unwrap(), usd(200));
    }

    #[test]
    fn test_subtract_same_currency() {
        assert_eq!(usd(150).checked_sub(&usd(50)).unwrap(), usd(100));
    }

    #[test]
    fn test_subtract_to_exact_zero() {
        assert!(usd(75).checked_sub(&usd(75)).unwrap().is_zero());
    }

    #[test]
    fn test_subtract_below_zero_fails() {
        assert_eq!(
            usd(10).checked_sub(&usd(11)),
            Err(MoneyError::NegativeAmount(-1))
        );
    }

    #[test]
    fn test_add_currency_mismatch() {
        assert_eq!(
            usd(10).checked_add(&eur(10)),
            Err(MoneyError::CurrencyMismatch(Currency::USD, Currency::EUR))
        );
    }

    #[test]
    fn test_subtract_currency_mismatch() {
        assert!(matches!(
            eur(10).checked_sub(&usd(1)),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_add_overflow_is_reported() {
        assert_eq!(usd(i64::MAX).checked_add(&usd(1)), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_operations_do_not_mutate_operands() {
        let a = usd(100);
        let b = usd(40);
        let _ = a.checked_sub(&b).unwrap();
        assert_eq!(a.amount(), 100);
        assert_eq!(b.amount(), 40);
    }

    #[test]
    fn test_sum_of_amounts() {
        let amounts = [usd(100), usd(250), usd(0)];
        assert_eq!(Money::sum(Currency::USD, &amounts).unwrap(), usd(350));
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let amounts: Vec<Money> = Vec::new();
        assert!(Money::sum(Currency::EUR, &amounts).unwrap().is_zero());
    }

    #[test]
    fn test_sum_rejects_mixed_currencies() {
        let amounts = [usd(100), eur(100)];
        assert!(matches!(
            Money::sum(Currency::USD, &amounts),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }
}

mod comparison {
    use super::*;

    #[test]
    fn test_greater_than_is_strict() {
        assert!(usd(101).greater_than(&usd(100)).unwrap());
        assert!(!usd(100).greater_than(&usd(100)).unwrap());
        assert!(!usd(99).greater_than(&usd(100)).unwrap());
    }

    #[test]
    fn test_greater_than_currency_mismatch() {
        assert!(matches!(
            usd(1).greater_than(&eur(0)),
            Err(MoneyError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn test_min_picks_smaller() {
        assert_eq!(usd(500).min(&usd(300)).unwrap(), usd(300));
        assert_eq!(usd(300).min(&usd(500)).unwrap(), usd(300));
        assert_eq!(usd(300).min(&usd(300)).unwrap(), usd(300));
    }

    #[test]
    fn test_equality_requires_same_currency() {
        assert_eq!(usd(100), usd(100));
        assert_ne!(usd(100), eur(100));
        assert_ne!(usd(100), usd(101));
    }
}

mod currency {
    use super::*;

    #[test]
    fn test_decimal_places() {
        assert_eq!(Currency::USD.decimal_places(), 2);
        assert_eq!(Currency::JPY.decimal_places(), 0);
        assert_eq!(Currency::new("KWD").unwrap().decimal_places(), 3);
    }

    #[test]
    fn test_display_and_parse() {
        let c: Currency = "try".parse().unwrap();
        assert_eq!(c, Currency::TRY);
        assert_eq!(c.to_string(), "TRY");
    }
}

mod display {
    use super::*;

    #[test]
    fn test_two_decimal_currency() {
        assert_eq!(usd(123_456).to_string(), "USD 1234.56");
        assert_eq!(usd(7).to_string(), "USD 0.07");
    }

    #[test]
    fn test_zero_decimal_currency() {
        let m = Money::new(12_345, Currency::JPY).unwrap();
        assert_eq!(m.to_string(), "JPY 12345");
    }

    #[test]
    fn test_three_decimal_currency() {
        let m = Money::from_code(1_005, "BHD").unwrap();
        assert_eq!(m.to_string(), "BHD 1.005");
    }
}

mod serialization {
    use super::*;

    #[test]
    fn test_money_json_shape() {
        let json = serde_json::to_value(usd(1050)).unwrap();
        assert_eq!(json, serde_json::json!({ "amount": 1050, "currency": "USD" }));
    }

    #[test]
    fn test_money_json_roundtrip() {
        let m = eur(99);
        let json = serde_json::to_string(&m).unwrap();
        let back: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, back);
    }

    #[test]
    fn test_negative_money_json_is_rejected() {
        let result: Result<Money, _> =
            serde_json::from_str(r#"{ "amount": -10, "currency": "USD" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_currency_json_is_rejected() {
        let result: Result<Currency, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err());
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn currency_strategy() -> impl Strategy<Value = Currency> {
        prop_oneof![
            Just(Currency::USD),
            Just(Currency::EUR),
            Just(Currency::GBP),
            Just(Currency::JPY),
            Just(Currency::TRY),
        ]
    }

    proptest! {
        #[test]
        fn construction_round_trips_amount(amount in 0i64..i64::MAX, currency in currency_strategy()) {
            prop_assert_eq!(Money::new(amount, currency).unwrap().amount(), amount);
        }

        #[test]
        fn negative_amounts_always_fail(amount in i64::MIN..0i64, currency in currency_strategy()) {
            prop_assert_eq!(Money::new(amount, currency), Err(MoneyError::NegativeAmount(amount)));
        }

        #[test]
        fn cross_currency_operations_always_fail(a in 0i64..1_000_000i64, b in 0i64..1_000_000i64) {
            let x = usd(a);
            let y = eur(b);
            prop_assert!(matches!(x.checked_add(&y), Err(MoneyError::CurrencyMismatch(_, _))));
            prop_assert!(matches!(x.checked_sub(&y), Err(MoneyError::CurrencyMismatch(_, _))));
            prop_assert!(matches!(x.greater_than(&y), Err(MoneyError::CurrencyMismatch(_, _))));
        }

        #[test]
        fn subtracting_self_is_zero(amount in 0i64..i64::MAX, currency in currency_strategy()) {
            let m = Money::new(amount, currency).unwrap();
            prop_assert!(m.checked_sub(&m).unwrap().is_zero());
        }

        #[test]
        fn min_never_exceeds_either_operand(a in 0i64..1_000_000i64, b in 0i64..1_000_000i64) {
            let smallest = usd(a).min(&usd(b)).unwrap();
            prop_assert!(smallest.amount() <= a && smallest.amount() <= b);
        }
    }
}
