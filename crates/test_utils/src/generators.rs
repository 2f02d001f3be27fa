//! Property-Based Test Generators
//!
//! Proptest strategies producing values that respect the ledger's invariants.

use chrono::{Duration, NaiveDate};
use core_kernel::{Currency, Money};
use proptest::prelude::*;

/// Strategy for generating supported Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::TRY),
    ]
}

/// Strategy for generating positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..10_000_000i64
}

/// Strategy for generating positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::new(amount, currency).unwrap())
}

/// Strategy for generating positive USD amounts
pub fn usd_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::new(amount, Currency::USD).unwrap())
}

/// Strategy for a due date within 2024
pub fn due_date_2024_strategy() -> impl Strategy<Value = NaiveDate> {
    (0i64..365i64).prop_map(|days| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(days))
}

/// Strategy for a customer's open invoices as `(total, due_date)` pairs in USD
pub fn usd_invoices_strategy(max: usize) -> impl Strategy<Value = Vec<(Money, NaiveDate)>> {
    proptest::collection::vec((usd_money_strategy(), due_date_2024_strategy()), 0..=max)
}

/// Strategy for a starting amount and a run of charges against it
///
/// Charges range up to the full starting amount, so runs overshoot, and about
/// one in ten is in EUR so currency checks get exercised too.
pub fn usd_balance_with_charges_strategy(max_charges: usize) -> impl Strategy<Value = (Money, Vec<Money>)> {
    usd_money_strategy().prop_flat_map(move |start| {
        let charge = (
            0i64..=start.amount(),
            prop_oneof![9 => Just(Currency::USD), 1 => Just(Currency::EUR)],
        )
            .prop_map(|(amount, currency)| Money::new(amount, currency).unwrap());
        (Just(start), proptest::collection::vec(charge, 0..=max_charges))
    })
}
