//! Pre-built Test Fixtures
//!
//! Consistent, predictable values for unit and integration tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{Currency, FixedClock, Money};
use fake::faker::company::en::CompanyName;
use fake::faker::internet::en::SafeEmail;
use fake::Fake;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// USD amount in cents
    pub fn usd(amount: i64) -> Money {
        Money::new(amount, Currency::USD).unwrap()
    }

    /// EUR amount in cents, for currency isolation tests
    pub fn eur(amount: i64) -> Money {
        Money::new(amount, Currency::EUR).unwrap()
    }

    pub fn usd_100() -> Money {
        Self::usd(10_000)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }
}

/// Fixture for dates and clocks
pub struct DateFixtures;

impl DateFixtures {
    /// The instant every fixture clock is pinned to
    pub fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    pub fn today() -> NaiveDate {
        Self::now().date_naive()
    }

    /// Day `day` of June 2024
    pub fn june(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    /// Day `day` of July 2024
    pub fn july(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, day).unwrap()
    }

    pub fn clock() -> FixedClock {
        FixedClock::new(Self::now())
    }
}

/// Fixture for generated customer details
pub struct CustomerFixtures;

impl CustomerFixtures {
    pub fn company_name() -> String {
        CompanyName().fake()
    }

    pub fn email() -> String {
        SafeEmail().fake()
    }

    pub fn tax_id() -> &'static str {
        "1234567890"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Clock;

    #[test]
    fn test_money_fixtures_currencies() {
        assert_eq!(MoneyFixtures::usd_100().currency(), Currency::USD);
        assert_eq!(MoneyFixtures::eur(1).currency(), Currency::EUR);
    }

    #[test]
    fn test_clock_matches_today() {
        assert_eq!(DateFixtures::clock().today(), DateFixtures::today());
        assert!(DateFixtures::june(1) < DateFixtures::july(1));
    }

    #[test]
    fn test_generated_names_are_not_empty() {
        assert!(!CustomerFixtures::company_name().trim().is_empty());
        assert!(CustomerFixtures::email().contains('@'));
    }
}
