//! Read-only projections over ledger data
//!
//! Both projections are pure folds over already-loaded aggregates. Amounts are
//! kept per currency throughout; nothing is ever added across currencies.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError};

use crate::customer::Customer;
use crate::invoice::Invoice;
use crate::payment::Payment;

/// Headline figures for the whole ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Sum of payments' original amounts
    pub total_collected: Vec<Money>,
    /// Sum of invoice totals
    pub total_revenue: Vec<Money>,
    /// `max(0, revenue - collected)` per currency
    ///
    /// Approximate: collected funds still sitting unallocated on a payment
    /// are counted as if they had settled invoices.
    pub pending_balance: Vec<Money>,
    pub open_invoices: u64,
    pub total_customers: u64,
}

impl DashboardStats {
    pub fn new(
        total_revenue: Vec<Money>,
        total_collected: Vec<Money>,
        open_invoices: u64,
        total_customers: u64,
    ) -> Self {
        let pending_balance = pending_by_currency(&total_revenue, &total_collected);
        Self {
            total_collected,
            total_revenue,
            pending_balance,
            open_invoices,
            total_customers,
        }
    }
}

fn pending_by_currency(revenue: &[Money], collected: &[Money]) -> Vec<Money> {
    let mut pending: BTreeMap<Currency, Money> = BTreeMap::new();
    for r in revenue {
        pending.insert(r.currency(), *r);
    }
    for c in collected {
        let entry = pending
            .entry(c.currency())
            .or_insert_with(|| Money::zero(c.currency()));
        // clamp at zero when more was collected than invoiced
        *entry = entry
            .checked_sub(c)
            .unwrap_or_else(|_| Money::zero(c.currency()));
    }
    pending.into_values().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementEntryKind {
    Invoice,
    Payment,
}

/// One dated movement on a customer's account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementLine {
    pub date: NaiveDate,
    pub kind: StatementEntryKind,
    pub reference: String,
    pub description: String,
    pub currency: Currency,
    /// Minor units owed by this line (invoices)
    pub debit: i64,
    /// Minor units paid by this line (payments)
    pub credit: i64,
    /// Running balance in this line's currency after applying it
    pub balance: i64,
}

/// Closing balance for one currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub currency: Currency,
    pub balance: i64,
}

/// A customer's account statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub customer: Customer,
    pub lines: Vec<StatementLine>,
    pub final_balances: Vec<CurrencyBalance>,
}

impl Statement {
    /// Merges invoices and payments into date order with running balances
    ///
    /// Invoices are debits dated by issue date and payments are credits dated
    /// by payment date. On the same date, debits come before credits. Every
    /// invoice is listed, VOID included, matching the revenue total.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::Overflow` if a running balance leaves the i64 range.
    pub fn build(
        customer: Customer,
        invoices: &[Invoice],
        payments: &[Payment],
    ) -> Result<Self, MoneyError> {
        let debits = invoices
            .iter()
            .map(|inv| StatementLine {
                date: inv.issue_date(),
                kind: StatementEntryKind::Invoice,
                reference: inv.id().to_string(),
                description: "Sales invoice".to_string(),
                currency: inv.total_amount().currency(),
                debit: inv.total_amount().amount(),
                credit: 0,
                balance: 0,
            });

        let credits = payments.iter().map(|pay| StatementLine {
            date: pay.date(),
            kind: StatementEntryKind::Payment,
            reference: pay.id().to_string(),
            description: pay
                .notes()
                .map(|n| format!("Payment received: {n}"))
                .unwrap_or_else(|| "Payment received".to_string()),
            currency: pay.amount().currency(),
            debit: 0,
            credit: pay.amount().amount(),
            balance: 0,
        });

        let mut lines: Vec<StatementLine> = debits.chain(credits).collect();
        // stable, so debits stay ahead of credits on equal dates
        lines.sort_by_key(|line| line.date);

        let mut running: BTreeMap<Currency, i64> = BTreeMap::new();
        for line in &mut lines {
            let balance = running.entry(line.currency).or_insert(0);
            *balance = balance
                .checked_add(line.debit)
                .and_then(|b| b.checked_sub(line.credit))
                .ok_or(MoneyError::Overflow)?;
            line.balance = *balance;
        }

        let final_balances = running
            .into_iter()
            .map(|(currency, balance)| CurrencyBalance { currency, balance })
            .collect();

        Ok(Self {
            customer,
            lines,
            final_balances,
        })
    }

    /// Closing balance in `currency`, zero if the customer never used it
    pub fn balance_in(&self, currency: Currency) -> i64 {
        self.final_balances
            .iter()
            .find(|b| b.currency == currency)
            .map_or(0, |b| b.balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use core_kernel::{CustomerId, InvoiceId, PaymentId};

    use crate::invoice::InvoiceStatus;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn usd(amount: i64) -> Money {
        Money::new(amount, Currency::USD).unwrap()
    }

    fn customer() -> Customer {
        Customer::new(CustomerId::new(), "Globex", None, None, Utc::now()).unwrap()
    }

    fn invoice(customer: &Customer, total: Money, issued: NaiveDate) -> Invoice {
        Invoice::new(InvoiceId::new(), customer.id(), total, issued, issued, Utc::now()).unwrap()
    }

    fn payment(customer: &Customer, amount: Money, date: NaiveDate) -> Payment {
        Payment::new(PaymentId::new(), customer.id(), amount, date, None, Utc::now()).unwrap()
    }

    mod dashboard {
        use super::*;

        #[test]
        fn test_pending_is_revenue_minus_collected() {
            let stats = DashboardStats::new(vec![usd(1000)], vec![usd(300)], 2, 1);
            assert_eq!(stats.pending_balance, vec![usd(700)]);
        }

        #[test]
        fn test_pending_clamped_at_zero() {
            let stats = DashboardStats::new(vec![usd(100)], vec![usd(10_000)], 0, 1);
            assert_eq!(stats.pending_balance, vec![usd(0)]);
        }

        #[test]
        fn test_pending_kept_per_currency() {
            let eur = Money::new(500, Currency::EUR).unwrap();
            let stats = DashboardStats::new(vec![usd(1000), eur], vec![usd(1000)], 1, 2);
            assert_eq!(stats.pending_balance, vec![eur, usd(0)]);
        }
    }

    mod statement {
        use super::*;

        #[test]
        fn test_running_balance_in_date_order() {
            let c = customer();
            let invoices = vec![invoice(&c, usd(500), d(1)), invoice(&c, usd(300), d(10))];
            let payments = vec![payment(&c, usd(700), d(5))];

            let statement = Statement::build(c, &invoices, &payments).unwrap();
            let balances: Vec<i64> = statement.lines.iter().map(|l| l.balance).collect();

            assert_eq!(balances, vec![500, -200, 100]);
            assert_eq!(statement.balance_in(Currency::USD), 100);
        }

        #[test]
        fn test_debit_before_credit_on_same_day() {
            let c = customer();
            let payments = vec![payment(&c, usd(100), d(3))];
            let invoices = vec![invoice(&c, usd(100), d(3))];

            let statement = Statement::build(c, &invoices, &payments).unwrap();

            assert_eq!(statement.lines[0].kind, StatementEntryKind::Invoice);
            assert_eq!(statement.lines[0].balance, 100);
            assert_eq!(statement.lines[1].balance, 0);
        }

        #[test]
        fn test_currencies_tracked_separately() {
            let c = customer();
            let eur = Money::new(40, Currency::EUR).unwrap();
            let invoices = vec![invoice(&c, usd(100), d(1)), invoice(&c, eur, d(2))];

            let statement = Statement::build(c, &invoices, &[]).unwrap();

            assert_eq!(statement.balance_in(Currency::USD), 100);
            assert_eq!(statement.balance_in(Currency::EUR), 40);
            assert_eq!(statement.lines[1].balance, 40);
        }

        #[test]
        fn test_void_invoice_still_listed() {
            let c = customer();
            let void = Invoice::restore(
                InvoiceId::new(),
                c.id(),
                usd(250),
                usd(0),
                d(2),
                d(30),
                InvoiceStatus::Void,
                Utc::now(),
                Utc::now(),
            )
            .unwrap();
            let invoices = vec![invoice(&c, usd(100), d(1)), void];

            let statement = Statement::build(c, &invoices, &[]).unwrap();

            assert_eq!(statement.lines.len(), 2);
            assert_eq!(statement.lines[1].debit, 250);
            assert_eq!(statement.balance_in(Currency::USD), 350);
        }

        #[test]
        fn test_empty_statement() {
            let statement = Statement::build(customer(), &[], &[]).unwrap();
            assert!(statement.lines.is_empty());
            assert!(statement.final_balances.is_empty());
        }
    }
}
