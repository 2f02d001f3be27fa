//! Property-based checks of the FIFO waterfall

use core_kernel::Money;
use domain_ledger::{InvoiceStatus, PaymentRegistration};
use proptest::prelude::*;
use test_utils::{
    assert_invoice_consistent, assert_payment_conserved, usd_invoices_strategy,
    usd_money_strategy, LedgerHarness,
};

struct Outcome {
    registration: PaymentRegistration,
    statuses_in_fifo_order: bool,
}

fn run_scenario(invoices: Vec<(Money, chrono::NaiveDate)>, amount: Money) -> Outcome {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap();

    runtime.block_on(async move {
        let h = LedgerHarness::new();
        let c = h.customer().await;
        let mut saved = Vec::new();
        for (total, due) in invoices {
            saved.push(h.invoice(c.id(), total, due).await);
        }

        let registration = h.pay(c.id(), amount).await.unwrap();

        let payment = h.reload_payment(registration.payment_id).await;
        let allocations = h.allocations_of(registration.payment_id).await;
        assert_payment_conserved(&payment, &allocations);

        let mut reloaded = Vec::new();
        for inv in &saved {
            reloaded.push(h.reload_invoice(inv.id()).await);
        }
        reloaded.iter().for_each(assert_invoice_consistent);

        // in due-date order: a run of PAID, at most one PARTIAL, then OPEN
        reloaded.sort_by_key(|inv| inv.due_date());
        let rank = |s: InvoiceStatus| match s {
            InvoiceStatus::Paid => 0,
            InvoiceStatus::Partial => 1,
            _ => 2,
        };
        let ranks: Vec<u8> = reloaded.iter().map(|inv| rank(inv.status())).collect();
        let partials = ranks.iter().filter(|r| **r == 1).count();
        let statuses_in_fifo_order = ranks.windows(2).all(|w| w[0] <= w[1]) && partials <= 1;

        Outcome {
            registration,
            statuses_in_fifo_order,
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn allocated_plus_remaining_equals_amount(
        invoices in usd_invoices_strategy(6),
        amount in usd_money_strategy(),
    ) {
        let outcome = run_scenario(invoices, amount);
        let reg = &outcome.registration;

        prop_assert_eq!(reg.total_allocated.checked_add(&reg.remaining).unwrap(), amount);
    }

    #[test]
    fn invoices_never_overpaid(
        invoices in usd_invoices_strategy(6),
        amount in usd_money_strategy(),
    ) {
        let outcome = run_scenario(invoices, amount);

        prop_assert!(outcome.statuses_in_fifo_order);
    }

    #[test]
    fn leftover_only_when_everything_is_paid(
        invoices in usd_invoices_strategy(6),
        amount in usd_money_strategy(),
    ) {
        let owed: i64 = invoices.iter().map(|(total, _)| total.amount()).sum();
        let outcome = run_scenario(invoices, amount);
        let reg = &outcome.registration;

        prop_assert_eq!(reg.total_allocated.amount(), owed.min(amount.amount()));
        if !reg.remaining.is_zero() {
            prop_assert_eq!(reg.total_allocated.amount(), owed);
        }
        prop_assert!(reg.allocations.iter().all(|a| a.amount.is_positive()));
    }
}
