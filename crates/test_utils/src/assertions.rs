//! Custom Test Assertions
//!
//! Assertion helpers for ledger invariants that report what was actually
//! found when they fail.

use core_kernel::Money;
use domain_ledger::{Allocation, Invoice, InvoiceStatus, Payment};

/// Asserts that a Money value is zero
pub fn assert_money_zero(money: &Money) {
    assert!(money.is_zero(), "Expected zero money, got {money}");
}

/// Asserts that money values sum to a total
///
/// # Panics
///
/// Panics if the currencies differ or the sum doesn't equal the total
pub fn assert_money_sum_equals(parts: &[Money], total: &Money) {
    let sum = Money::sum(total.currency(), parts).expect("Currency mismatch in sum");
    assert_eq!(sum, *total, "Sum of parts ({sum}) doesn't equal total ({total})");
}

/// Asserts the invoice's status and paid amount
pub fn assert_invoice_state(invoice: &Invoice, status: InvoiceStatus, paid: i64) {
    assert_eq!(
        invoice.status(),
        status,
        "Invoice {} has status {}, expected {}",
        invoice.id(),
        invoice.status(),
        status
    );
    assert_eq!(
        invoice.paid_amount().amount(),
        paid,
        "Invoice {} has paid {}, expected {}",
        invoice.id(),
        invoice.paid_amount().amount(),
        paid
    );
}

/// Asserts `0 <= paid <= total` and that the status follows from the amounts
pub fn assert_invoice_consistent(invoice: &Invoice) {
    let paid = invoice.paid_amount().amount();
    let total = invoice.total_amount().amount();
    assert!(
        (0..=total).contains(&paid),
        "Invoice {} has paid {paid} outside 0..={total}",
        invoice.id()
    );

    let expected = if paid == total {
        InvoiceStatus::Paid
    } else if paid > 0 {
        InvoiceStatus::Partial
    } else {
        InvoiceStatus::Open
    };
    if invoice.status() != InvoiceStatus::Void {
        assert_eq!(invoice.status(), expected, "Invoice {} status drifted", invoice.id());
    }
}

/// Asserts that a payment's allocations plus its available balance equal its amount
pub fn assert_payment_conserved(payment: &Payment, allocations: &[Allocation]) {
    let mut parts: Vec<Money> = allocations.iter().map(Allocation::amount).collect();
    parts.push(payment.available_amount());
    assert_money_sum_equals(&parts, &payment.amount());
}
