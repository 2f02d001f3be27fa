//! Test Data Builders
//!
//! Builders for ledger entities with sensible defaults, so tests only spell
//! out the fields they care about.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{CustomerId, InvoiceId, Money, PaymentId};
use domain_ledger::{Customer, Invoice, Payment};

use crate::fixtures::{CustomerFixtures, DateFixtures, MoneyFixtures};

/// Builder for [`Customer`]
pub struct CustomerBuilder {
    id: CustomerId,
    name: String,
    email: Option<String>,
    tax_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl Default for CustomerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomerBuilder {
    pub fn new() -> Self {
        Self {
            id: CustomerId::new(),
            name: CustomerFixtures::company_name(),
            email: Some(CustomerFixtures::email()),
            tax_id: Some(CustomerFixtures::tax_id().to_string()),
            created_at: DateFixtures::now(),
        }
    }

    pub fn with_id(mut self, id: CustomerId) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn build(self) -> Customer {
        Customer::new(self.id, self.name, self.email, self.tax_id, self.created_at)
            .expect("builder produced an invalid customer")
    }
}

/// Builder for [`Invoice`]
///
/// Defaults to a 100.00 USD invoice issued and due on the fixture date.
pub struct InvoiceBuilder {
    id: InvoiceId,
    customer_id: CustomerId,
    total: Money,
    paid: Option<Money>,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl InvoiceBuilder {
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            id: InvoiceId::new(),
            customer_id,
            total: MoneyFixtures::usd_100(),
            paid: None,
            issue_date: DateFixtures::today(),
            due_date: DateFixtures::today(),
            created_at: DateFixtures::now(),
        }
    }

    pub fn with_total(mut self, total: Money) -> Self {
        self.total = total;
        self
    }

    /// Pre-applies `paid` so the invoice starts PARTIAL or PAID
    pub fn with_paid(mut self, paid: Money) -> Self {
        self.paid = Some(paid);
        self
    }

    pub fn issued_on(mut self, date: NaiveDate) -> Self {
        self.issue_date = date;
        self
    }

    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.due_date = date;
        self
    }

    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::new(
            self.id,
            self.customer_id,
            self.total,
            self.issue_date,
            self.due_date,
            self.created_at,
        )
        .expect("builder produced an invalid invoice");

        if let Some(paid) = self.paid.filter(|p| p.is_positive()) {
            invoice
                .allocate_payment(paid, self.created_at)
                .expect("builder paid amount exceeds total");
        }
        invoice
    }
}

/// Builder for [`Payment`]
pub struct PaymentBuilder {
    id: PaymentId,
    customer_id: CustomerId,
    amount: Money,
    date: NaiveDate,
    notes: Option<String>,
}

impl PaymentBuilder {
    pub fn new(customer_id: CustomerId) -> Self {
        Self {
            id: PaymentId::new(),
            customer_id,
            amount: MoneyFixtures::usd_100(),
            date: DateFixtures::today(),
            notes: None,
        }
    }

    pub fn with_amount(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn build(self) -> Payment {
        Payment::new(
            self.id,
            self.customer_id,
            self.amount,
            self.date,
            self.notes,
            DateFixtures::now(),
        )
        .expect("builder produced an invalid payment")
    }
}
