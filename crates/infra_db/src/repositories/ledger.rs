//! Ledger repository
//!
//! Row types and SQL for the four ledger tables. Every query runs on a
//! borrowed connection, so the same code serves pooled reads and the
//! statements of an open transaction.
//!
//! Rows convert into domain aggregates through the aggregates' `restore`
//! constructors; a row that breaks an invariant surfaces as
//! [`DatabaseError::InvalidRow`].

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgConnection};
use uuid::Uuid;

use core_kernel::{AllocationId, CustomerId, InvoiceId, Money, PaymentId};
use domain_ledger::{Allocation, Customer, Invoice, InvoiceStatus, Payment};

use crate::error::DatabaseError;

#[derive(Debug, Clone, FromRow)]
pub struct CustomerRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub currency: String,
    pub total_amount: i64,
    pub paid_amount: i64,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub currency: String,
    pub amount: i64,
    pub available_amount: i64,
    pub payment_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AllocationRow {
    pub id: Uuid,
    pub payment_id: Uuid,
    pub invoice_id: Uuid,
    pub currency: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// One `GROUP BY currency` sum
#[derive(Debug, Clone, FromRow)]
pub struct CurrencyTotalRow {
    pub currency: String,
    pub total: i64,
}

fn money(entity: &str, amount: i64, currency: &str) -> Result<Money, DatabaseError> {
    Money::from_code(amount, currency).map_err(|e| DatabaseError::invalid_row(entity, e))
}

impl TryFrom<CustomerRow> for Customer {
    type Error = DatabaseError;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        if row.name.trim().is_empty() {
            return Err(DatabaseError::invalid_row("Customer", format!("{} has a blank name", row.id)));
        }
        Ok(Customer::restore(
            CustomerId::from_uuid(row.id),
            row.name,
            row.email,
            row.tax_id,
            row.created_at,
            row.updated_at,
        ))
    }
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = DatabaseError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let status: InvoiceStatus = row
            .status
            .parse()
            .map_err(|e| DatabaseError::invalid_row("Invoice", e))?;

        Invoice::restore(
            InvoiceId::from_uuid(row.id),
            CustomerId::from_uuid(row.customer_id),
            money("Invoice", row.total_amount, &row.currency)?,
            money("Invoice", row.paid_amount, &row.currency)?,
            row.issue_date,
            row.due_date,
            status,
            row.created_at,
            row.updated_at,
        )
        .map_err(|e| DatabaseError::invalid_row("Invoice", e))
    }
}

impl TryFrom<PaymentRow> for Payment {
    type Error = DatabaseError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Payment::restore(
            PaymentId::from_uuid(row.id),
            CustomerId::from_uuid(row.customer_id),
            money("Payment", row.amount, &row.currency)?,
            money("Payment", row.available_amount, &row.currency)?,
            row.payment_date,
            row.notes,
            row.created_at,
        )
        .map_err(|e| DatabaseError::invalid_row("Payment", e))
    }
}

impl TryFrom<AllocationRow> for Allocation {
    type Error = DatabaseError;

    fn try_from(row: AllocationRow) -> Result<Self, Self::Error> {
        Allocation::restore(
            AllocationId::from_uuid(row.id),
            PaymentId::from_uuid(row.payment_id),
            InvoiceId::from_uuid(row.invoice_id),
            money("Allocation", row.amount, &row.currency)?,
            row.created_at,
        )
        .map_err(|e| DatabaseError::invalid_row("Allocation", e))
    }
}

impl TryFrom<CurrencyTotalRow> for Money {
    type Error = DatabaseError;

    fn try_from(row: CurrencyTotalRow) -> Result<Self, Self::Error> {
        money("Total", row.total, &row.currency)
    }
}

fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, DatabaseError>
where
    T: TryFrom<R, Error = DatabaseError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// Stateless query set over the ledger tables
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerRepository;

impl LedgerRepository {
    // ---- customers ----

    pub async fn upsert_customer(conn: &mut PgConnection, customer: &Customer) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, name, email, tax_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                tax_id = EXCLUDED.tax_id,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(*customer.id().as_uuid())
        .bind(customer.name())
        .bind(customer.email())
        .bind(customer.tax_id())
        .bind(customer.created_at())
        .bind(customer.updated_at())
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn get_customer(conn: &mut PgConnection, id: CustomerId) -> Result<Customer, DatabaseError> {
        sqlx::query_as::<_, CustomerRow>(
            "SELECT id, name, email, tax_id, created_at, updated_at FROM customers WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Customer", id))?
        .try_into()
    }

    pub async fn list_customers(conn: &mut PgConnection) -> Result<Vec<Customer>, DatabaseError> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, name, email, tax_id, created_at, updated_at
            FROM customers
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    pub async fn count_customers(conn: &mut PgConnection) -> Result<u64, DatabaseError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customers")
            .fetch_one(conn)
            .await?;
        Ok(count.max(0) as u64)
    }

    /// Row-locks the customer until the surrounding transaction ends
    pub async fn lock_customer(conn: &mut PgConnection, id: CustomerId) -> Result<(), DatabaseError> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM customers WHERE id = $1 FOR UPDATE")
            .bind(*id.as_uuid())
            .fetch_optional(conn)
            .await?
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("Customer", id))
    }

    // ---- invoices ----

    pub async fn upsert_invoice(conn: &mut PgConnection, invoice: &Invoice) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, customer_id, currency, total_amount, paid_amount,
                issue_date, due_date, status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                paid_amount = EXCLUDED.paid_amount,
                status = EXCLUDED.status,
                due_date = EXCLUDED.due_date,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(*invoice.id().as_uuid())
        .bind(*invoice.customer_id().as_uuid())
        .bind(invoice.total_amount().currency().code().to_string())
        .bind(invoice.total_amount().amount())
        .bind(invoice.paid_amount().amount())
        .bind(invoice.issue_date())
        .bind(invoice.due_date())
        .bind(invoice.status().as_str())
        .bind(invoice.created_at())
        .bind(invoice.updated_at())
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn get_invoice(conn: &mut PgConnection, id: InvoiceId) -> Result<Invoice, DatabaseError> {
        sqlx::query_as::<_, InvoiceRow>(&format!("{INVOICE_SELECT} WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Invoice", id))?
            .try_into()
    }

    pub async fn open_invoices_by_customer(
        conn: &mut PgConnection,
        customer_id: CustomerId,
    ) -> Result<Vec<Invoice>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{INVOICE_SELECT} WHERE customer_id = $1 AND status IN ('OPEN', 'PARTIAL') \
             ORDER BY due_date ASC, created_at ASC, id ASC"
        ))
        .bind(*customer_id.as_uuid())
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    pub async fn invoices_by_customer(
        conn: &mut PgConnection,
        customer_id: CustomerId,
    ) -> Result<Vec<Invoice>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{INVOICE_SELECT} WHERE customer_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(*customer_id.as_uuid())
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    pub async fn list_invoices(conn: &mut PgConnection) -> Result<Vec<Invoice>, DatabaseError> {
        let rows = sqlx::query_as::<_, InvoiceRow>(&format!(
            "{INVOICE_SELECT} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    pub async fn count_open_invoices(conn: &mut PgConnection) -> Result<u64, DatabaseError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE status IN ('OPEN', 'PARTIAL')")
                .fetch_one(conn)
                .await?;
        Ok(count.max(0) as u64)
    }

    pub async fn sum_invoice_totals(conn: &mut PgConnection) -> Result<Vec<Money>, DatabaseError> {
        let rows = sqlx::query_as::<_, CurrencyTotalRow>(
            r#"
            SELECT currency, SUM(total_amount)::BIGINT AS total
            FROM invoices
            GROUP BY currency
            ORDER BY currency
            "#,
        )
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    // ---- payments ----

    pub async fn upsert_payment(conn: &mut PgConnection, payment: &Payment) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO payments (
                id, customer_id, currency, amount, available_amount,
                payment_date, notes, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                available_amount = EXCLUDED.available_amount
            "#,
        )
        .bind(*payment.id().as_uuid())
        .bind(*payment.customer_id().as_uuid())
        .bind(payment.amount().currency().code().to_string())
        .bind(payment.amount().amount())
        .bind(payment.available_amount().amount())
        .bind(payment.date())
        .bind(payment.notes())
        .bind(payment.created_at())
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn get_payment(conn: &mut PgConnection, id: PaymentId) -> Result<Payment, DatabaseError> {
        sqlx::query_as::<_, PaymentRow>(&format!("{PAYMENT_SELECT} WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Payment", id))?
            .try_into()
    }

    pub async fn payments_by_customer(
        conn: &mut PgConnection,
        customer_id: CustomerId,
    ) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "{PAYMENT_SELECT} WHERE customer_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(*customer_id.as_uuid())
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    pub async fn list_payments(conn: &mut PgConnection) -> Result<Vec<Payment>, DatabaseError> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "{PAYMENT_SELECT} ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    pub async fn sum_payment_amounts(conn: &mut PgConnection) -> Result<Vec<Money>, DatabaseError> {
        let rows = sqlx::query_as::<_, CurrencyTotalRow>(
            r#"
            SELECT currency, SUM(amount)::BIGINT AS total
            FROM payments
            GROUP BY currency
            ORDER BY currency
            "#,
        )
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    // ---- allocations ----

    /// Append-only: an existing id fails with `DuplicateEntry`
    pub async fn insert_allocation(conn: &mut PgConnection, allocation: &Allocation) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO allocations (id, payment_id, invoice_id, currency, amount, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*allocation.id().as_uuid())
        .bind(*allocation.payment_id().as_uuid())
        .bind(*allocation.invoice_id().as_uuid())
        .bind(allocation.amount().currency().code().to_string())
        .bind(allocation.amount().amount())
        .bind(allocation.created_at())
        .execute(conn)
        .await?;
        Ok(())
    }

    pub async fn allocations_by_payment(
        conn: &mut PgConnection,
        payment_id: PaymentId,
    ) -> Result<Vec<Allocation>, DatabaseError> {
        let rows = sqlx::query_as::<_, AllocationRow>(&format!(
            "{ALLOCATION_SELECT} WHERE payment_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(*payment_id.as_uuid())
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }

    pub async fn allocations_by_invoice(
        conn: &mut PgConnection,
        invoice_id: InvoiceId,
    ) -> Result<Vec<Allocation>, DatabaseError> {
        let rows = sqlx::query_as::<_, AllocationRow>(&format!(
            "{ALLOCATION_SELECT} WHERE invoice_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(*invoice_id.as_uuid())
        .fetch_all(conn)
        .await?;
        convert_all(rows)
    }
}

const INVOICE_SELECT: &str = "SELECT id, customer_id, currency, total_amount, paid_amount, \
     issue_date, due_date, status, created_at, updated_at FROM invoices";

const PAYMENT_SELECT: &str = "SELECT id, customer_id, currency, amount, available_amount, \
     payment_date, notes, created_at FROM payments";

const ALLOCATION_SELECT: &str =
    "SELECT id, payment_id, invoice_id, currency, amount, created_at FROM allocations";
