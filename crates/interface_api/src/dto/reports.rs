//! Statement and dashboard DTOs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::Currency;
use domain_ledger::{DashboardStats, Statement, StatementEntryKind, StatementLine};

use super::customers::CustomerResponse;
use super::money::{money_list, to_major_units, MoneyResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementLineResponse {
    pub date: NaiveDate,
    pub kind: StatementEntryKind,
    pub reference: String,
    pub description: String,
    pub currency: Currency,
    pub debit: Decimal,
    pub credit: Decimal,
    pub balance: Decimal,
}

impl From<&StatementLine> for StatementLineResponse {
    fn from(line: &StatementLine) -> Self {
        Self {
            date: line.date,
            kind: line.kind,
            reference: line.reference.clone(),
            description: line.description.clone(),
            currency: line.currency,
            debit: to_major_units(line.debit, line.currency),
            credit: to_major_units(line.credit, line.currency),
            balance: to_major_units(line.balance, line.currency),
        }
    }
}

/// Closing balance; negative when the customer holds unallocated credit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub currency: Currency,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementResponse {
    pub customer: CustomerResponse,
    pub lines: Vec<StatementLineResponse>,
    pub final_balances: Vec<BalanceResponse>,
}

impl From<&Statement> for StatementResponse {
    fn from(statement: &Statement) -> Self {
        Self {
            customer: CustomerResponse::from(&statement.customer),
            lines: statement.lines.iter().map(StatementLineResponse::from).collect(),
            final_balances: statement
                .final_balances
                .iter()
                .map(|b| BalanceResponse {
                    currency: b.currency,
                    balance: to_major_units(b.balance, b.currency),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub total_collected: Vec<MoneyResponse>,
    pub total_revenue: Vec<MoneyResponse>,
    /// Revenue minus collections per currency, floored at zero; treats
    /// unallocated payment balances as settled
    pub pending_balance: Vec<MoneyResponse>,
    pub open_invoices: u64,
    pub total_customers: u64,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_collected: money_list(stats.total_collected),
            total_revenue: money_list(stats.total_revenue),
            pending_balance: money_list(stats.pending_balance),
            open_invoices: stats.open_invoices,
            total_customers: stats.total_customers,
        }
    }
}
