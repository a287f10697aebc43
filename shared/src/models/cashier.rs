//! Cashier Model (收银)

use serde::{Deserialize, Serialize};

use super::{Order, PaymentMethod};

/// Unpaid orders grouped under one dining table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableBill {
    pub table_id: i64,
    pub table_number: i64,
    pub table_name: String,
    /// Join code of the active session hosted at this table, if any
    pub session_code: Option<String>,
    pub order_count: i64,
    /// Running total in minor currency units
    pub total: i64,
    pub orders: Vec<Order>,
}

/// Cashier overview of everything awaiting settlement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsettledBoard {
    pub tables: Vec<TableBill>,
    /// Takeaway and counter orders settle one by one
    pub takeaway: Vec<Order>,
}

/// Per-payment-method totals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PaymentMethodBreakdown {
    pub method: PaymentMethod,
    /// Number of settled orders
    pub count: i64,
    /// Total amount in minor currency units
    pub amount: i64,
}

/// Same-day settlement history for till reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyHistory {
    /// Business date (YYYY-MM-DD in the configured timezone)
    pub business_date: String,
    pub order_count: i64,
    pub total: i64,
    pub breakdown: Vec<PaymentMethodBreakdown>,
    pub orders: Vec<Order>,
}
