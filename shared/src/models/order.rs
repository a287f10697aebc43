//! Order Model

use serde::{Deserialize, Serialize};

use super::DiningTable;

/// Order fulfillment status (订单状态)
///
/// Forward chain PENDING → PREPARING → READY → SERVED, with CANCELLED
/// reachable from any non-terminal state. Transition rules live in the
/// order server; this type only knows which states are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderStatus {
    #[default]
    Pending,
    Preparing,
    Ready,
    Served,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Served | OrderStatus::Cancelled)
    }
}

/// Order type (订单类型)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum OrderType {
    #[default]
    DineIn,
    Takeaway,
    /// Walk-up order at a counter table; requires a customer name
    Counter,
}

/// Payment method (支付方式)
///
/// A label chosen by staff, not a gateway transaction. CARD adds the
/// per-line surcharge computed by the pricing calculator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PaymentMethod {
    Cash,
    Card,
}

/// Per-item consumption mode, independent of the parent order's type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ConsumeMode {
    #[default]
    DineIn,
    Takeaway,
}

/// Order entity (订单)
///
/// Monetary fields are integers in minor currency units, computed from
/// the price snapshot taken at creation and never re-read from the
/// live catalog. `surcharge` is non-zero only for CARD payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    /// Receipt number, e.g. REC2026082500042
    pub receipt_number: String,
    /// Pickup call number for takeaway/counter orders
    pub queue_number: Option<i64>,
    pub table_id: Option<i64>,
    pub table_session_id: Option<i64>,
    pub order_type: OrderType,
    pub payment_method: Option<PaymentMethod>,
    pub status: OrderStatus,
    pub subtotal: i64,
    pub surcharge: i64,
    pub total: i64,
    pub is_paid: bool,
    pub paid_at: Option<i64>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Order line entity, a snapshot of the menu item at order time (订单行)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub menu_item_id: i64,
    pub name: String,
    /// Unit price snapshot in minor currency units
    pub price: i64,
    pub quantity: i64,
    pub consume_mode: ConsumeMode,
    pub notes: Option<String>,
}

/// Chosen modifier snapshot for one order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItemModifier {
    pub id: i64,
    pub order_item_id: i64,
    pub modifier_id: i64,
    pub name: String,
    /// Price delta snapshot in minor currency units
    pub price: i64,
}

/// One cart line in an order creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemInput {
    pub menu_item_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub modifier_ids: Vec<i64>,
    pub consume_mode: Option<ConsumeMode>,
    pub notes: Option<String>,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    /// Omitted or 0 targets the virtual takeaway table
    #[serde(default)]
    pub table_id: i64,
    /// Optional session to bill under; a stale/inactive id is dropped
    /// silently and the order proceeds as a plain table order
    pub table_session_id: Option<i64>,
    pub items: Vec<CartItemInput>,
    /// Defaults from the table when absent (virtual table → TAKEAWAY,
    /// counter table → COUNTER, otherwise DINE_IN)
    pub order_type: Option<OrderType>,
    pub payment_method: Option<PaymentMethod>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
}

/// Status transition payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

/// Settlement payload (cashier has final authority on the method)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub payment_method: PaymentMethod,
}

/// Order line with its chosen modifiers (API payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemDetail {
    #[serde(flatten)]
    pub item: OrderItem,
    pub modifiers: Vec<OrderItemModifier>,
}

/// Fully hydrated order (API payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub table: Option<DiningTable>,
    pub items: Vec<OrderItemDetail>,
}
