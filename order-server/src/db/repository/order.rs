//! Order Repository
//!
//! Pool-based reads and hydration. Order creation, transitions and
//! settlement are transactional and live in the order/cashier
//! services.

use std::collections::HashMap;

use super::RepoResult;
use shared::models::{
    DiningTable, Order, OrderDetail, OrderItem, OrderItemDetail, OrderItemModifier,
    PaymentMethodBreakdown,
};
use sqlx::SqlitePool;

pub const ORDER_SELECT: &str = "SELECT id, receipt_number, queue_number, table_id, table_session_id, order_type, payment_method, status, subtotal, surcharge, total, is_paid, paid_at, customer_name, customer_phone, notes, created_at, updated_at FROM orders";

const ORDER_ITEM_SELECT: &str =
    "SELECT id, order_id, menu_item_id, name, price, quantity, consume_mode, notes FROM order_item";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_detail(pool: &SqlitePool, id: i64) -> RepoResult<Option<OrderDetail>> {
    let Some(order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let mut details = hydrate(pool, vec![order]).await?;
    Ok(details.pop())
}

/// Kitchen feed: everything still moving through the lifecycle
pub async fn find_active(pool: &SqlitePool) -> RepoResult<Vec<OrderDetail>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE status NOT IN ('SERVED', 'CANCELLED') ORDER BY created_at, id"
    );
    let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?;
    hydrate(pool, orders).await
}

/// Orders awaiting settlement: unpaid and not cancelled
pub async fn find_unsettled(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE is_paid = 0 AND status != 'CANCELLED' ORDER BY created_at, id"
    );
    let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(pool).await?;
    Ok(orders)
}

/// Orders settled at or after the given timestamp, newest first
pub async fn find_paid_since(pool: &SqlitePool, since: i64) -> RepoResult<Vec<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE is_paid = 1 AND paid_at >= ? ORDER BY paid_at DESC, id DESC");
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(since)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Per-method settlement totals at or after the given timestamp
pub async fn method_breakdown(
    pool: &SqlitePool,
    since: i64,
) -> RepoResult<Vec<PaymentMethodBreakdown>> {
    let rows = sqlx::query_as::<_, PaymentMethodBreakdown>(
        "SELECT payment_method AS method, COUNT(*) AS count, SUM(total) AS amount \
         FROM orders WHERE is_paid = 1 AND paid_at >= ? AND payment_method IS NOT NULL \
         GROUP BY payment_method ORDER BY payment_method",
    )
    .bind(since)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Attach table, items and chosen modifiers to orders
pub async fn hydrate(pool: &SqlitePool, orders: Vec<Order>) -> RepoResult<Vec<OrderDetail>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }
    let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
    let placeholders = vec!["?"; order_ids.len()].join(", ");

    let sql = format!("{ORDER_ITEM_SELECT} WHERE order_id IN ({placeholders}) ORDER BY id");
    let mut query = sqlx::query_as::<_, OrderItem>(&sql);
    for id in &order_ids {
        query = query.bind(*id);
    }
    let items = query.fetch_all(pool).await?;

    let sql = format!(
        "SELECT m.id, m.order_item_id, m.modifier_id, m.name, m.price \
         FROM order_item_modifier m JOIN order_item oi ON oi.id = m.order_item_id \
         WHERE oi.order_id IN ({placeholders}) ORDER BY m.id"
    );
    let mut query = sqlx::query_as::<_, OrderItemModifier>(&sql);
    for id in &order_ids {
        query = query.bind(*id);
    }
    let modifiers = query.fetch_all(pool).await?;

    let mut table_ids: Vec<i64> = orders.iter().filter_map(|o| o.table_id).collect();
    table_ids.sort_unstable();
    table_ids.dedup();
    let mut tables: HashMap<i64, DiningTable> = HashMap::new();
    if !table_ids.is_empty() {
        let placeholders = vec!["?"; table_ids.len()].join(", ");
        let sql = format!(
            "SELECT id, number, name, seats, status, is_counter, is_active \
             FROM dining_table WHERE id IN ({placeholders})"
        );
        let mut query = sqlx::query_as::<_, DiningTable>(&sql);
        for id in &table_ids {
            query = query.bind(*id);
        }
        for t in query.fetch_all(pool).await? {
            tables.insert(t.id, t);
        }
    }

    let mut modifiers_by_item: HashMap<i64, Vec<OrderItemModifier>> = HashMap::new();
    for m in modifiers {
        modifiers_by_item.entry(m.order_item_id).or_default().push(m);
    }

    let mut items_by_order: HashMap<i64, Vec<OrderItemDetail>> = HashMap::new();
    for item in items {
        let detail = OrderItemDetail {
            modifiers: modifiers_by_item.remove(&item.id).unwrap_or_default(),
            item,
        };
        items_by_order
            .entry(detail.item.order_id)
            .or_default()
            .push(detail);
    }

    Ok(orders
        .into_iter()
        .map(|order| OrderDetail {
            table: order.table_id.and_then(|id| tables.get(&id).cloned()),
            items: items_by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect())
}
