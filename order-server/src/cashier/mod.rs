//! Cashier Settlement Engine
//!
//! 收银台: 未结清看板、单笔和整桌结账、当日结账历史。
//! 结账金额只从下单时的行快照重算, 从不回查在售菜单,
//! 所以改价或下架不影响已点的单。

use std::collections::HashMap;

use chrono_tz::Tz;
use shared::message::ORDER_UPDATED;
use shared::models::{
    DailyHistory, Order, OrderDetail, OrderStatus, OrderType, PaymentMethod, TableBill,
    UnsettledBoard,
};
use shared::util::now_millis;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{info, warn};

use crate::db::repository::{dining_table, order, table_session};
use crate::orders::{OrderError, OrderResult, TableLocks};
use crate::pricing::{self, PriceLine, PriceTotals};
use crate::services::NotifyService;
use crate::utils::time::{business_today, day_start_millis};

/// 通知事件的资源类型
const RESOURCE: &str = "order";

#[derive(Clone)]
pub struct CashierService {
    pool: SqlitePool,
    locks: TableLocks,
    notify: NotifyService,
    tz: Tz,
}

impl CashierService {
    pub fn new(pool: SqlitePool, locks: TableLocks, notify: NotifyService, tz: Tz) -> Self {
        Self {
            pool,
            locks,
            notify,
            tz,
        }
    }

    /// The unsettled board: dine-in orders grouped per table, takeaway
    /// and counter orders in one pickup bucket.
    pub async fn unsettled(&self) -> OrderResult<UnsettledBoard> {
        let unsettled = order::find_unsettled(&self.pool).await?;

        let mut takeaway: Vec<Order> = Vec::new();
        let mut grouped: HashMap<i64, Vec<Order>> = HashMap::new();
        for o in unsettled {
            match (o.table_id, o.order_type) {
                (Some(table_id), OrderType::DineIn) => grouped.entry(table_id).or_default().push(o),
                _ => takeaway.push(o),
            }
        }

        let mut tables = Vec::with_capacity(grouped.len());
        for (table_id, orders) in grouped {
            let Some(table) = dining_table::find_by_id(&self.pool, table_id).await? else {
                warn!("Unsettled orders reference unknown table {table_id}");
                takeaway.extend(orders);
                continue;
            };
            let session_code = table_session::find_active_by_host(&self.pool, table.id)
                .await?
                .map(|s| s.code);
            tables.push(TableBill {
                table_id: table.id,
                table_number: table.number,
                table_name: table.name,
                session_code,
                order_count: orders.len() as i64,
                total: orders.iter().map(|o| o.total).sum(),
                orders,
            });
        }
        tables.sort_by_key(|t| t.table_number);

        Ok(UnsettledBoard { tables, takeaway })
    }

    /// Settle a single order.
    ///
    /// The cashier's method wins over whatever was chosen at order
    /// time; totals are recomputed from the stored snapshots. Frees
    /// the owning table when this was its last active order, and
    /// closes a hosted session once nothing in its scope is unpaid.
    pub async fn settle_order(
        &self,
        order_id: i64,
        method: PaymentMethod,
    ) -> OrderResult<OrderDetail> {
        let existing = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;
        if existing.status == OrderStatus::Cancelled {
            return Err(OrderError::Cancelled(order_id));
        }
        if existing.is_paid {
            return Err(OrderError::AlreadySettled(order_id));
        }

        let _guard = match existing.table_id {
            Some(table_id) => Some(self.locks.acquire(table_id).await),
            None => None,
        };

        let now = now_millis();
        let mut tx = self.pool.begin().await?;
        let totals = settle_one(&mut tx, order_id, method, now).await?;

        if let Some(table_id) = existing.table_id {
            dining_table::refresh_table_status(&mut tx, table_id).await?;
            close_hosted_session_if_settled(&mut tx, table_id, now).await?;
        }
        // The order may be billed to a session hosted elsewhere
        if let Some(session_id) = existing.table_session_id {
            close_session_if_settled(&mut tx, session_id, now).await?;
        }
        tx.commit().await?;

        let detail = self.detail_of(order_id).await?;
        self.notify
            .publish(ORDER_UPDATED, RESOURCE, &order_id.to_string(), &detail);
        info!(
            "Settled order {} by {:?}: total {}",
            existing.receipt_number, method, totals.total
        );
        Ok(detail)
    }

    /// Settle every open order billed to a table in one transaction.
    ///
    /// Covers orders owned by the table plus orders billed to the
    /// active session it hosts. Payment, table release and session
    /// closure land atomically; a failure rolls all of it back.
    pub async fn settle_table(
        &self,
        table_id: i64,
        method: PaymentMethod,
    ) -> OrderResult<Vec<OrderDetail>> {
        let table = dining_table::find_by_id(&self.pool, table_id)
            .await?
            .ok_or(OrderError::TableNotFound(table_id))?;

        let _guard = self.locks.acquire(table.id).await;
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let hosted: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM table_session WHERE host_table_id = ? AND is_active = 1")
                .bind(table.id)
                .fetch_optional(&mut *tx)
                .await?;

        let order_ids: Vec<i64> = match hosted {
            Some((session_id,)) => {
                sqlx::query_scalar(
                    "SELECT id FROM orders WHERE is_paid = 0 AND status != 'CANCELLED' \
                     AND (table_id = ? OR table_session_id = ?) ORDER BY created_at, id",
                )
                .bind(table.id)
                .bind(session_id)
                .fetch_all(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT id FROM orders WHERE is_paid = 0 AND status != 'CANCELLED' \
                     AND table_id = ? ORDER BY created_at, id",
                )
                .bind(table.id)
                .fetch_all(&mut *tx)
                .await?
            }
        };
        if order_ids.is_empty() {
            return Err(OrderError::NothingToSettle(table.id));
        }

        for id in &order_ids {
            settle_one(&mut tx, *id, method, now).await?;
        }

        dining_table::refresh_table_status(&mut tx, table.id).await?;

        if let Some((session_id,)) = hosted {
            sqlx::query("UPDATE table_session SET is_active = 0, closed_at = ? WHERE id = ?")
                .bind(now)
                .bind(session_id)
                .execute(&mut *tx)
                .await?;

            // Linked tables are freed too once their session orders are paid
            let member_table_ids: Vec<i64> = sqlx::query_scalar(
                "SELECT t.id FROM dining_table t \
                 JOIN table_session_member m ON m.table_number = t.number \
                 WHERE m.session_id = ?",
            )
            .bind(session_id)
            .fetch_all(&mut *tx)
            .await?;
            for member_id in member_table_ids {
                dining_table::refresh_table_status(&mut tx, member_id).await?;
            }
        }
        tx.commit().await?;

        let mut details = Vec::with_capacity(order_ids.len());
        for id in &order_ids {
            let detail = self.detail_of(*id).await?;
            self.notify
                .publish(ORDER_UPDATED, RESOURCE, &id.to_string(), &detail);
            details.push(detail);
        }
        info!(
            "Settled table {}: {} orders by {:?}",
            table.number,
            details.len(),
            method
        );
        Ok(details)
    }

    /// Orders settled since the start of the current business day,
    /// with a per-method breakdown for till reconciliation.
    pub async fn daily_history(&self) -> OrderResult<DailyHistory> {
        let today = business_today(self.tz);
        let since = day_start_millis(today, self.tz);

        let orders = order::find_paid_since(&self.pool, since).await?;
        let breakdown = order::method_breakdown(&self.pool, since).await?;

        Ok(DailyHistory {
            business_date: today.format("%Y-%m-%d").to_string(),
            order_count: orders.len() as i64,
            total: orders.iter().map(|o| o.total).sum(),
            breakdown,
            orders,
        })
    }

    async fn detail_of(&self, order_id: i64) -> OrderResult<OrderDetail> {
        order::find_detail(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }
}

/// Recompute one order from its stored snapshots and mark it paid.
///
/// The guarded UPDATE keeps a double settlement from racing past the
/// caller's pre-check.
async fn settle_one(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    method: PaymentMethod,
    now: i64,
) -> OrderResult<PriceTotals> {
    let items: Vec<(i64, i64, i64)> =
        sqlx::query_as("SELECT id, price, quantity FROM order_item WHERE order_id = ? ORDER BY id")
            .bind(order_id)
            .fetch_all(&mut **tx)
            .await?;
    let modifiers: Vec<(i64, i64)> = sqlx::query_as(
        "SELECT m.order_item_id, m.price FROM order_item_modifier m \
         JOIN order_item oi ON oi.id = m.order_item_id WHERE oi.order_id = ?",
    )
    .bind(order_id)
    .fetch_all(&mut **tx)
    .await?;

    let mut modifier_prices: HashMap<i64, Vec<i64>> = HashMap::new();
    for (item_id, price) in modifiers {
        modifier_prices.entry(item_id).or_default().push(price);
    }
    let price_lines: Vec<PriceLine> = items
        .iter()
        .map(|(id, price, quantity)| PriceLine {
            unit_price: *price,
            quantity: *quantity,
            modifier_prices: modifier_prices.remove(id).unwrap_or_default(),
        })
        .collect();
    let totals = pricing::price_order(&price_lines, Some(method));

    let result = sqlx::query(
        "UPDATE orders SET payment_method = ?, subtotal = ?, surcharge = ?, total = ?, \
         is_paid = 1, paid_at = ?, updated_at = ? WHERE id = ? AND is_paid = 0",
    )
    .bind(method)
    .bind(totals.subtotal)
    .bind(totals.surcharge)
    .bind(totals.total)
    .bind(now)
    .bind(now)
    .bind(order_id)
    .execute(&mut **tx)
    .await?;
    if result.rows_affected() == 0 {
        return Err(OrderError::AlreadySettled(order_id));
    }
    Ok(totals)
}

/// Close the session hosted by this table once its scope is settled
async fn close_hosted_session_if_settled(
    tx: &mut Transaction<'_, Sqlite>,
    table_id: i64,
    now: i64,
) -> OrderResult<()> {
    let hosted: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM table_session WHERE host_table_id = ? AND is_active = 1")
            .bind(table_id)
            .fetch_optional(&mut **tx)
            .await?;
    match hosted {
        Some((session_id,)) => close_session_if_settled(tx, session_id, now).await,
        None => Ok(()),
    }
}

/// Close one active session once no order in its scope (the host
/// table's own orders plus session-billed ones) is left unpaid
async fn close_session_if_settled(
    tx: &mut Transaction<'_, Sqlite>,
    session_id: i64,
    now: i64,
) -> OrderResult<()> {
    let session: Option<(i64,)> =
        sqlx::query_as("SELECT host_table_id FROM table_session WHERE id = ? AND is_active = 1")
            .bind(session_id)
            .fetch_optional(&mut **tx)
            .await?;
    let Some((host_table_id,)) = session else {
        return Ok(());
    };

    let open: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM orders WHERE is_paid = 0 AND status != 'CANCELLED' \
         AND (table_id = ? OR table_session_id = ?)",
    )
    .bind(host_table_id)
    .bind(session_id)
    .fetch_one(&mut **tx)
    .await?;
    if open == 0 {
        sqlx::query("UPDATE table_session SET is_active = 0, closed_at = ? WHERE id = ?")
            .bind(now)
            .bind(session_id)
            .execute(&mut **tx)
            .await?;
        info!("Closed session {session_id} after final settlement");
    }
    Ok(())
}
