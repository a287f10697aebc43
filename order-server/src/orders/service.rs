//! Order lifecycle service
//!
//! 下单和状态流转的事务核心。读操作走 repository,
//! 多步写操作在这里以单个事务执行, 提交后才发布通知。

use std::collections::HashMap;

use chrono_tz::Tz;
use shared::message::{ORDER_CREATED, ORDER_UPDATED};
use shared::models::{
    CartItemInput, ConsumeMode, OrderCreate, OrderDetail, OrderStatus, OrderType,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db::repository::{counter, dining_table, menu_item, order, table_session};
use crate::pricing::{self, PriceLine};
use crate::services::NotifyService;
use crate::utils::time::business_today;

use super::error::{OrderError, OrderResult};
use super::locks::TableLocks;
use super::status::{check_transition, Transition};

/// 通知事件的资源类型
const RESOURCE: &str = "order";

/// Resolved cart line, a snapshot of the catalog at order time
struct CartLine {
    menu_item_id: i64,
    name: String,
    price: i64,
    quantity: i64,
    consume_mode: ConsumeMode,
    notes: Option<String>,
    modifiers: Vec<CartModifier>,
}

struct CartModifier {
    modifier_id: i64,
    name: String,
    price: i64,
}

#[derive(Clone)]
pub struct OrderService {
    pool: SqlitePool,
    locks: TableLocks,
    notify: NotifyService,
    tz: Tz,
}

impl OrderService {
    pub fn new(pool: SqlitePool, locks: TableLocks, notify: NotifyService, tz: Tz) -> Self {
        Self {
            pool,
            locks,
            notify,
            tz,
        }
    }

    /// Create an order from a cart.
    ///
    /// Prices and names are snapshotted from the live catalog; unknown
    /// item or modifier ids are dropped silently so a stale client menu
    /// degrades instead of failing the whole cart. A stale session id
    /// is dropped the same way. Holds the per-table lock across the
    /// write so settlement on the same table cannot interleave.
    pub async fn create(&self, payload: OrderCreate) -> OrderResult<OrderDetail> {
        for item in &payload.items {
            if item.quantity < 1 {
                return Err(OrderError::Validation(format!(
                    "Invalid quantity {} for menu item {}",
                    item.quantity, item.menu_item_id
                )));
            }
        }

        let table = dining_table::find_by_id(&self.pool, payload.table_id)
            .await?
            .ok_or(OrderError::TableNotFound(payload.table_id))?;

        let order_type = payload.order_type.unwrap_or(if table.is_takeaway_virtual() {
            OrderType::Takeaway
        } else if table.is_counter {
            OrderType::Counter
        } else {
            OrderType::DineIn
        });

        // Nameless tickets cannot be called out for pickup
        let needs_name =
            table.is_counter || matches!(order_type, OrderType::Takeaway | OrderType::Counter);
        if needs_name
            && !payload
                .customer_name
                .as_deref()
                .is_some_and(|n| !n.trim().is_empty())
        {
            return Err(OrderError::Validation(
                "customer_name is required for takeaway and counter orders".into(),
            ));
        }

        let mut session_id = None;
        if let Some(sid) = payload.table_session_id {
            match table_session::find_active_by_id(&self.pool, sid).await? {
                Some(session) => session_id = Some(session.id),
                None => debug!("Dropping stale table session {sid} from new order"),
            }
        }

        let lines = self.resolve_lines(&payload.items).await?;
        if lines.is_empty() {
            return Err(OrderError::Validation(
                "No valid items in order".into(),
            ));
        }

        let price_lines: Vec<PriceLine> = lines
            .iter()
            .map(|l| PriceLine {
                unit_price: l.price,
                quantity: l.quantity,
                modifier_prices: l.modifiers.iter().map(|m| m.price).collect(),
            })
            .collect();
        let totals = pricing::price_order(&price_lines, payload.payment_method);

        let today = business_today(self.tz);
        let receipt_number = counter::next_receipt_number(&self.pool, today).await?;
        let queue_number = if matches!(order_type, OrderType::Takeaway | OrderType::Counter) {
            Some(counter::next_queue_number(&self.pool, today).await?)
        } else {
            None
        };

        let order_id = snowflake_id();
        let now = now_millis();

        let _guard = self.locks.acquire(table.id).await;
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO orders (id, receipt_number, queue_number, table_id, table_session_id, \
             order_type, payment_method, status, subtotal, surcharge, total, is_paid, paid_at, \
             customer_name, customer_phone, notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(&receipt_number)
        .bind(queue_number)
        .bind(table.id)
        .bind(session_id)
        .bind(order_type)
        .bind(payload.payment_method)
        .bind(OrderStatus::Pending)
        .bind(totals.subtotal)
        .bind(totals.surcharge)
        .bind(totals.total)
        .bind(false)
        .bind(None::<i64>)
        .bind(&payload.customer_name)
        .bind(&payload.customer_phone)
        .bind(&payload.notes)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for line in &lines {
            let result = sqlx::query(
                "INSERT INTO order_item (order_id, menu_item_id, name, price, quantity, \
                 consume_mode, notes) VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(order_id)
            .bind(line.menu_item_id)
            .bind(&line.name)
            .bind(line.price)
            .bind(line.quantity)
            .bind(line.consume_mode)
            .bind(&line.notes)
            .execute(&mut *tx)
            .await?;
            let order_item_id = result.last_insert_rowid();

            for modifier in &line.modifiers {
                sqlx::query(
                    "INSERT INTO order_item_modifier (order_item_id, modifier_id, name, price) \
                     VALUES (?, ?, ?, ?)",
                )
                .bind(order_item_id)
                .bind(modifier.modifier_id)
                .bind(&modifier.name)
                .bind(modifier.price)
                .execute(&mut *tx)
                .await?;
            }
        }

        dining_table::refresh_table_status(&mut tx, table.id).await?;
        tx.commit().await?;

        let detail = self.detail_of(order_id).await?;
        self.notify
            .publish(ORDER_CREATED, RESOURCE, &order_id.to_string(), &detail);
        info!(
            "Created order {} for table {}: {} items, total {}",
            receipt_number,
            table.number,
            lines.len(),
            totals.total
        );
        Ok(detail)
    }

    /// Move an order along PENDING → PREPARING → READY → SERVED, or to
    /// CANCELLED from any active state.
    ///
    /// Re-applying the current status is a no-op and emits no event.
    /// Paid orders are immutable.
    pub async fn transition(&self, order_id: i64, target: OrderStatus) -> OrderResult<OrderDetail> {
        let existing = order::find_by_id(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))?;

        if let Transition::Noop = check_transition(existing.status, target)? {
            debug!("Order {order_id} already {target:?}, nothing to do");
            return self.detail_of(order_id).await;
        }

        if existing.is_paid {
            return Err(OrderError::AlreadyPaid(order_id));
        }

        let now = now_millis();
        let mut tx = self.pool.begin().await?;
        let result =
            sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ? AND status = ?")
                .bind(target)
                .bind(now)
                .bind(order_id)
                .bind(existing.status)
                .execute(&mut *tx)
                .await?;

        if result.rows_affected() == 0 {
            // Lost a race with a concurrent update; an identical outcome
            // still counts as success
            tx.rollback().await?;
            let current = order::find_by_id(&self.pool, order_id)
                .await?
                .ok_or(OrderError::OrderNotFound(order_id))?;
            if current.status == target {
                return self.detail_of(order_id).await;
            }
            return Err(OrderError::InvalidTransition {
                from: current.status,
                to: target,
            });
        }

        // A terminal order no longer holds its table
        if target.is_terminal()
            && let Some(table_id) = existing.table_id
        {
            dining_table::refresh_table_status(&mut tx, table_id).await?;
        }
        tx.commit().await?;

        let detail = self.detail_of(order_id).await?;
        self.notify
            .publish(ORDER_UPDATED, RESOURCE, &order_id.to_string(), &detail);
        info!(
            "Order {} moved {:?} -> {:?}",
            existing.receipt_number, existing.status, target
        );
        Ok(detail)
    }

    /// Cancel an active order
    pub async fn cancel(&self, order_id: i64) -> OrderResult<OrderDetail> {
        self.transition(order_id, OrderStatus::Cancelled).await
    }

    /// Full detail (order, table, line items with modifiers).
    pub async fn detail_of(&self, order_id: i64) -> OrderResult<OrderDetail> {
        order::find_detail(&self.pool, order_id)
            .await?
            .ok_or(OrderError::OrderNotFound(order_id))
    }

    /// Snapshot cart lines against the live catalog, dropping ids the
    /// catalog no longer knows
    async fn resolve_lines(&self, items: &[CartItemInput]) -> OrderResult<Vec<CartLine>> {
        let item_ids: Vec<i64> = items.iter().map(|i| i.menu_item_id).collect();
        let modifier_ids: Vec<i64> = items
            .iter()
            .flat_map(|i| i.modifier_ids.iter().copied())
            .collect();

        let menu_items: HashMap<_, _> = menu_item::find_items_by_ids(&self.pool, &item_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();
        let modifiers: HashMap<_, _> = menu_item::find_modifiers_by_ids(&self.pool, &modifier_ids)
            .await?
            .into_iter()
            .map(|m| (m.id, m))
            .collect();

        let mut lines = Vec::with_capacity(items.len());
        for input in items {
            let Some(menu) = menu_items.get(&input.menu_item_id) else {
                warn!("Skipping unknown menu item {} in new order", input.menu_item_id);
                continue;
            };
            let mut mods = Vec::with_capacity(input.modifier_ids.len());
            for modifier_id in &input.modifier_ids {
                match modifiers.get(modifier_id) {
                    Some(m) => mods.push(CartModifier {
                        modifier_id: m.id,
                        name: m.name.clone(),
                        price: m.price,
                    }),
                    None => warn!(
                        "Skipping unknown modifier {modifier_id} on menu item {}",
                        input.menu_item_id
                    ),
                }
            }
            lines.push(CartLine {
                menu_item_id: menu.id,
                name: menu.name.clone(),
                price: menu.price,
                quantity: input.quantity,
                consume_mode: input.consume_mode.unwrap_or_default(),
                notes: input.notes.clone(),
                modifiers: mods,
            });
        }
        Ok(lines)
    }
}
