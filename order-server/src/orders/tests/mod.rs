//! Integration tests over an in-memory database
//!
//! 覆盖下单、状态流转、并桌与结账的端到端行为。
//! 所有用例共用同一套小型菜单和桌位种子数据。

use chrono_tz::Tz;
use shared::models::{CartItemInput, OrderCreate, TableStatus};
use sqlx::SqlitePool;

use crate::cashier::CashierService;
use crate::db::DbService;
use crate::db::repository::dining_table;
use crate::orders::{OrderService, TableLocks};
use crate::services::NotifyService;
use crate::sessions::SessionService;

const TEST_TZ: Tz = chrono_tz::Europe::Madrid;

struct TestEnv {
    pool: SqlitePool,
    orders: OrderService,
    cashier: CashierService,
    sessions: SessionService,
    notify: NotifyService,
    locks: TableLocks,
}

async fn test_env() -> TestEnv {
    let db = DbService::open_in_memory().await.unwrap();
    let pool = db.pool;
    seed(&pool).await;

    let notify = NotifyService::new();
    let locks = TableLocks::new();
    TestEnv {
        orders: OrderService::new(pool.clone(), locks.clone(), notify.clone(), TEST_TZ),
        cashier: CashierService::new(pool.clone(), locks.clone(), notify.clone(), TEST_TZ),
        sessions: SessionService::new(pool.clone()),
        notify,
        locks,
        pool,
    }
}

/// Floor plan: tables 5/6/7, a counter table 9, the seeded virtual
/// takeaway table 0. Catalog: nigiri 890 with an extras group
/// (wasabi +200, soy +0) and curry 750.
async fn seed(pool: &SqlitePool) {
    for (id, number, name, is_counter) in [
        (5, 5, "Table 5", 0),
        (6, 6, "Table 6", 0),
        (7, 7, "Table 7", 0),
        (9, 9, "Counter", 1),
    ] {
        sqlx::query(
            "INSERT INTO dining_table (id, number, name, seats, status, is_counter, is_active) \
             VALUES (?, ?, ?, 4, 'AVAILABLE', ?, 1)",
        )
        .bind(id)
        .bind(number)
        .bind(name)
        .bind(is_counter)
        .execute(pool)
        .await
        .unwrap();
    }

    sqlx::query(
        "INSERT INTO menu_item (id, name, price, menu_type) VALUES \
         (1, 'Salmon Nigiri', 890, 'SUSHI'), (2, 'Chicken Curry', 750, 'CLASSIC')",
    )
    .execute(pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO modifier_group (id, menu_item_id, name) VALUES (1, 1, 'Extras')")
        .execute(pool)
        .await
        .unwrap();
    sqlx::query(
        "INSERT INTO modifier (id, group_id, name, price) VALUES \
         (1, 1, 'Extra Wasabi', 200), (2, 1, 'Soy Sauce', 0)",
    )
    .execute(pool)
    .await
    .unwrap();
}

fn line(menu_item_id: i64, quantity: i64, modifier_ids: Vec<i64>) -> CartItemInput {
    CartItemInput {
        menu_item_id,
        quantity,
        modifier_ids,
        consume_mode: None,
        notes: None,
    }
}

fn dine_in(table_id: i64, items: Vec<CartItemInput>) -> OrderCreate {
    OrderCreate {
        table_id,
        table_session_id: None,
        items,
        order_type: None,
        payment_method: None,
        customer_name: None,
        customer_phone: None,
        notes: None,
    }
}

fn takeaway(customer_name: &str, items: Vec<CartItemInput>) -> OrderCreate {
    OrderCreate {
        customer_name: Some(customer_name.to_string()),
        ..dine_in(0, items)
    }
}

async fn table_status(pool: &SqlitePool, table_id: i64) -> TableStatus {
    dining_table::find_by_id(pool, table_id)
        .await
        .unwrap()
        .unwrap()
        .status
}

mod test_lifecycle;
mod test_settlement;
