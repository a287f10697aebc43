//! 结账与收银台用例

use std::time::Duration;

use shared::models::{OrderStatus, PaymentMethod, TableSessionCreate};

use super::*;
use crate::orders::OrderError;
use crate::sessions::SessionError;

// ========== 单笔结账 ==========

#[tokio::test]
async fn test_settle_order_method_override_recomputes_totals() {
    let env = test_env().await;

    // 下单时默认现金: (890 + 200) × 1 = 1090
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![1])]))
        .await
        .unwrap();
    assert_eq!(order.order.total, 1090);

    // 收银员最终刷卡: 1090 × 1.03 = 1122.7 → 1123 → 抹到 1130
    let settled = env
        .cashier
        .settle_order(order.order.id, PaymentMethod::Card)
        .await
        .unwrap();
    assert!(settled.order.is_paid);
    assert!(settled.order.paid_at.is_some());
    assert_eq!(settled.order.payment_method, Some(PaymentMethod::Card));
    assert_eq!(settled.order.subtotal, 1090);
    assert_eq!(settled.order.surcharge, 40);
    assert_eq!(settled.order.total, 1130);
}

#[tokio::test]
async fn test_settle_order_frees_table_only_when_last() {
    let env = test_env().await;
    let first = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    let second = env
        .orders
        .create(dine_in(5, vec![line(2, 1, vec![])]))
        .await
        .unwrap();

    env.cashier
        .settle_order(first.order.id, PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(table_status(&env.pool, 5).await, TableStatus::Occupied);

    env.cashier
        .settle_order(second.order.id, PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(table_status(&env.pool, 5).await, TableStatus::Available);
}

#[tokio::test]
async fn test_cancelled_order_cannot_be_settled() {
    let env = test_env().await;
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    env.orders.cancel(order.order.id).await.unwrap();

    let err = env
        .cashier
        .settle_order(order.order.id, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Cancelled(_)), "got {err:?}");
}

#[tokio::test]
async fn test_double_settlement_is_a_conflict() {
    let env = test_env().await;
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    env.cashier
        .settle_order(order.order.id, PaymentMethod::Cash)
        .await
        .unwrap();

    let err = env
        .cashier
        .settle_order(order.order.id, PaymentMethod::Card)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::AlreadySettled(_)), "got {err:?}");
}

#[tokio::test]
async fn test_paid_order_refuses_lifecycle_moves() {
    let env = test_env().await;
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    env.cashier
        .settle_order(order.order.id, PaymentMethod::Cash)
        .await
        .unwrap();

    // 已结账订单只读
    let err = env
        .orders
        .transition(order.order.id, OrderStatus::Preparing)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::AlreadyPaid(_)), "got {err:?}");
    let err = env.orders.cancel(order.order.id).await.unwrap_err();
    assert!(matches!(err, OrderError::AlreadyPaid(_)), "got {err:?}");
}

// ========== 整桌结账 ==========

#[tokio::test]
async fn test_settle_table_batch_pays_frees_and_closes_session() {
    let env = test_env().await;

    // 1. 五号桌做东并六号桌, 两桌各有一单, 六号桌的挂到会话上
    let created = env
        .sessions
        .create(TableSessionCreate {
            host_table_id: 5,
            linked_table_numbers: vec![6],
        })
        .await
        .unwrap();
    let host_order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![1])]))
        .await
        .unwrap();
    let mut linked_payload = dine_in(6, vec![line(2, 1, vec![])]);
    linked_payload.table_session_id = Some(created.session.id);
    let linked_order = env.orders.create(linked_payload).await.unwrap();

    // 2. 主桌整桌结账把两张单一次结清
    let settled = env
        .cashier
        .settle_table(5, PaymentMethod::Cash)
        .await
        .unwrap();
    assert_eq!(settled.len(), 2);
    assert!(settled.iter().all(|d| d.order.is_paid));
    let ids: Vec<i64> = settled.iter().map(|d| d.order.id).collect();
    assert!(ids.contains(&host_order.order.id));
    assert!(ids.contains(&linked_order.order.id));

    // 3. 主桌与并桌都释放, 会话关闭后桌号解析不到
    assert_eq!(table_status(&env.pool, 5).await, TableStatus::Available);
    assert_eq!(table_status(&env.pool, 6).await, TableStatus::Available);
    let err = env.sessions.resolve_by_table_number(5).await.unwrap_err();
    assert!(matches!(err, SessionError::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_settle_table_skips_cancelled_orders() {
    let env = test_env().await;
    let keep = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    let dropped = env
        .orders
        .create(dine_in(5, vec![line(2, 1, vec![])]))
        .await
        .unwrap();
    env.orders.cancel(dropped.order.id).await.unwrap();

    // 890 × 1.03 = 916.7 → 917 → 抹到 920
    let settled = env
        .cashier
        .settle_table(5, PaymentMethod::Card)
        .await
        .unwrap();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].order.id, keep.order.id);
    assert_eq!(settled[0].order.surcharge, 30);
    assert_eq!(settled[0].order.total, 920);

    let cancelled = env.orders.detail_of(dropped.order.id).await.unwrap();
    assert!(!cancelled.order.is_paid);
}

#[tokio::test]
async fn test_settle_table_with_nothing_open_is_rejected() {
    let env = test_env().await;

    let err = env
        .cashier
        .settle_table(5, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::NothingToSettle(5)), "got {err:?}");

    let err = env
        .cashier
        .settle_table(404, PaymentMethod::Cash)
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::TableNotFound(404)), "got {err:?}");
}

#[tokio::test]
async fn test_settlement_waits_for_in_flight_table_work() {
    let env = test_env().await;
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();

    // 1. 同一张桌子还压着一个没放掉的操作 (比如下单写到一半)
    let guard = env.locks.acquire(5).await;

    let cashier = env.cashier.clone();
    let mut handle = tokio::spawn(async move { cashier.settle_table(5, PaymentMethod::Cash).await });

    // 2. 桌锁释放前结账只能等着
    let blocked = tokio::time::timeout(Duration::from_millis(50), &mut handle).await;
    assert!(blocked.is_err(), "settlement must wait for the table lock");

    // 3. 锁一放, 排队的结账立刻完成
    drop(guard);
    let settled = handle.await.unwrap().unwrap();
    assert_eq!(settled.len(), 1);
    assert_eq!(settled[0].order.id, order.order.id);
}

#[tokio::test]
async fn test_settle_order_closes_session_only_when_scope_is_clear() {
    let env = test_env().await;
    let created = env
        .sessions
        .create(TableSessionCreate {
            host_table_id: 5,
            linked_table_numbers: vec![6],
        })
        .await
        .unwrap();
    let host_order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    let mut linked_payload = dine_in(6, vec![line(2, 1, vec![])]);
    linked_payload.table_session_id = Some(created.session.id);
    let linked_order = env.orders.create(linked_payload).await.unwrap();

    // 1. 先结主桌订单: 会话上还挂着没结的单, 保持打开
    env.cashier
        .settle_order(host_order.order.id, PaymentMethod::Cash)
        .await
        .unwrap();
    let resolution = env.sessions.resolve_by_table_number(5).await.unwrap();
    assert!(resolution.detail.session.is_active);

    // 2. 挂单也结清后会话自动关闭, 并桌桌台一并释放
    env.cashier
        .settle_order(linked_order.order.id, PaymentMethod::Cash)
        .await
        .unwrap();
    assert!(env.sessions.resolve_by_table_number(5).await.is_err());
    assert_eq!(table_status(&env.pool, 6).await, TableStatus::Available);
}

// ========== 收银台视图 ==========

#[tokio::test]
async fn test_unsettled_board_groups_dine_in_by_table() {
    let env = test_env().await;
    let created = env
        .sessions
        .create(TableSessionCreate {
            host_table_id: 5,
            linked_table_numbers: vec![],
        })
        .await
        .unwrap();

    env.orders
        .create(dine_in(5, vec![line(1, 1, vec![1])])) // 1090
        .await
        .unwrap();
    env.orders
        .create(dine_in(5, vec![line(2, 1, vec![])])) // 750
        .await
        .unwrap();
    env.orders
        .create(dine_in(6, vec![line(2, 1, vec![])])) // 750
        .await
        .unwrap();
    env.orders
        .create(takeaway("Ana", vec![line(2, 2, vec![])])) // 1500
        .await
        .unwrap();

    let board = env.cashier.unsettled().await.unwrap();

    // 桌台按桌号排序, 每桌带会话码与合计
    assert_eq!(board.tables.len(), 2);
    let five = &board.tables[0];
    assert_eq!(five.table_number, 5);
    assert_eq!(five.order_count, 2);
    assert_eq!(five.total, 1090 + 750);
    assert_eq!(
        five.session_code.as_deref(),
        Some(created.session.code.as_str())
    );
    let six = &board.tables[1];
    assert_eq!(six.table_number, 6);
    assert_eq!(six.session_code, None);

    // 外卖单独一栏
    assert_eq!(board.takeaway.len(), 1);
    assert_eq!(board.takeaway[0].total, 1500);
}

#[tokio::test]
async fn test_daily_history_breaks_down_by_method() {
    let env = test_env().await;

    let cash_order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![1])]))
        .await
        .unwrap();
    env.cashier
        .settle_order(cash_order.order.id, PaymentMethod::Cash) // 1090
        .await
        .unwrap();

    let card_order = env
        .orders
        .create(dine_in(6, vec![line(2, 1, vec![])]))
        .await
        .unwrap();
    env.cashier
        .settle_order(card_order.order.id, PaymentMethod::Card) // 750 → 780
        .await
        .unwrap();

    // 未结账订单不进当日历史
    env.orders
        .create(dine_in(7, vec![line(1, 1, vec![])]))
        .await
        .unwrap();

    let history = env.cashier.daily_history().await.unwrap();
    assert_eq!(history.business_date.len(), 10, "expected YYYY-MM-DD");
    assert_eq!(history.order_count, 2);
    assert_eq!(history.total, 1090 + 780);
    assert_eq!(history.orders.len(), 2);

    // 分组按方式字母序: CARD 在 CASH 前
    assert_eq!(history.breakdown.len(), 2);
    assert_eq!(history.breakdown[0].method, PaymentMethod::Card);
    assert_eq!(history.breakdown[0].count, 1);
    assert_eq!(history.breakdown[0].amount, 780);
    assert_eq!(history.breakdown[1].method, PaymentMethod::Cash);
    assert_eq!(history.breakdown[1].amount, 1090);
}
