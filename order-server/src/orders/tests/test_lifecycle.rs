//! 下单与状态流转用例

use shared::message::{ORDER_CREATED, ORDER_UPDATED};
use shared::models::{OrderStatus, OrderType, PaymentMethod, TableSessionCreate};

use super::*;
use crate::orders::OrderError;

// ========== 下单 ==========

#[tokio::test]
async fn test_dine_in_order_prices_lines_and_occupies_table() {
    let env = test_env().await;

    // 1. 五号桌点一份握寿司加芥末: (890 + 200) × 1 = 1090
    let detail = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![1])]))
        .await
        .unwrap();

    assert_eq!(detail.order.order_type, OrderType::DineIn);
    assert_eq!(detail.order.status, OrderStatus::Pending);
    assert_eq!(detail.order.subtotal, 1090);
    assert_eq!(detail.order.surcharge, 0);
    assert_eq!(detail.order.total, 1090);
    assert!(!detail.order.is_paid);
    assert_eq!(detail.order.paid_at, None);

    // 2. 堂食没有叫号, 小票号当天递增
    assert_eq!(detail.order.queue_number, None);
    assert!(
        detail.order.receipt_number.starts_with("REC"),
        "unexpected receipt {}",
        detail.order.receipt_number
    );
    assert_eq!(detail.order.receipt_number.len(), 16);

    // 3. 明细携带桌台与做法快照
    assert_eq!(detail.table.as_ref().unwrap().number, 5);
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].item.name, "Salmon Nigiri");
    assert_eq!(detail.items[0].modifiers.len(), 1);
    assert_eq!(detail.items[0].modifiers[0].price, 200);

    // 4. 桌台立即占用
    assert_eq!(table_status(&env.pool, 5).await, TableStatus::Occupied);
}

#[tokio::test]
async fn test_card_at_order_time_applies_surcharge() {
    let env = test_env().await;

    // 1090 × 1.03 = 1122.7 → 1123 → 抹到 1130
    let mut payload = dine_in(5, vec![line(1, 1, vec![1])]);
    payload.payment_method = Some(PaymentMethod::Card);
    let detail = env.orders.create(payload).await.unwrap();

    assert_eq!(detail.order.payment_method, Some(PaymentMethod::Card));
    assert_eq!(detail.order.subtotal, 1090);
    assert_eq!(detail.order.surcharge, 40);
    assert_eq!(detail.order.total, 1130);
}

#[tokio::test]
async fn test_takeaway_gets_queue_number_and_virtual_table_stays_free() {
    let env = test_env().await;

    let detail = env
        .orders
        .create(takeaway("Ana", vec![line(2, 2, vec![])]))
        .await
        .unwrap();

    // 虚拟桌自动推断为外卖并派发叫号
    assert_eq!(detail.order.order_type, OrderType::Takeaway);
    assert_eq!(detail.order.customer_name.as_deref(), Some("Ana"));
    let queue = detail.order.queue_number.unwrap();
    assert!((0..1000).contains(&queue), "queue out of range: {queue}");

    // 虚拟桌永不占用
    assert_eq!(table_status(&env.pool, 0).await, TableStatus::Available);
}

#[tokio::test]
async fn test_takeaway_without_customer_name_is_rejected() {
    let env = test_env().await;

    let err = env
        .orders
        .create(dine_in(0, vec![line(2, 1, vec![])]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_counter_table_infers_type_and_requires_name() {
    let env = test_env().await;

    // 吧台下单必须留客人名字
    let err = env
        .orders
        .create(dine_in(9, vec![line(2, 1, vec![])]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)), "got {err:?}");

    let mut payload = dine_in(9, vec![line(2, 1, vec![])]);
    payload.customer_name = Some("Luis".to_string());
    let detail = env.orders.create(payload).await.unwrap();
    assert_eq!(detail.order.order_type, OrderType::Counter);
    assert!(detail.order.queue_number.is_some());
}

#[tokio::test]
async fn test_unknown_catalog_ids_are_skipped_silently() {
    let env = test_env().await;

    // 1. 未知菜品整行丢弃, 未知做法单独丢弃, 有效行照常入单
    let detail = env
        .orders
        .create(dine_in(
            5,
            vec![line(999, 1, vec![]), line(1, 1, vec![1, 777])],
        ))
        .await
        .unwrap();
    assert_eq!(detail.items.len(), 1);
    assert_eq!(detail.items[0].modifiers.len(), 1);
    assert_eq!(detail.order.total, 1090);

    // 2. 全部无效则拒单
    let err = env
        .orders
        .create(dine_in(5, vec![line(999, 1, vec![])]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_zero_quantity_is_rejected() {
    let env = test_env().await;

    let err = env
        .orders
        .create(dine_in(5, vec![line(1, 0, vec![])]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::Validation(_)), "got {err:?}");
}

#[tokio::test]
async fn test_unknown_table_is_rejected() {
    let env = test_env().await;

    let err = env
        .orders
        .create(dine_in(404, vec![line(1, 1, vec![])]))
        .await
        .unwrap_err();
    assert!(matches!(err, OrderError::TableNotFound(404)), "got {err:?}");
}

#[tokio::test]
async fn test_stale_session_id_is_dropped() {
    let env = test_env().await;

    let created = env
        .sessions
        .create(TableSessionCreate {
            host_table_id: 5,
            linked_table_numbers: vec![6],
        })
        .await
        .unwrap();
    let session_id = created.session.id;

    // 1. 会话存活时挂单生效
    let mut payload = dine_in(6, vec![line(1, 1, vec![])]);
    payload.table_session_id = Some(session_id);
    let tagged = env.orders.create(payload).await.unwrap();
    assert_eq!(tagged.order.table_session_id, Some(session_id));

    // 2. 会话关闭后同一个 id 被静默丢弃, 订单按普通桌单继续
    env.sessions.close(&created.session.code).await.unwrap();
    let mut payload = dine_in(6, vec![line(1, 1, vec![])]);
    payload.table_session_id = Some(session_id);
    let plain = env.orders.create(payload).await.unwrap();
    assert_eq!(plain.order.table_session_id, None);
}

// ========== 状态流转 ==========

#[tokio::test]
async fn test_status_chain_ends_with_table_release() {
    let env = test_env().await;
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    let id = order.order.id;

    // PENDING → PREPARING → READY → SERVED
    env.orders.transition(id, OrderStatus::Preparing).await.unwrap();
    assert_eq!(table_status(&env.pool, 5).await, TableStatus::Occupied);
    env.orders.transition(id, OrderStatus::Ready).await.unwrap();
    let served = env.orders.transition(id, OrderStatus::Served).await.unwrap();
    assert_eq!(served.order.status, OrderStatus::Served);

    // 最后一张活跃订单出餐完毕, 桌台释放
    assert_eq!(table_status(&env.pool, 5).await, TableStatus::Available);
}

#[tokio::test]
async fn test_reapplying_current_status_is_a_quiet_noop() {
    let env = test_env().await;
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    let id = order.order.id;
    env.orders.transition(id, OrderStatus::Preparing).await.unwrap();

    // 厨显重发同一状态: 成功返回但不广播
    let mut rx = env.notify.subscribe();
    let again = env.orders.transition(id, OrderStatus::Preparing).await.unwrap();
    assert_eq!(again.order.status, OrderStatus::Preparing);
    assert!(rx.try_recv().is_err(), "noop must not emit an event");
}

#[tokio::test]
async fn test_skipping_a_state_is_rejected() {
    let env = test_env().await;
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();

    let err = env
        .orders
        .transition(order.order.id, OrderStatus::Served)
        .await
        .unwrap_err();
    assert!(
        matches!(
            err,
            OrderError::InvalidTransition {
                from: OrderStatus::Pending,
                to: OrderStatus::Served
            }
        ),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_cancel_frees_table_only_when_last_active() {
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

    // 1. 同桌还有别的活跃订单, 桌台保持占用
    let cancelled = env.orders.cancel(first.order.id).await.unwrap();
    assert_eq!(cancelled.order.status, OrderStatus::Cancelled);
    assert_eq!(table_status(&env.pool, 5).await, TableStatus::Occupied);

    // 2. 取消最后一张, 桌台释放
    env.orders.cancel(second.order.id).await.unwrap();
    assert_eq!(table_status(&env.pool, 5).await, TableStatus::Available);

    // 3. 重复取消是幂等操作
    let again = env.orders.cancel(first.order.id).await.unwrap();
    assert_eq!(again.order.status, OrderStatus::Cancelled);
}

#[tokio::test]
async fn test_served_order_cannot_be_cancelled() {
    let env = test_env().await;
    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    let id = order.order.id;

    env.orders.transition(id, OrderStatus::Preparing).await.unwrap();
    env.orders.transition(id, OrderStatus::Ready).await.unwrap();
    env.orders.transition(id, OrderStatus::Served).await.unwrap();

    let err = env.orders.cancel(id).await.unwrap_err();
    assert!(
        matches!(err, OrderError::InvalidTransition { .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_reserved_table_keeps_reservation_until_seated() {
    let env = test_env().await;
    sqlx::query("UPDATE dining_table SET status = 'RESERVED' WHERE id = 7")
        .execute(&env.pool)
        .await
        .unwrap();

    // 1. 空桌重算不碰预订状态
    {
        let mut conn = env.pool.acquire().await.unwrap();
        dining_table::refresh_table_status(&mut conn, 7).await.unwrap();
    }
    assert_eq!(table_status(&env.pool, 7).await, TableStatus::Reserved);

    // 2. 落座下单转占用, 取消后回到空闲
    let order = env
        .orders
        .create(dine_in(7, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    assert_eq!(table_status(&env.pool, 7).await, TableStatus::Occupied);
    env.orders.cancel(order.order.id).await.unwrap();
    assert_eq!(table_status(&env.pool, 7).await, TableStatus::Available);
}

// ========== 变更通知 ==========

#[tokio::test]
async fn test_order_events_carry_increasing_versions() {
    let env = test_env().await;
    let mut rx = env.notify.subscribe();

    let order = env
        .orders
        .create(dine_in(5, vec![line(1, 1, vec![])]))
        .await
        .unwrap();
    env.orders
        .transition(order.order.id, OrderStatus::Preparing)
        .await
        .unwrap();

    let created = rx.recv().await.unwrap();
    assert_eq!(created.event, ORDER_CREATED);
    assert_eq!(created.resource, "order");
    assert_eq!(created.resource_id, order.order.id.to_string());
    assert_eq!(created.version, 1);
    assert!(created.data.is_some());

    let updated = rx.recv().await.unwrap();
    assert_eq!(updated.event, ORDER_UPDATED);
    assert_eq!(updated.version, 2);
}
