//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::{OrderCreate, OrderDetail, StatusUpdate};

use crate::core::ServerState;
use crate::db::repository::order;
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
};

/// POST /api/orders - 下单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<OrderDetail>> {
    validate_optional_text(&payload.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.customer_phone, "customer_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    for item in &payload.items {
        validate_optional_text(&item.notes, "item notes", MAX_NOTE_LEN)?;
    }

    let detail = state.orders.create(payload).await?;
    Ok(Json(detail))
}

/// GET /api/orders/active - 厨房进行中订单 (PENDING / PREPARING / READY)
pub async fn active(State(state): State<ServerState>) -> AppResult<Json<Vec<OrderDetail>>> {
    let orders = order::find_active(&state.pool).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id} - 订单明细
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.detail_of(id).await?;
    Ok(Json(detail))
}

/// PUT /api/orders/{id}/status - 状态流转 (厨显)
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StatusUpdate>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.transition(id, payload.status).await?;
    Ok(Json(detail))
}

/// POST /api/orders/{id}/cancel - 取消订单
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.orders.cancel(id).await?;
    Ok(Json(detail))
}
