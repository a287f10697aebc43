//! Cashier API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::{DailyHistory, OrderDetail, PaymentRequest, UnsettledBoard};

use crate::core::ServerState;
use crate::utils::AppResult;

/// GET /api/cashier/unsettled - 待结账总览 (按桌分组 + 外卖栏)
pub async fn unsettled(State(state): State<ServerState>) -> AppResult<Json<UnsettledBoard>> {
    let board = state.cashier.unsettled().await?;
    Ok(Json(board))
}

/// GET /api/cashier/history/daily - 当日结账历史与支付方式汇总
pub async fn daily_history(State(state): State<ServerState>) -> AppResult<Json<DailyHistory>> {
    let history = state.cashier.daily_history().await?;
    Ok(Json(history))
}

/// POST /api/table/{id}/pay - 整桌结账
pub async fn pay_table(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<Vec<OrderDetail>>> {
    let settled = state.cashier.settle_table(id, payload.payment_method).await?;
    Ok(Json(settled))
}

/// POST /api/order/{id}/pay - 单笔结账
pub async fn pay_order(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentRequest>,
) -> AppResult<Json<OrderDetail>> {
    let detail = state.cashier.settle_order(id, payload.payment_method).await?;
    Ok(Json(detail))
}
