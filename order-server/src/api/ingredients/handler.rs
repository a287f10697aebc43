//! Ingredient API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::{AvailabilityReport, Ingredient, StockUpdate};

use crate::availability;
use crate::core::ServerState;
use crate::db::repository::ingredient;
use crate::utils::AppResult;

/// GET /api/ingredients - 获取全部食材及库存状态
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Ingredient>>> {
    let ingredients = ingredient::find_all(&state.pool).await?;
    Ok(Json(ingredients))
}

/// PUT /api/ingredients/{id}/stock - 切换库存并级联菜品/做法可售性
pub async fn set_stock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<StockUpdate>,
) -> AppResult<Json<AvailabilityReport>> {
    let report = availability::apply_stock_change(&state.pool, id, payload.in_stock).await?;
    Ok(Json(report))
}

/// POST /api/ingredients/reconcile - 全量重算可售性
pub async fn reconcile(State(state): State<ServerState>) -> AppResult<Json<AvailabilityReport>> {
    let report = availability::reconcile(&state.pool).await?;
    Ok(Json(report))
}
