//! Dining Table API Handlers

use axum::{Json, extract::State};

use shared::models::DiningTable;

use crate::core::ServerState;
use crate::db::repository::dining_table;
use crate::utils::AppResult;

/// GET /api/tables - 获取所有桌台及占用状态
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = dining_table::find_all(&state.pool).await?;
    Ok(Json(tables))
}
