//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::MenuItemDetail;

use crate::core::ServerState;
use crate::db::repository::menu_item;
use crate::utils::{AppError, AppResult};

/// GET /api/menu - 获取完整菜单 (含做法组和可售状态)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuItemDetail>>> {
    let items = menu_item::find_all(&state.pool).await?;
    Ok(Json(items))
}

/// GET /api/menu/{id} - 获取单个菜品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItemDetail>> {
    let item = menu_item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu item {id}")))?;
    Ok(Json(item))
}
