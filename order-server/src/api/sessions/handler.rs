//! Table Session API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::models::{SessionResolution, TableSessionCreate, TableSessionDetail};

use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};

/// GET /api/sessions/resolve 的查询参数
#[derive(Deserialize)]
pub struct ResolveQuery {
    /// 桌号 (不是桌台 id)
    table: i64,
}

/// POST /api/sessions - 开并桌会话
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TableSessionCreate>,
) -> AppResult<Json<TableSessionDetail>> {
    let detail = state.sessions.create(payload).await?;
    Ok(Json(detail))
}

/// GET /api/sessions/resolve?table=N - 桌号归属查询 (点餐端确认弹窗)
pub async fn resolve(
    State(state): State<ServerState>,
    Query(query): Query<ResolveQuery>,
) -> AppResult<Json<SessionResolution>> {
    let resolution = state.sessions.resolve_by_table_number(query.table).await?;
    Ok(Json(resolution))
}

/// POST /api/sessions/{code}/close - 关闭会话
pub async fn close(
    State(state): State<ServerState>,
    Path(code): Path<String>,
) -> AppResult<Json<TableSessionDetail>> {
    validate_required_text(&code, "code", MAX_SHORT_TEXT_LEN)?;
    let detail = state.sessions.close(&code).await?;
    Ok(Json(detail))
}
