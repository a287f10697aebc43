//! Table Session Repository
//!
//! Pool-based reads. Session creation and closure are multi-step
//! writes and live in the session service as single transactions.

use super::RepoResult;
use shared::models::{TableSession, TableSessionDetail};
use sqlx::SqlitePool;

const SESSION_SELECT: &str =
    "SELECT id, code, host_table_id, is_active, created_at, closed_at FROM table_session";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<TableSession>> {
    let sql = format!("{SESSION_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, TableSession>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_active_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<TableSession>> {
    let sql = format!("{SESSION_SELECT} WHERE id = ? AND is_active = 1");
    let row = sqlx::query_as::<_, TableSession>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_active_by_code(
    pool: &SqlitePool,
    code: &str,
) -> RepoResult<Option<TableSession>> {
    let sql = format!("{SESSION_SELECT} WHERE code = ? AND is_active = 1");
    let row = sqlx::query_as::<_, TableSession>(&sql)
        .bind(code)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_active_by_host(
    pool: &SqlitePool,
    host_table_id: i64,
) -> RepoResult<Option<TableSession>> {
    let sql = format!("{SESSION_SELECT} WHERE host_table_id = ? AND is_active = 1");
    let row = sqlx::query_as::<_, TableSession>(&sql)
        .bind(host_table_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Active session whose host table carries this number
pub async fn find_active_by_host_number(
    pool: &SqlitePool,
    number: i64,
) -> RepoResult<Option<TableSession>> {
    let row = sqlx::query_as::<_, TableSession>(
        "SELECT s.id, s.code, s.host_table_id, s.is_active, s.created_at, s.closed_at \
         FROM table_session s JOIN dining_table t ON t.id = s.host_table_id \
         WHERE t.number = ? AND s.is_active = 1",
    )
    .bind(number)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Active session where this number appears as a linked member
pub async fn find_active_by_member_number(
    pool: &SqlitePool,
    number: i64,
) -> RepoResult<Option<TableSession>> {
    let row = sqlx::query_as::<_, TableSession>(
        "SELECT s.id, s.code, s.host_table_id, s.is_active, s.created_at, s.closed_at \
         FROM table_session s JOIN table_session_member m ON m.session_id = s.id \
         WHERE m.table_number = ? AND s.is_active = 1",
    )
    .bind(number)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Linked member numbers in join order (host number not included)
pub async fn member_numbers(pool: &SqlitePool, session_id: i64) -> RepoResult<Vec<i64>> {
    let rows = sqlx::query_scalar::<_, i64>(
        "SELECT table_number FROM table_session_member WHERE session_id = ? ORDER BY position",
    )
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Hydrate a session with its host table number and member numbers
pub async fn detail(pool: &SqlitePool, session: TableSession) -> RepoResult<TableSessionDetail> {
    let host_table_number = sqlx::query_scalar::<_, i64>(
        "SELECT number FROM dining_table WHERE id = ?",
    )
    .bind(session.host_table_id)
    .fetch_one(pool)
    .await?;
    let linked_table_numbers = member_numbers(pool, session.id).await?;
    Ok(TableSessionDetail {
        session,
        host_table_number,
        linked_table_numbers,
    })
}
