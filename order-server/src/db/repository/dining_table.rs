//! Dining Table Repository

use super::RepoResult;
use shared::models::DiningTable;
use sqlx::{SqliteConnection, SqlitePool};

const TABLE_SELECT: &str =
    "SELECT id, number, name, seats, status, is_counter, is_active FROM dining_table";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<DiningTable>> {
    let sql = format!("{TABLE_SELECT} WHERE is_active = 1 ORDER BY number");
    let rows = sqlx::query_as::<_, DiningTable>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{TABLE_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_number(pool: &SqlitePool, number: i64) -> RepoResult<Option<DiningTable>> {
    let sql = format!("{TABLE_SELECT} WHERE number = ?");
    let row = sqlx::query_as::<_, DiningTable>(&sql)
        .bind(number)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Recompute a table's occupancy from its live orders in one statement.
///
/// OCCUPIED iff the table owns at least one unpaid order outside the
/// terminal states. RESERVED survives while the table is empty, and
/// the virtual takeaway table (number 0) never changes status.
pub async fn refresh_table_status(conn: &mut SqliteConnection, table_id: i64) -> RepoResult<()> {
    sqlx::query(
        "UPDATE dining_table SET status = CASE \
           WHEN (SELECT COUNT(*) FROM orders o WHERE o.table_id = dining_table.id \
                 AND o.is_paid = 0 AND o.status NOT IN ('SERVED', 'CANCELLED')) > 0 \
           THEN 'OCCUPIED' \
           WHEN status = 'OCCUPIED' THEN 'AVAILABLE' \
           ELSE status END \
         WHERE id = ?1 AND number != 0",
    )
    .bind(table_id)
    .execute(&mut *conn)
    .await?;
    Ok(())
}
