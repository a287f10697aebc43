//! Ingredient Repository

use super::{RepoError, RepoResult};
use shared::models::Ingredient;
use sqlx::{SqliteConnection, SqlitePool};

const INGREDIENT_SELECT: &str =
    "SELECT id, name, menu_type, in_stock, created_at, updated_at FROM ingredient";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Ingredient>> {
    let sql = format!("{INGREDIENT_SELECT} ORDER BY menu_type, name");
    let rows = sqlx::query_as::<_, Ingredient>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Ingredient>> {
    let sql = format!("{INGREDIENT_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, Ingredient>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn set_stock(
    conn: &mut SqliteConnection,
    id: i64,
    in_stock: bool,
    now: i64,
) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE ingredient SET in_stock = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(in_stock)
        .bind(now)
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Ingredient {id} not found")));
    }
    Ok(())
}
