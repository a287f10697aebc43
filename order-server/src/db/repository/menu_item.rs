//! Menu Item Repository

use std::collections::HashMap;

use super::RepoResult;
use shared::models::{
    MenuItem, MenuItemDetail, MenuItemIngredientInfo, Modifier, ModifierGroup, ModifierGroupDetail,
};
use sqlx::{SqliteConnection, SqlitePool};

const MENU_ITEM_SELECT: &str = "SELECT id, name, price, menu_type, category, is_available, is_manually_disabled, sort_order, created_at, updated_at FROM menu_item";

const MODIFIER_SELECT: &str = "SELECT id, group_id, name, price, is_available, ingredient_id, sort_order FROM modifier";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuItemDetail>> {
    let sql = format!("{MENU_ITEM_SELECT} ORDER BY sort_order, id");
    let items = sqlx::query_as::<_, MenuItem>(&sql).fetch_all(pool).await?;
    hydrate(pool, items).await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItemDetail>> {
    let sql = format!("{MENU_ITEM_SELECT} WHERE id = ?");
    let item = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    let Some(item) = item else {
        return Ok(None);
    };
    let mut details = hydrate(pool, vec![item]).await?;
    Ok(details.pop())
}

pub async fn find_item_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuItem>> {
    let sql = format!("{MENU_ITEM_SELECT} WHERE id = ?");
    let row = sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Batch lookup for order creation. Missing ids are simply absent
/// from the result; the caller decides how to treat them.
pub async fn find_items_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<MenuItem>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("{MENU_ITEM_SELECT} WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, MenuItem>(&sql);
    for id in ids {
        query = query.bind(*id);
    }
    Ok(query.fetch_all(pool).await?)
}

pub async fn find_modifiers_by_ids(pool: &SqlitePool, ids: &[i64]) -> RepoResult<Vec<Modifier>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("{MODIFIER_SELECT} WHERE id IN ({placeholders})");
    let mut query = sqlx::query_as::<_, Modifier>(&sql);
    for id in ids {
        query = query.bind(*id);
    }
    Ok(query.fetch_all(pool).await?)
}

/// Attach modifier groups, modifiers and ingredient info to menu items
async fn hydrate(pool: &SqlitePool, items: Vec<MenuItem>) -> RepoResult<Vec<MenuItemDetail>> {
    if items.is_empty() {
        return Ok(Vec::new());
    }
    let item_ids: Vec<i64> = items.iter().map(|i| i.id).collect();
    let placeholders = vec!["?"; item_ids.len()].join(", ");

    let sql = format!(
        "SELECT id, menu_item_id, name, sort_order FROM modifier_group WHERE menu_item_id IN ({placeholders}) ORDER BY sort_order, id"
    );
    let mut query = sqlx::query_as::<_, ModifierGroup>(&sql);
    for id in &item_ids {
        query = query.bind(*id);
    }
    let groups = query.fetch_all(pool).await?;

    let sql = format!(
        "SELECT m.id, m.group_id, m.name, m.price, m.is_available, m.ingredient_id, m.sort_order FROM modifier m JOIN modifier_group g ON m.group_id = g.id WHERE g.menu_item_id IN ({placeholders}) ORDER BY m.sort_order, m.id"
    );
    let mut query = sqlx::query_as::<_, Modifier>(&sql);
    for id in &item_ids {
        query = query.bind(*id);
    }
    let modifiers = query.fetch_all(pool).await?;

    let sql = format!(
        "SELECT mil.menu_item_id, i.id, i.name, mil.is_primary, i.in_stock FROM menu_item_ingredient mil JOIN ingredient i ON i.id = mil.ingredient_id WHERE mil.menu_item_id IN ({placeholders}) ORDER BY i.name"
    );
    let mut query = sqlx::query_as::<_, (i64, i64, String, bool, bool)>(&sql);
    for id in &item_ids {
        query = query.bind(*id);
    }
    let ingredient_rows = query.fetch_all(pool).await?;

    let mut modifiers_by_group: HashMap<i64, Vec<Modifier>> = HashMap::new();
    for m in modifiers {
        modifiers_by_group.entry(m.group_id).or_default().push(m);
    }

    let mut groups_by_item: HashMap<i64, Vec<ModifierGroupDetail>> = HashMap::new();
    for g in groups {
        let detail = ModifierGroupDetail {
            modifiers: modifiers_by_group.remove(&g.id).unwrap_or_default(),
            group: g,
        };
        groups_by_item
            .entry(detail.group.menu_item_id)
            .or_default()
            .push(detail);
    }

    let mut ingredients_by_item: HashMap<i64, Vec<MenuItemIngredientInfo>> = HashMap::new();
    for (menu_item_id, ingredient_id, name, is_primary, in_stock) in ingredient_rows {
        ingredients_by_item
            .entry(menu_item_id)
            .or_default()
            .push(MenuItemIngredientInfo {
                ingredient_id,
                name,
                is_primary,
                in_stock,
            });
    }

    Ok(items
        .into_iter()
        .map(|item| MenuItemDetail {
            modifier_groups: groups_by_item.remove(&item.id).unwrap_or_default(),
            ingredients: ingredients_by_item.remove(&item.id).unwrap_or_default(),
            item,
        })
        .collect())
}

/// Disable items whose primary ingredients ran out, re-enable the
/// rest. Runs set-based so a full pass is idempotent. An ingredient
/// only affects items in its own menu_type partition, and manually
/// disabled items are never re-enabled here.
///
/// Returns (disabled, enabled) row counts.
pub async fn sync_item_availability(
    conn: &mut SqliteConnection,
    now: i64,
) -> RepoResult<(u64, u64)> {
    let disabled = sqlx::query(
        "UPDATE menu_item SET is_available = 0, updated_at = ?1 \
         WHERE is_available = 1 AND id IN ( \
           SELECT mil.menu_item_id FROM menu_item_ingredient mil \
           JOIN ingredient i ON i.id = mil.ingredient_id \
           JOIN menu_item m ON m.id = mil.menu_item_id \
           WHERE mil.is_primary = 1 AND i.in_stock = 0 AND i.menu_type = m.menu_type)",
    )
    .bind(now)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let enabled = sqlx::query(
        "UPDATE menu_item SET is_available = 1, updated_at = ?1 \
         WHERE is_available = 0 AND is_manually_disabled = 0 AND id NOT IN ( \
           SELECT mil.menu_item_id FROM menu_item_ingredient mil \
           JOIN ingredient i ON i.id = mil.ingredient_id \
           JOIN menu_item m ON m.id = mil.menu_item_id \
           WHERE mil.is_primary = 1 AND i.in_stock = 0 AND i.menu_type = m.menu_type)",
    )
    .bind(now)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok((disabled, enabled))
}

/// Modifier availability mirrors the linked ingredient directly;
/// unlinked modifiers stay available.
///
/// Returns (disabled, enabled) row counts.
pub async fn sync_modifier_availability(conn: &mut SqliteConnection) -> RepoResult<(u64, u64)> {
    let disabled = sqlx::query(
        "UPDATE modifier SET is_available = 0 \
         WHERE is_available = 1 AND ingredient_id IN (SELECT id FROM ingredient WHERE in_stock = 0)",
    )
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let enabled = sqlx::query(
        "UPDATE modifier SET is_available = 1 \
         WHERE is_available = 0 AND (ingredient_id IS NULL \
           OR ingredient_id IN (SELECT id FROM ingredient WHERE in_stock = 1))",
    )
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok((disabled, enabled))
}
