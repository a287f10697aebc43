//! Ingredient Availability Resolver
//!
//! Maps ingredient stock state onto menu item and modifier
//! availability. A menu item is available only while every primary
//! ingredient of its recipe is in stock; modifiers mirror their
//! linked ingredient directly. The whole derivation runs as one
//! set-based pass inside a transaction, so re-running it is a no-op
//! when nothing changed.

use shared::models::AvailabilityReport;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::repository::{RepoResult, ingredient, menu_item};

pub mod scheduler;

pub use scheduler::ReconcileScheduler;

/// Toggle one ingredient's stock flag and cascade the effects
pub async fn apply_stock_change(
    pool: &SqlitePool,
    ingredient_id: i64,
    in_stock: bool,
) -> RepoResult<AvailabilityReport> {
    let now = shared::util::now_millis();
    let mut txn = pool.begin().await?;
    ingredient::set_stock(&mut txn, ingredient_id, in_stock, now).await?;
    let report = run_reconcile(&mut txn, now).await?;
    txn.commit().await?;

    tracing::info!(
        ingredient_id,
        in_stock,
        items_disabled = report.items_disabled,
        items_enabled = report.items_enabled,
        modifiers_disabled = report.modifiers_disabled,
        modifiers_enabled = report.modifiers_enabled,
        "Ingredient stock changed"
    );
    Ok(report)
}

/// Full re-derivation of every availability flag from current stock
pub async fn reconcile(pool: &SqlitePool) -> RepoResult<AvailabilityReport> {
    let now = shared::util::now_millis();
    let mut txn = pool.begin().await?;
    let report = run_reconcile(&mut txn, now).await?;
    txn.commit().await?;

    if !report.is_noop() {
        tracing::info!(
            items_disabled = report.items_disabled,
            items_enabled = report.items_enabled,
            modifiers_disabled = report.modifiers_disabled,
            modifiers_enabled = report.modifiers_enabled,
            "Availability reconciled"
        );
    }
    Ok(report)
}

async fn run_reconcile(conn: &mut SqliteConnection, now: i64) -> RepoResult<AvailabilityReport> {
    let (items_disabled, items_enabled) = menu_item::sync_item_availability(conn, now).await?;
    let (modifiers_disabled, modifiers_enabled) =
        menu_item::sync_modifier_availability(conn).await?;
    Ok(AvailabilityReport {
        items_disabled,
        items_enabled,
        modifiers_disabled,
        modifiers_enabled,
    })
}
