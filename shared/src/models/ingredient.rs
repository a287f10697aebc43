//! Ingredient Model

use serde::{Deserialize, Serialize};

use super::MenuType;

/// Ingredient entity (原料)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub menu_type: MenuType,
    pub in_stock: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Stock toggle payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockUpdate {
    pub in_stock: bool,
}

/// Cascade result of a stock toggle or a full reconciliation pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityReport {
    /// Menu items switched to unavailable
    pub items_disabled: u64,
    /// Menu items switched back to available
    pub items_enabled: u64,
    /// Modifiers switched to unavailable
    pub modifiers_disabled: u64,
    /// Modifiers switched back to available
    pub modifiers_enabled: u64,
}

impl AvailabilityReport {
    /// True when the pass changed nothing
    pub fn is_noop(&self) -> bool {
        self.items_disabled == 0
            && self.items_enabled == 0
            && self.modifiers_disabled == 0
            && self.modifiers_enabled == 0
    }
}
