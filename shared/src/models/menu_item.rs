//! Menu Item Model

use serde::{Deserialize, Serialize};

/// Menu partition (菜单分区)
///
/// Ingredients only gate items in their own partition; the two menus
/// never cross-affect each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum MenuType {
    #[default]
    Classic,
    Sushi,
}

/// Menu item entity (菜品)
///
/// `is_available` is derived state: false when the item is manually
/// disabled or any primary ingredient is out of stock. Clients must
/// treat it as read-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    /// Base price in minor currency units
    pub price: i64,
    pub menu_type: MenuType,
    pub category: Option<String>,
    pub is_available: bool,
    pub is_manually_disabled: bool,
    pub sort_order: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Modifier group entity (选项组，如 "配料"、"辣度")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ModifierGroup {
    pub id: i64,
    pub menu_item_id: i64,
    pub name: String,
    pub sort_order: i64,
}

/// Modifier entity (选项)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Modifier {
    pub id: i64,
    pub group_id: i64,
    pub name: String,
    /// Price delta in minor currency units (can be zero)
    pub price: i64,
    pub is_available: bool,
    /// Optional ingredient backing this option; stock toggles cascade here
    pub ingredient_id: Option<i64>,
    pub sort_order: i64,
}

/// Ingredient association as seen from a menu item (struck-through UI info)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItemIngredientInfo {
    pub ingredient_id: i64,
    pub name: String,
    pub is_primary: bool,
    pub in_stock: bool,
}

/// Modifier group with its modifiers (menu payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModifierGroupDetail {
    #[serde(flatten)]
    pub group: ModifierGroup,
    pub modifiers: Vec<Modifier>,
}

/// Fully hydrated menu item (menu payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemDetail {
    #[serde(flatten)]
    pub item: MenuItem,
    pub modifier_groups: Vec<ModifierGroupDetail>,
    pub ingredients: Vec<MenuItemIngredientInfo>,
}
