//! Data models
//!
//! Shared between order-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY) and all monetary
//! values are integers in minor currency units.

pub mod cashier;
pub mod dining_table;
pub mod ingredient;
pub mod menu_item;
pub mod order;
pub mod table_session;

// Re-exports
pub use cashier::*;
pub use dining_table::*;
pub use ingredient::*;
pub use menu_item::*;
pub use order::*;
pub use table_session::*;
