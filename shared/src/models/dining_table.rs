//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table occupancy status (桌台状态)
///
/// AVAILABLE ↔ OCCUPIED flips are derived from the table's active
/// orders; RESERVED is only ever set by staff and survives until the
/// party is seated (first order flips it to OCCUPIED).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum TableStatus {
    #[default]
    Available,
    Occupied,
    Reserved,
}

/// Dining table entity (桌台)
///
/// `number` 0 is reserved for the virtual takeaway table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub number: i64,
    pub name: String,
    pub seats: i64,
    pub status: TableStatus,
    /// Counter/walk-up tables require a customer name on every order
    pub is_counter: bool,
    pub is_active: bool,
}

impl DiningTable {
    /// The virtual takeaway table never participates in occupancy
    pub fn is_takeaway_virtual(&self) -> bool {
        self.number == 0
    }
}
