//! Table Session Model

use serde::{Deserialize, Serialize};

/// Table session entity (并桌会话)
///
/// Groups N physical tables into one logical bill. The host table is
/// authoritative: the session is active until the host is settled or
/// the session is explicitly closed. Closing never deletes the row;
/// past orders stay attributable to the session for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TableSession {
    pub id: i64,
    /// Short human-shareable join code, unique among active sessions
    pub code: String,
    pub host_table_id: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub closed_at: Option<i64>,
}

/// Create session payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSessionCreate {
    pub host_table_id: i64,
    /// Table numbers joining the host's bill (host's own number is implied)
    #[serde(default)]
    pub linked_table_numbers: Vec<i64>,
}

/// Session with resolved table numbers (API payload)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSessionDetail {
    #[serde(flatten)]
    pub session: TableSession,
    pub host_table_number: i64,
    /// Linked members in join order, host excluded
    pub linked_table_numbers: Vec<i64>,
}

/// Result of resolving a table number against active sessions
///
/// `is_host` decides the frontend flow: the host goes straight to the
/// shared menu, a linked member is asked to confirm it still belongs
/// to the group (the table may have been re-seated since).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResolution {
    pub is_host: bool,
    #[serde(flatten)]
    pub detail: TableSessionDetail,
}
