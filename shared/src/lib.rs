//! Shared types for the order platform
//!
//! Data models and event types used by the order server and its
//! clients (kitchen display, cashier, QR ordering frontend).

pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Event re-exports (for convenient access)
pub use message::SyncEvent;
