//! Per-table serialization
//!
//! 同一张桌子的下单和结账必须串行执行, 否则结账扫描和新订单插入
//! 可能交错, 漏掉刚落库的订单。

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created per-table mutexes shared by order creation and
/// settlement
#[derive(Clone, Default)]
pub struct TableLocks {
    locks: Arc<DashMap<i64, Arc<Mutex<()>>>>,
}

impl TableLocks {
    pub fn new() -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Acquire the lock for one table, waiting until any in-flight
    /// operation on the same table finishes
    pub async fn acquire(&self, table_id: i64) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(table_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}
