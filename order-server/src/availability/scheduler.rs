//! Availability reconcile scheduler
//!
//! 周期性重算菜品可售性, 兜底直接改库或并发写入造成的漂移。
//! 核对本身是幂等的, 多跑一次没有副作用。

use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use super::reconcile;

pub struct ReconcileScheduler {
    pool: SqlitePool,
    interval: Duration,
    shutdown: CancellationToken,
}

impl ReconcileScheduler {
    pub fn new(pool: SqlitePool, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            pool,
            interval,
            shutdown,
        }
    }

    /// 主循环: 启动时先核对一次, 之后按固定间隔重复
    pub async fn run(self) {
        tracing::info!(
            "Availability reconcile scheduler started (every {}s)",
            self.interval.as_secs()
        );

        self.reconcile_once().await;

        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {
                    self.reconcile_once().await;
                }
                _ = self.shutdown.cancelled() => {
                    tracing::info!("Availability reconcile scheduler received shutdown signal");
                    return;
                }
            }
        }
    }

    async fn reconcile_once(&self) {
        match reconcile(&self.pool).await {
            Ok(report) if report.is_noop() => {
                tracing::debug!("Availability already consistent");
            }
            Ok(report) => {
                tracing::info!(
                    items_disabled = report.items_disabled,
                    items_enabled = report.items_enabled,
                    modifiers_disabled = report.modifiers_disabled,
                    modifiers_enabled = report.modifiers_enabled,
                    "Scheduled availability reconcile applied changes"
                );
            }
            Err(e) => {
                tracing::error!("Scheduled availability reconcile failed: {e}");
            }
        }
    }
}
