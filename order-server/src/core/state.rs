//! Server State
//!
//! 服务器全局状态, 在所有 handler 和后台任务之间共享。

use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use crate::availability::ReconcileScheduler;
use crate::cashier::CashierService;
use crate::core::Config;
use crate::db::DbService;
use crate::orders::{OrderService, TableLocks};
use crate::services::NotifyService;
use crate::sessions::SessionService;

/// 服务器全局状态
///
/// Clone 成本低: 内部全是句柄 (连接池 / channel / Arc)。
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub notify: NotifyService,
    pub orders: OrderService,
    pub sessions: SessionService,
    pub cashier: CashierService,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// # Panics
    ///
    /// 工作目录或数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        // 0. Ensure work_dir structure exists
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        // 1. Initialize DB (WAL mode + migrations)
        let db_path = config.database_path();
        let db = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        Self::with_pool(config, db.pool)
    }

    /// 基于现成连接池组装状态 (测试和嵌入场景)
    pub fn with_pool(config: &Config, pool: SqlitePool) -> Self {
        let tz = config.business_tz();
        let notify = NotifyService::new();
        let locks = TableLocks::new();

        Self {
            config: config.clone(),
            orders: OrderService::new(pool.clone(), locks.clone(), notify.clone(), tz),
            sessions: SessionService::new(pool.clone()),
            cashier: CashierService::new(pool.clone(), locks, notify.clone(), tz),
            notify,
            pool,
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 开始监听前调用。
    ///
    /// 启动的任务：
    /// - 可售性定期核对 (ReconcileScheduler)
    pub fn start_background_tasks(&self, shutdown: CancellationToken) {
        let scheduler = ReconcileScheduler::new(
            self.pool.clone(),
            Duration::from_secs(self.config.reconcile_interval_secs),
            shutdown,
        );
        tokio::spawn(scheduler.run());
    }
}
