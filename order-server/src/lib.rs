//! Order Server - 餐厅订单与桌台会话结算服务
//!
//! # 架构概述
//!
//! 本模块是订单服务端的主入口，提供以下核心功能：
//!
//! - **计价** (`pricing`): 行级快照计价与刷卡附加费
//! - **可售性** (`availability`): 食材库存到菜品/做法可售状态的级联推导
//! - **订单** (`orders`): 下单、状态机流转、桌台占用维护
//! - **并桌** (`sessions`): 并桌会话、加入码、桌号归属
//! - **收银** (`cashier`): 单笔/整桌结账、当日历史
//! - **通知** (`services`): 资源变更广播 (厨显、收银端、点餐前端)
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! order-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池与仓储层
//! ├── pricing/       # 计价器
//! ├── availability/  # 可售性推导与定期核对
//! ├── orders/        # 订单生命周期
//! ├── sessions/      # 并桌会话
//! ├── cashier/       # 收银结账
//! ├── services/      # 通知网关
//! └── utils/         # 错误、日志、时间、校验
//! ```

pub mod api;
pub mod availability;
pub mod cashier;
pub mod core;
pub mod db;
pub mod orders;
pub mod pricing;
pub mod services;
pub mod sessions;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerState};
pub use orders::{OrderError, OrderService, TableLocks};
pub use services::NotifyService;
pub use sessions::{SessionError, SessionService};
pub use utils::{AppError, AppResponse, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境 (dotenv, 工作目录, 日志)
///
/// 必须先于 [`Config::from_env`] 调用, dotenv 要先写入环境变量。
pub fn setup_environment() -> std::io::Result<()> {
    // .env 不存在时静默跳过
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    // 生产环境日志落盘, 其余环境只打到终端
    if config.is_production() {
        let log_dir = config.log_dir();
        init_logger_with_file(config.log_level.as_deref(), log_dir.to_str());
    } else {
        init_logger_with_file(config.log_level.as_deref(), None);
    }

    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
   ____          __
  / __ \_________/ /__  _____
 / / / / ___/ __  / _ \/ ___/
/ /_/ / /  / /_/ /  __/ /
\____/_/   \__,_/\___/_/
   _____
  / ___/___  ______   _____  _____
  \__ \/ _ \/ ___/ | / / _ \/ ___/
 ___/ /  __/ /   | |/ /  __/ /
/____/\___/_/    |___/\___/_/
    "#
    );
}
