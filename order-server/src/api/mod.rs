//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`menu`] - 菜单查询接口
//! - [`ingredients`] - 食材库存接口
//! - [`tables`] - 桌台查询接口
//! - [`orders`] - 订单接口
//! - [`sessions`] - 并桌会话接口
//! - [`cashier`] - 收银结账接口

pub mod health;

pub mod cashier;
pub mod ingredients;
pub mod menu;
pub mod orders;
pub mod sessions;
pub mod tables;

// Re-export common types for handlers
pub use crate::utils::{AppResponse, AppResult};

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        .merge(health::router())
        .merge(menu::router())
        .merge(ingredients::router())
        .merge(tables::router())
        .merge(orders::router())
        .merge(sessions::router())
        .merge(cashier::router())
}

/// Build the application with middleware attached
pub fn build_app() -> Router<ServerState> {
    build_router()
        // CORS - 厨显 / 收银端 / 点餐前端跨域访问
        .layer(CorsLayer::permissive())
        // Trace - 请求日志 (INFO)
        .layer(TraceLayer::new_for_http())
}
