//! Cashier API 模块

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/cashier", routes())
        // 结账动作挂在资源自己的路径下
        .route("/api/table/{id}/pay", post(handler::pay_table))
        .route("/api/order/{id}/pay", post(handler::pay_order))
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/unsettled", get(handler::unsettled))
        .route("/history/daily", get(handler::daily_history))
}
