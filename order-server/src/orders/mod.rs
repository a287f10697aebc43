//! Order lifecycle
//!
//! 从下单到出餐的订单状态管理。结账由 [`crate::cashier`] 负责。

pub mod error;
pub mod locks;
pub mod service;
pub mod status;

pub use error::{OrderError, OrderResult};
pub use locks::TableLocks;
pub use service::OrderService;
pub use status::{check_transition, Transition};

#[cfg(test)]
mod tests;
