//! Order and settlement errors

use shared::models::OrderStatus;
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Table not found: {0}")]
    TableNotFound(i64),

    #[error("Invalid transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: OrderStatus,
        to: OrderStatus,
    },

    /// Mutation attempted on a settled order
    #[error("Order {0} is already paid")]
    AlreadyPaid(i64),

    /// Settlement attempted twice
    #[error("Order {0} is already settled")]
    AlreadySettled(i64),

    #[error("Order {0} is cancelled")]
    Cancelled(i64),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No unsettled orders for table {0}")]
    NothingToSettle(i64),

    #[error("Storage error: {0}")]
    Repo(#[from] RepoError),
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Repo(RepoError::from(err))
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => AppError::not_found(format!("Order {id}")),
            OrderError::TableNotFound(id) => AppError::not_found(format!("Table {id}")),
            OrderError::InvalidTransition { from, to } => AppError::business_rule(format!(
                "Cannot transition order from {from:?} to {to:?}"
            )),
            OrderError::AlreadyPaid(id) => {
                AppError::business_rule(format!("Order {id} is already paid"))
            }
            OrderError::AlreadySettled(id) => {
                AppError::conflict(format!("Order {id} is already settled"))
            }
            OrderError::Cancelled(id) => {
                AppError::business_rule(format!("Order {id} is cancelled"))
            }
            OrderError::Validation(msg) => AppError::Validation(msg),
            OrderError::NothingToSettle(id) => {
                AppError::not_found(format!("No unsettled orders for table {id}"))
            }
            OrderError::Repo(e) => e.into(),
        }
    }
}

pub type OrderResult<T> = Result<T, OrderError>;
