//! Order status state machine
//!
//! 订单状态流转规则:
//!
//! ```text
//! PENDING -> PREPARING -> READY -> SERVED
//!    |           |          |
//!    +-----------+----------+--> CANCELLED
//! ```
//!
//! Forward moves advance one step at a time. Re-applying the current
//! status is a no-op so kitchen displays can safely retry. SERVED and
//! CANCELLED are terminal.

use shared::models::OrderStatus;

use super::error::{OrderError, OrderResult};

/// Outcome of a transition check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The move is legal and should be written
    Apply,
    /// Target equals the current status, nothing to write
    Noop,
}

/// Validate a status move without touching the database
pub fn check_transition(from: OrderStatus, to: OrderStatus) -> OrderResult<Transition> {
    use OrderStatus::*;

    if from == to {
        return Ok(Transition::Noop);
    }

    let allowed = matches!((from, to), (Pending, Preparing) | (Preparing, Ready) | (Ready, Served))
        || (to == Cancelled && !from.is_terminal());

    if allowed {
        Ok(Transition::Apply)
    } else {
        Err(OrderError::InvalidTransition { from, to })
    }
}

// ========== 单元测试 ==========
