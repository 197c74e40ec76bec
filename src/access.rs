//! Role requirements for every operation the system exposes.

use thiserror::Error;

use crate::domain::{OrderTransition, Role};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Register,
    Login,
    ViewCatalog,
    ManageCatalog,
    CreateOrder,
    EditOrderItems,
    PlaceOrder,
    ViewAnyOrder,
    PayOrder,
    ConfirmPickup,
    ConfirmDelivery,
    CompleteOrder,
    CancelOrder,
    ViewUser,
    ChangeRole,
}

impl Operation {
    /// Minimum role, or `None` when anonymous callers are allowed.
    pub fn required_role(self) -> Option<Role> {
        match self {
            Operation::Register | Operation::Login | Operation::ViewCatalog => None,
            Operation::CreateOrder | Operation::EditOrderItems | Operation::PlaceOrder => {
                Some(Role::Customer)
            }
            Operation::ManageCatalog
            | Operation::ViewAnyOrder
            | Operation::PayOrder
            | Operation::ConfirmPickup
            | Operation::ConfirmDelivery
            | Operation::CompleteOrder
            | Operation::CancelOrder => Some(Role::Manager),
            Operation::ViewUser | Operation::ChangeRole => Some(Role::Admin),
        }
    }
}

impl From<OrderTransition> for Operation {
    fn from(transition: OrderTransition) -> Self {
        match transition {
            OrderTransition::Place => Operation::PlaceOrder,
            OrderTransition::Pay => Operation::PayOrder,
            OrderTransition::ConfirmPickup => Operation::ConfirmPickup,
            OrderTransition::ConfirmDelivery => Operation::ConfirmDelivery,
            OrderTransition::Complete => Operation::CompleteOrder,
            OrderTransition::Cancel => Operation::CancelOrder,
        }
    }
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("{operation:?} requires role {required}")]
pub struct AccessDenied {
    pub operation: Operation,
    pub required: Role,
}

/// `caller` is `None` for an unauthenticated request.
pub fn authorize(caller: Option<Role>, operation: Operation) -> Result<(), AccessDenied> {
    match operation.required_role() {
        None => Ok(()),
        Some(required) if caller.is_some_and(|role| role.satisfies(required)) => Ok(()),
        Some(required) => Err(AccessDenied {
            operation,
            required,
        }),
    }
}
