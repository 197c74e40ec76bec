use rust_decimal::Decimal;
use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::{OrderStatus, OrderTransition};
use crate::product_actor::ProductError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Invalid user: {0}")]
    InvalidUser(String),
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),
    #[error("Invalid unit price: {0}")]
    InvalidPrice(Decimal),
    #[error("Order {order_id} has no line for product {product_id}")]
    ItemNotFound { order_id: String, product_id: String },
    #[error("Order {order_id} is {status:?} and can no longer be edited")]
    NotEditable { order_id: String, status: OrderStatus },
    #[error("Cannot {transition:?} order {order_id} while {from:?}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        transition: OrderTransition,
    },
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: String,
        requested: u32,
        available: u32,
    },
    #[error("Line for {product_id} in order {order_id} changed concurrently")]
    Conflict { order_id: String, product_id: String },
    #[error("Inventory error: {0}")]
    Inventory(ProductError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// Collapses the ways a request can fail to apply to an order (missing
    /// order, line or product, bad quantity, wrong status) into one signal.
    /// Stock shortages, conflicts and transport failures are not included.
    pub fn is_not_applicable(&self) -> bool {
        matches!(
            self,
            OrderError::NotFound(_)
                | OrderError::InvalidProduct(_)
                | OrderError::InvalidQuantity(_)
                | OrderError::ItemNotFound { .. }
                | OrderError::NotEditable { .. }
                | OrderError::InvalidTransition { .. }
        )
    }
}

impl From<FrameworkError> for OrderError {
    fn from(error: FrameworkError) -> Self {
        match error {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<ProductError> for OrderError {
    fn from(error: ProductError) -> Self {
        match error {
            ProductError::NotFound(id) => OrderError::InvalidProduct(id),
            ProductError::InsufficientStock {
                product_id,
                requested,
                available,
            } => OrderError::InsufficientStock {
                product_id,
                requested,
                available,
            },
            ProductError::InvalidQuantity(quantity) => OrderError::InvalidQuantity(quantity),
            ProductError::ActorCommunicationError(message) => {
                OrderError::ActorCommunicationError(message)
            }
            other => OrderError::Inventory(other),
        }
    }
}
