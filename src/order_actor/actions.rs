use rust_decimal::Decimal;

use crate::domain::{Order, OrderItem, OrderTransition, ProductId};

/// Mutations of a single order, applied atomically by the order actor.
///
/// Stock is never touched here; callers reserve or release it around these.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Appends a line or merges into the existing line for the product.
    AddItem {
        product_id: ProductId,
        quantity: u32,
        unit_price: Decimal,
    },
    /// Sets a line's quantity if it still equals `expected`.
    SetItemQuantity {
        product_id: ProductId,
        quantity: u32,
        expected: u32,
    },
    RemoveItem { product_id: ProductId },
    Transition(OrderTransition),
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone, PartialEq)]
pub enum OrderActionResult {
    ItemAdded(Order),
    ItemQuantityChanged { order: Order, previous: u32 },
    ItemRemoved { order: Order, removed: OrderItem },
    Transitioned(Order),
}

impl OrderActionResult {
    pub fn into_order(self) -> Order {
        match self {
            OrderActionResult::ItemAdded(order)
            | OrderActionResult::ItemQuantityChanged { order, .. }
            | OrderActionResult::ItemRemoved { order, .. }
            | OrderActionResult::Transitioned(order) => order,
        }
    }
}
