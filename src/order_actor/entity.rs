use tracing::info;

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderId};

impl Entity for Order {
    const KIND: &'static str = "order";

    type Id = OrderId;
    type CreatePayload = OrderCreate;
    type Patch = (); // All changes go through actions
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a new, empty Draft order for the given user.
    fn from_create(id: OrderId, payload: OrderCreate) -> Result<Self, OrderError> {
        Ok(Order::new(id, payload.user_id))
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::AddItem {
                product_id,
                quantity,
                unit_price,
            } => {
                self.add_item(product_id, quantity, unit_price)?;
                Ok(OrderActionResult::ItemAdded(self.clone()))
            }
            OrderAction::SetItemQuantity {
                product_id,
                quantity,
                expected,
            } => {
                let previous = self.set_item_quantity(&product_id, quantity, expected)?;
                Ok(OrderActionResult::ItemQuantityChanged {
                    order: self.clone(),
                    previous,
                })
            }
            OrderAction::RemoveItem { product_id } => {
                let removed = self.remove_item(&product_id)?;
                Ok(OrderActionResult::ItemRemoved {
                    order: self.clone(),
                    removed,
                })
            }
            OrderAction::Transition(transition) => {
                let from = self.status();
                let to = self.apply(transition)?;
                info!(order_id = %self.id, ?from, ?to, "Order status changed");
                Ok(OrderActionResult::Transitioned(self.clone()))
            }
        }
    }
}
