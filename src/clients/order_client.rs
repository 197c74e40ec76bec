use tracing::{debug, error, info, instrument, warn};

use super::{ProductClient, StockReservation, UserClient};
use crate::actor_framework::{Filter, ResourceClient};
use crate::domain::{
    positive_quantity, Order, OrderCreate, OrderId, OrderTransition, ProductId, UserId,
};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use crate::product_actor::ProductError;

/// Client for interacting with the Order actor.
///
/// Every item change touches two actors: stock is reserved in the catalog
/// first, then the order is mutated, and the reservation is committed or
/// rolled back depending on the outcome. Stock going back to the catalog is
/// returned only after the order change has been accepted.
#[derive(Clone, Debug)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    user_client: UserClient,
    product_client: ProductClient,
    conflict_retries: u32,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        user_client: UserClient,
        product_client: ProductClient,
        conflict_retries: u32,
    ) -> Self {
        Self {
            inner,
            user_client,
            product_client,
            conflict_retries,
        }
    }

    /// Opens an empty Draft order for an existing user.
    #[instrument(skip(self))]
    pub async fn create_order(&self, user_id: UserId) -> Result<Order, OrderError> {
        info!("Processing create_order request (Client Side)");

        match self.user_client.get_user(user_id.clone()).await {
            Ok(Some(user)) => debug!(username = %user.username, "User validation successful"),
            Ok(None) => {
                error!("User not found");
                return Err(OrderError::InvalidUser(user_id));
            }
            Err(e) => {
                error!(error = %e, "User validation failed");
                return Err(OrderError::InvalidUser(format!("User validation failed: {e}")));
            }
        }

        let order = self.inner.create(OrderCreate { user_id }).await?;
        info!(order_id = %order.id, "Order created");
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let mut orders = self
            .inner
            .list(Filter::new(move |order: &Order| order.user_id == user_id))
            .await?;
        orders.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(orders)
    }

    /// Adds `quantity` units of a product, taking them out of stock.
    #[instrument(skip(self))]
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, OrderError> {
        let quantity = positive_quantity(quantity)?;
        self.editable_order(&order_id).await?;

        let reservation =
            StockReservation::reserve(&self.product_client, product_id.clone(), quantity).await?;
        let action = OrderAction::AddItem {
            product_id,
            quantity,
            unit_price: reservation.unit_price(),
        };

        match self.inner.perform_action(order_id, action).await {
            Ok(result) => {
                reservation.commit();
                let order = result.into_order();
                info!(total = %order.total_price(), "Item added");
                Ok(order)
            }
            Err(e) => {
                warn!(error = %e, "Order rejected item, returning stock");
                reservation.rollback().await;
                Err(e)
            }
        }
    }

    /// Sets a line to `quantity` units, moving the difference to or from stock.
    ///
    /// The line's current quantity travels with the request; if the line
    /// changed in between, the attempt is undone and retried.
    #[instrument(skip(self))]
    pub async fn change_item_quantity(
        &self,
        order_id: OrderId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<Order, OrderError> {
        let quantity = positive_quantity(quantity)?;
        let mut attempt = 0;

        loop {
            let order = self.editable_order(&order_id).await?;
            let current = order
                .item(&product_id)
                .map(|item| item.quantity())
                .ok_or_else(|| OrderError::ItemNotFound {
                    order_id: order_id.clone(),
                    product_id: product_id.clone(),
                })?;

            let result = self
                .apply_quantity_change(&order_id, &product_id, current, quantity)
                .await;

            match result {
                Err(OrderError::Conflict { .. }) if attempt < self.conflict_retries => {
                    attempt += 1;
                    warn!(attempt, "Line changed concurrently, retrying");
                }
                other => return other,
            }
        }
    }

    async fn apply_quantity_change(
        &self,
        order_id: &OrderId,
        product_id: &ProductId,
        current: u32,
        quantity: u32,
    ) -> Result<Order, OrderError> {
        let action = OrderAction::SetItemQuantity {
            product_id: product_id.clone(),
            quantity,
            expected: current,
        };

        if quantity > current {
            let reservation = StockReservation::reserve(
                &self.product_client,
                product_id.clone(),
                quantity - current,
            )
            .await?;

            return match self.inner.perform_action(order_id.clone(), action).await {
                Ok(result) => {
                    reservation.commit();
                    Ok(result.into_order())
                }
                Err(e) => {
                    reservation.rollback().await;
                    Err(e)
                }
            };
        }

        let order = self
            .inner
            .perform_action(order_id.clone(), action)
            .await?
            .into_order();

        if current > quantity {
            if let Err(e) = self.restock(product_id, current - quantity).await {
                error!(error = %e, "Restock failed, restoring line quantity");
                let undo = OrderAction::SetItemQuantity {
                    product_id: product_id.clone(),
                    quantity: current,
                    expected: quantity,
                };
                self.undo(order_id, undo).await;
                return Err(e.into());
            }
        }
        Ok(order)
    }

    /// Drops a line and returns its quantity to stock.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        order_id: OrderId,
        product_id: ProductId,
    ) -> Result<Order, OrderError> {
        let result = self
            .inner
            .perform_action(order_id.clone(), OrderAction::RemoveItem { product_id })
            .await?;

        let (order, removed) = match result {
            OrderActionResult::ItemRemoved { order, removed } => (order, removed),
            other => {
                return Err(OrderError::ActorCommunicationError(format!(
                    "Unexpected result: {other:?}"
                )))
            }
        };

        if let Err(e) = self.restock(removed.product_id(), removed.quantity()).await {
            error!(error = %e, "Restock failed, restoring removed line");
            let undo = OrderAction::AddItem {
                product_id: removed.product_id().clone(),
                quantity: removed.quantity(),
                unit_price: removed.unit_price(),
            };
            self.undo(&order_id, undo).await;
            return Err(e.into());
        }

        info!(total = %order.total_price(), "Item removed");
        Ok(order)
    }

    /// Returns stock to the catalog. A product deleted in the meantime has
    /// nowhere to return stock to, which is not an error.
    async fn restock(&self, product_id: &ProductId, quantity: u32) -> Result<(), ProductError> {
        match self
            .product_client
            .release_stock(product_id.clone(), quantity)
            .await
        {
            Ok(_) => Ok(()),
            Err(ProductError::NotFound(_)) => {
                warn!(%product_id, quantity, "Product no longer exists, stock not returned");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn undo(&self, order_id: &OrderId, action: OrderAction) {
        if let Err(e) = self.inner.perform_action(order_id.clone(), action).await {
            error!(%order_id, error = %e, "Failed to undo order change");
        }
    }

    /// Fetches the order and fails early unless it can still be edited.
    async fn editable_order(&self, order_id: &OrderId) -> Result<Order, OrderError> {
        let order = self
            .inner
            .get(order_id.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(order_id.clone()))?;

        let status = order.status();
        if !status.is_editable() {
            return Err(OrderError::NotEditable {
                order_id: order.id,
                status,
            });
        }
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn place(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderTransition::Place).await
    }

    /// Payment itself happens elsewhere; this only records it.
    #[instrument(skip(self))]
    pub async fn pay(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderTransition::Pay).await
    }

    #[instrument(skip(self))]
    pub async fn confirm_pickup(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderTransition::ConfirmPickup).await
    }

    #[instrument(skip(self))]
    pub async fn confirm_delivery(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderTransition::ConfirmDelivery).await
    }

    #[instrument(skip(self))]
    pub async fn complete(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderTransition::Complete).await
    }

    /// Cancels from any state except Completed. Stock is not returned.
    #[instrument(skip(self))]
    pub async fn cancel(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderTransition::Cancel).await
    }

    async fn transition(
        &self,
        order_id: OrderId,
        transition: OrderTransition,
    ) -> Result<Order, OrderError> {
        debug!(?transition, "Sending request");
        let result = self
            .inner
            .perform_action(order_id, OrderAction::Transition(transition))
            .await;
        result.map(OrderActionResult::into_order)
    }
}
