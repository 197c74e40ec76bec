use rust_decimal::Decimal;
use tracing::{debug, error, instrument};

use super::ProductClient;
use crate::domain::ProductId;
use crate::product_actor::ProductError;

/// Stock already taken from a product on behalf of a pending order change.
///
/// Exactly one of [`commit`](Self::commit) or [`rollback`](Self::rollback)
/// must follow once the order side of the change has succeeded or failed.
#[must_use = "a stock reservation must be committed or rolled back"]
#[derive(Debug)]
pub struct StockReservation<'a> {
    products: &'a ProductClient,
    product_id: ProductId,
    quantity: u32,
    unit_price: Decimal,
}

impl<'a> StockReservation<'a> {
    #[instrument(skip(products))]
    pub async fn reserve(
        products: &'a ProductClient,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<StockReservation<'a>, ProductError> {
        let unit_price = products.reserve_stock(product_id.clone(), quantity).await?;
        Ok(Self {
            products,
            product_id,
            quantity,
            unit_price,
        })
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn commit(self) {
        debug!(product_id = %self.product_id, quantity = self.quantity, "Stock reservation committed");
    }

    /// Puts the stock back. A failure here cannot be recovered and is logged.
    pub async fn rollback(self) {
        match self
            .products
            .release_stock(self.product_id.clone(), self.quantity)
            .await
        {
            Ok(level) => debug!(
                product_id = %self.product_id,
                quantity = self.quantity,
                level,
                "Stock reservation rolled back"
            ),
            Err(e) => error!(
                product_id = %self.product_id,
                quantity = self.quantity,
                error = %e,
                "Failed to roll back stock reservation"
            ),
        }
    }
}
