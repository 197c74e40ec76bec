use super::actions::{ProductAction, ProductActionResult};
use super::error::ProductError;
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductId, ProductPatch};

impl Entity for Product {
    const KIND: &'static str = "product";

    type Id = ProductId;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn from_create(id: ProductId, payload: ProductCreate) -> Result<Self, ProductError> {
        Product::new(id, payload)
    }

    /// Updates any subset of fields; invalid price or stock rejects the whole patch.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        self.apply(patch)
    }

    /// SKUs are unique across the catalog.
    fn check_unique<'a, I>(&self, mut others: I) -> Result<(), ProductError>
    where
        Self: 'a,
        I: Iterator<Item = &'a Self> + Clone,
    {
        if others.any(|other| other.sku == self.sku) {
            return Err(ProductError::DuplicateSku(self.sku.clone()));
        }
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `CheckStock`: Returns the current stock level
    /// - `ReserveStock(amount)`: Decrements stock, reporting the current price
    /// - `ReleaseStock(amount)`: Increments stock
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::StockLevel(self.stock_quantity)),
            ProductAction::ReserveStock(amount) => {
                let remaining = self.reserve(amount)?;
                Ok(ProductActionResult::Reserved {
                    unit_price: self.price,
                    remaining,
                })
            }
            ProductAction::ReleaseStock(amount) => {
                Ok(ProductActionResult::Released(self.release(amount)?))
            }
        }
    }
}
