use rust_decimal::Decimal;

/// Custom actions for Product entities.
///
/// These actions represent domain-specific operations that can be performed
/// on a product beyond standard CRUD operations.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Takes the given quantity out of stock.
    ///
    /// # Errors
    /// Fails with `InsufficientStock` if the request exceeds available stock,
    /// leaving the stock untouched.
    ReserveStock(u32),
    /// Returns the given quantity to stock.
    ReleaseStock(u32),
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    /// Current stock level
    StockLevel(u32),
    /// Stock was taken; carries the price at the moment of reservation
    Reserved { unit_price: Decimal, remaining: u32 },
    /// Stock was returned; carries the new level
    Released(u32),
}
