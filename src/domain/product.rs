use rust_decimal::Decimal;

use crate::product_actor::ProductError;

pub type ProductId = String;

/// Represents a product in the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: u32,
}

/// Payload for creating a new product.
///
/// Stock is taken as a signed number so that negative input can be rejected
/// instead of silently wrapping.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub sku: String,
    pub price: Decimal,
    pub stock_quantity: i64,
}

/// Payload for updating an existing product. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i64>,
}

pub fn validate_price(price: Decimal) -> Result<Decimal, ProductError> {
    if price < Decimal::ZERO {
        return Err(ProductError::NegativePrice(price));
    }
    Ok(price)
}

pub fn validate_stock(stock: i64) -> Result<u32, ProductError> {
    if stock < 0 {
        return Err(ProductError::NegativeStock(stock));
    }
    u32::try_from(stock).map_err(|_| ProductError::StockOverflow)
}

impl ProductCreate {
    pub fn new(
        name: impl Into<String>,
        sku: impl Into<String>,
        price: Decimal,
        stock_quantity: i64,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            sku: sku.into(),
            price,
            stock_quantity,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), ProductError> {
        validate_price(self.price)?;
        validate_stock(self.stock_quantity)?;
        Ok(())
    }
}

impl ProductPatch {
    pub fn validate(&self) -> Result<(), ProductError> {
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(stock) = self.stock_quantity {
            validate_stock(stock)?;
        }
        Ok(())
    }
}

impl Product {
    pub fn new(id: impl Into<ProductId>, payload: ProductCreate) -> Result<Self, ProductError> {
        Ok(Self {
            id: id.into(),
            price: validate_price(payload.price)?,
            stock_quantity: validate_stock(payload.stock_quantity)?,
            name: payload.name,
            description: payload.description,
            sku: payload.sku,
        })
    }

    /// Applies a patch. Nothing is changed unless every supplied field is valid.
    pub fn apply(&mut self, patch: ProductPatch) -> Result<(), ProductError> {
        let price = patch.price.map(validate_price).transpose()?;
        let stock = patch.stock_quantity.map(validate_stock).transpose()?;

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(sku) = patch.sku {
            self.sku = sku;
        }
        if let Some(price) = price {
            self.price = price;
        }
        if let Some(stock) = stock {
            self.stock_quantity = stock;
        }
        Ok(())
    }

    /// Takes `quantity` units out of stock, returning what is left.
    pub fn reserve(&mut self, quantity: u32) -> Result<u32, ProductError> {
        if quantity == 0 {
            return Err(ProductError::InvalidQuantity(0));
        }
        if quantity > self.stock_quantity {
            return Err(ProductError::InsufficientStock {
                product_id: self.id.clone(),
                requested: quantity,
                available: self.stock_quantity,
            });
        }
        self.stock_quantity -= quantity;
        Ok(self.stock_quantity)
    }

    /// Puts `quantity` units back into stock, returning the new level.
    pub fn release(&mut self, quantity: u32) -> Result<u32, ProductError> {
        if quantity == 0 {
            return Err(ProductError::InvalidQuantity(0));
        }
        self.stock_quantity = self
            .stock_quantity
            .checked_add(quantity)
            .ok_or(ProductError::StockOverflow)?;
        Ok(self.stock_quantity)
    }
}
