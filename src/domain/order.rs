use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::{ProductId, UserId};
use crate::order_actor::OrderError;

pub type OrderId = String;

/// Lifecycle of an order. Only a `Draft` order accepts item changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Draft,
    Placed,
    Paid,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_editable(self) -> bool {
        self == OrderStatus::Draft
    }
}

/// Status-changing operations on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderTransition {
    Place,
    Pay,
    ConfirmPickup,
    ConfirmDelivery,
    Complete,
    Cancel,
}

impl OrderTransition {
    pub const ALL: [OrderTransition; 6] = [
        OrderTransition::Place,
        OrderTransition::Pay,
        OrderTransition::ConfirmPickup,
        OrderTransition::ConfirmDelivery,
        OrderTransition::Complete,
        OrderTransition::Cancel,
    ];

    /// Status reached by applying this transition to `from`, if it is allowed at all.
    pub fn target(self, from: OrderStatus) -> Option<OrderStatus> {
        use OrderStatus::*;

        match (self, from) {
            (OrderTransition::Place, Draft) => Some(Placed),
            (OrderTransition::Pay, Placed) => Some(Paid),
            (OrderTransition::ConfirmPickup, Paid) => Some(Shipped),
            (OrderTransition::ConfirmDelivery, Shipped) => Some(Delivered),
            (OrderTransition::Complete, Delivered) => Some(Completed),
            (OrderTransition::Cancel, current) if current != Completed => Some(Cancelled),
            _ => None,
        }
    }
}

/// Converts caller input into a line quantity, which is always at least one.
pub fn positive_quantity(quantity: i64) -> Result<u32, OrderError> {
    if quantity <= 0 {
        return Err(OrderError::InvalidQuantity(quantity));
    }
    u32::try_from(quantity).map_err(|_| OrderError::InvalidQuantity(quantity))
}

/// One product line of an order. The unit price is a snapshot taken when
/// the line was first added.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderItem {
    product_id: ProductId,
    quantity: u32,
    unit_price: Decimal,
}

impl OrderItem {
    pub fn new(
        product_id: impl Into<ProductId>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(0));
        }
        if unit_price < Decimal::ZERO {
            return Err(OrderError::InvalidPrice(unit_price));
        }
        Ok(Self {
            product_id: product_id.into(),
            quantity,
            unit_price,
        })
    }

    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    status: OrderStatus,
    items: Vec<OrderItem>,
}

/// Payload for creating a new order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: UserId,
}

impl Order {
    /// A fresh order is an empty `Draft`.
    pub fn new(id: impl Into<OrderId>, user_id: impl Into<UserId>) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            created_at: Utc::now(),
            status: OrderStatus::Draft,
            items: Vec::new(),
        }
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn item(&self, product_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    /// Sum of quantity times unit price over every line.
    pub fn total_price(&self) -> Decimal {
        self.items.iter().map(OrderItem::line_total).sum()
    }

    fn ensure_editable(&self) -> Result<(), OrderError> {
        if self.status.is_editable() {
            Ok(())
        } else {
            Err(OrderError::NotEditable {
                order_id: self.id.clone(),
                status: self.status,
            })
        }
    }

    fn position(&self, product_id: &str) -> Result<usize, OrderError> {
        self.items
            .iter()
            .position(|item| item.product_id == product_id)
            .ok_or_else(|| OrderError::ItemNotFound {
                order_id: self.id.clone(),
                product_id: product_id.to_string(),
            })
    }

    /// Adds a line, or merges into the existing line for the same product.
    /// A merged line keeps its original unit price.
    pub fn add_item(
        &mut self,
        product_id: impl Into<ProductId>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Result<&OrderItem, OrderError> {
        self.ensure_editable()?;
        let item = OrderItem::new(product_id, quantity, unit_price)?;

        let existing = self
            .items
            .iter()
            .position(|line| line.product_id == item.product_id);
        let index = match existing {
            Some(index) => {
                let line = &mut self.items[index];
                line.quantity = line
                    .quantity
                    .checked_add(quantity)
                    .ok_or(OrderError::InvalidQuantity(i64::from(quantity)))?;
                index
            }
            None => {
                self.items.push(item);
                self.items.len() - 1
            }
        };
        Ok(&self.items[index])
    }

    /// Sets a line's quantity, provided it still holds `expected` units.
    /// Returns the previous quantity.
    pub fn set_item_quantity(
        &mut self,
        product_id: &str,
        quantity: u32,
        expected: u32,
    ) -> Result<u32, OrderError> {
        self.ensure_editable()?;
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(0));
        }
        let index = self.position(product_id)?;

        let line = &mut self.items[index];
        if line.quantity != expected {
            return Err(OrderError::Conflict {
                order_id: self.id.clone(),
                product_id: product_id.to_string(),
            });
        }
        let previous = line.quantity;
        line.quantity = quantity;
        Ok(previous)
    }

    pub fn remove_item(&mut self, product_id: &str) -> Result<OrderItem, OrderError> {
        self.ensure_editable()?;
        let index = self.position(product_id)?;
        Ok(self.items.remove(index))
    }

    pub fn apply(&mut self, transition: OrderTransition) -> Result<OrderStatus, OrderError> {
        let next = transition
            .target(self.status)
            .ok_or_else(|| OrderError::InvalidTransition {
                order_id: self.id.clone(),
                from: self.status,
                transition,
            })?;
        self.status = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [OrderStatus; 7] = [
        OrderStatus::Draft,
        OrderStatus::Placed,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    fn price(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    fn order_in(status: OrderStatus) -> Order {
        let mut order = Order::new("order_1", "user_1");
        order.status = status;
        order
    }

    #[test]
    fn new_order_is_an_empty_draft() {
        let order = Order::new("order_1", "user_1");
        assert_eq!(order.status(), OrderStatus::Draft);
        assert!(order.items().is_empty());
        assert_eq!(order.total_price(), Decimal::ZERO);
    }

    #[test]
    fn transitions_follow_the_table() {
        let allowed = [
            (OrderTransition::Place, OrderStatus::Draft, OrderStatus::Placed),
            (OrderTransition::Pay, OrderStatus::Placed, OrderStatus::Paid),
            (OrderTransition::ConfirmPickup, OrderStatus::Paid, OrderStatus::Shipped),
            (OrderTransition::ConfirmDelivery, OrderStatus::Shipped, OrderStatus::Delivered),
            (OrderTransition::Complete, OrderStatus::Delivered, OrderStatus::Completed),
        ];

        for transition in OrderTransition::ALL {
            for from in ALL_STATUSES {
                let expected = if transition == OrderTransition::Cancel {
                    (from != OrderStatus::Completed).then_some(OrderStatus::Cancelled)
                } else {
                    allowed
                        .iter()
                        .find(|(t, f, _)| *t == transition && *f == from)
                        .map(|(_, _, to)| *to)
                };
                assert_eq!(transition.target(from), expected, "{transition:?} from {from:?}");
            }
        }
    }

    #[test]
    fn rejected_transition_leaves_status_unchanged() {
        let mut order = Order::new("order_1", "user_1");
        let result = order.apply(OrderTransition::Pay);

        assert_eq!(
            result,
            Err(OrderError::InvalidTransition {
                order_id: "order_1".to_string(),
                from: OrderStatus::Draft,
                transition: OrderTransition::Pay,
            })
        );
        assert_eq!(order.status(), OrderStatus::Draft);
    }

    #[test]
    fn cancel_is_repeatable_until_completed() {
        let mut cancelled = order_in(OrderStatus::Cancelled);
        assert_eq!(cancelled.apply(OrderTransition::Cancel), Ok(OrderStatus::Cancelled));
        assert_eq!(cancelled.status(), OrderStatus::Cancelled);

        let mut completed = order_in(OrderStatus::Completed);
        assert!(completed.apply(OrderTransition::Cancel).is_err());
        assert_eq!(completed.status(), OrderStatus::Completed);
    }

    #[test]
    fn merging_keeps_first_price_snapshot() {
        let mut order = Order::new("order_1", "user_1");
        order.add_item("product_1", 2, price(1000)).unwrap();
        let merged = order.add_item("product_1", 3, price(1500)).unwrap();

        assert_eq!(merged.quantity(), 5);
        assert_eq!(merged.unit_price(), price(1000));
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total_price(), price(5000));
    }

    #[test]
    fn total_is_sum_of_lines() {
        let mut order = Order::new("order_1", "user_1");
        order.add_item("product_1", 2, price(250)).unwrap();
        order.add_item("product_2", 1, price(1999)).unwrap();
        order.add_item("product_3", 4, price(5)).unwrap();

        assert_eq!(order.total_price(), price(500 + 1999 + 20));
    }

    #[test]
    fn item_changes_require_draft() {
        for status in ALL_STATUSES.into_iter().filter(|s| *s != OrderStatus::Draft) {
            let mut order = order_in(status);
            order.items.push(OrderItem::new("product_1", 1, price(100)).unwrap());

            assert!(matches!(
                order.add_item("product_2", 1, price(100)),
                Err(OrderError::NotEditable { .. })
            ));
            assert!(matches!(
                order.set_item_quantity("product_1", 2, 1),
                Err(OrderError::NotEditable { .. })
            ));
            assert!(matches!(
                order.remove_item("product_1"),
                Err(OrderError::NotEditable { .. })
            ));
            assert_eq!(order.items().len(), 1);
        }
    }

    #[test]
    fn quantities_must_be_positive() {
        assert_eq!(positive_quantity(0), Err(OrderError::InvalidQuantity(0)));
        assert_eq!(positive_quantity(-2), Err(OrderError::InvalidQuantity(-2)));
        assert_eq!(positive_quantity(3), Ok(3));

        let mut order = Order::new("order_1", "user_1");
        assert_eq!(
            order.add_item("product_1", 0, price(100)).map(|_| ()),
            Err(OrderError::InvalidQuantity(0))
        );
        assert!(order.items().is_empty());
    }

    #[test]
    fn set_quantity_detects_stale_expectation() {
        let mut order = Order::new("order_1", "user_1");
        order.add_item("product_1", 3, price(100)).unwrap();

        assert!(matches!(
            order.set_item_quantity("product_1", 5, 2),
            Err(OrderError::Conflict { .. })
        ));
        assert_eq!(order.set_item_quantity("product_1", 5, 3), Ok(3));
        assert_eq!(order.item("product_1").map(OrderItem::quantity), Some(5));
    }

    #[test]
    fn removing_missing_line_fails() {
        let mut order = Order::new("order_1", "user_1");
        assert!(matches!(
            order.remove_item("product_1"),
            Err(OrderError::ItemNotFound { .. })
        ));
    }
}
