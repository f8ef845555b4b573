// Order Snapshot Domain Model
//
// Orders are owned by an external collaborator; the core only ever sees an
// immutable snapshot captured at submission or render time. Quantity and
// price bounds (quantity >= 1, unit_price >= 0.01, scale 2) are validated at
// order-mutation time by that collaborator and are not re-checked here.

use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// Order ID (relational key owned by the order store)
pub type OrderId = i64;

/// One line of an order: product, quantity and unit price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: BigDecimal,
}

impl LineItem {
    pub fn new(product_name: impl Into<String>, quantity: u32, unit_price: BigDecimal) -> Self {
        Self {
            product_name: product_name.into(),
            quantity,
            unit_price,
        }
    }

    /// Line total = quantity x unit price, exact decimal arithmetic.
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

/// Immutable read of an order's identity and line items at one instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub id: OrderId,
    pub name: String,
    pub created_at: i64, // epoch ms
    pub items: Vec<LineItem>,
}

impl OrderSnapshot {
    pub fn new(id: OrderId, name: impl Into<String>, created_at: i64, items: Vec<LineItem>) -> Self {
        Self {
            id,
            name: name.into(),
            created_at,
            items,
        }
    }

    /// Order total = sum of line totals, exact decimal arithmetic.
    pub fn total_value(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::zero(), |acc, item| acc + item.line_total())
    }
}
