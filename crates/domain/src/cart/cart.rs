use serde::{Deserialize, Serialize};

use crate::catalog::{Product, ProductId};
use crate::money::{Money, clamp_quantity};
use crate::pricing::Totals;

/// A single cart entry: a product snapshot plus a quantity.
///
/// Display fields are denormalized from the product at the time it was
/// added, so later catalog edits do not ripple into the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub image: String,
    pub unit_price: Money,
    pub quantity: u32,
}

impl CartLine {
    /// Line total: unit price times quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// In-memory shopping cart for a single browsing session.
///
/// Holds at most one line per product; line order is insertion order.
/// Every operation is total: quantities floor at 1, removals of absent
/// lines are no-ops, and nothing here errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product to the cart.
    ///
    /// If a line for the product already exists its quantity grows by
    /// `quantity`; otherwise a new line is appended with a price
    /// snapshot taken from the product. Stock is not checked here, it
    /// is advisory display data only.
    pub fn add_item(&mut self, product: &Product, quantity: u32) {
        let quantity = clamp_quantity(quantity);
        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity += quantity;
        } else {
            self.lines.push(CartLine {
                product_id: product.id.clone(),
                name: product.name.clone(),
                image: product.image.clone(),
                unit_price: product.price,
                quantity,
            });
        }
    }

    /// Removes the line for a product; no-op if absent.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.lines.retain(|l| &l.product_id != product_id);
    }

    /// Sets the quantity of an existing line, flooring at 1.
    ///
    /// A request for zero keeps the line at quantity 1 rather than
    /// removing it. No-op if the product is not in the cart.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product_id == product_id) {
            line.quantity = clamp_quantity(quantity);
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Returns the line for a product, if present.
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    /// Returns true if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total quantity across all lines.
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Derived monetary summary. Pure, no side effects.
    pub fn totals(&self) -> Totals {
        Totals::from_lines(self.lines.iter().map(|l| (l.unit_price, l.quantity)))
    }
}
