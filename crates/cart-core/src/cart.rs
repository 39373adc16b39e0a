//! Cart Model
//!
//! Line items and the rules for changing them. Uses `rust_decimal` for prices.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product line in the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price in major currency units (e.g. 250.50)
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Quantity, always at least 1 while the item is in a cart
    pub qty: u32,
}

impl CartItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            qty: 1,
        }
    }

    /// Price times quantity
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

/// Ordered collection of line items, at most one per id
///
/// Serialized as a plain JSON array; deserializing goes through
/// [`Cart::from_items`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw items, restoring the one-entry-per-id and
    /// non-zero quantity rules.
    ///
    /// Zero-quantity entries are dropped. Repeated ids are folded into the
    /// first occurrence with their quantities summed.
    pub fn from_items(raw: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in raw.into_iter().filter(|item| item.qty > 0) {
            match cart.position(&item.id) {
                Some(index) => {
                    let existing = &mut cart.items[index];
                    existing.qty = existing.qty.saturating_add(item.qty);
                }
                None => cart.items.push(item),
            }
        }
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct products
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Total units across all lines
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0u32, |sum, item| sum.saturating_add(item.qty))
    }

    /// Sum of price × qty over all lines
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of a product, appending it if it is new
    pub fn add(&mut self, id: &str, name: &str, price: Decimal) {
        match self.position(id) {
            Some(index) => {
                let item = &mut self.items[index];
                item.qty = item.qty.saturating_add(1);
            }
            None => self.items.push(CartItem::new(id, name, price)),
        }
    }

    /// Drop every line with this id. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Shift a line's quantity by `delta`, removing it once it reaches zero.
    ///
    /// Returns `None` if the id is not in the cart.
    pub fn adjust(&mut self, id: &str, delta: i64) -> Option<Adjustment> {
        let index = self.position(id)?;
        let next = i64::from(self.items[index].qty).saturating_add(delta);

        if next <= 0 {
            self.remove(id);
            return Some(Adjustment::Removed);
        }

        let qty = u32::try_from(next).unwrap_or(u32::MAX);
        self.items[index].qty = qty;
        Some(Adjustment::Updated(qty))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }
}

/// Outcome of a quantity adjustment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Adjustment {
    /// Line kept with this new quantity
    Updated(u32),
    /// Quantity dropped to zero or below and the line was removed
    Removed,
}
