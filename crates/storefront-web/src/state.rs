//! Shared cart state
//!
//! The `CartStore` lives in a `StoredValue`; its change listener mirrors the
//! items into a signal so views re-render without touching the store.

use cart_core::{CartItem, CartStore};
use leptos::prelude::*;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::storage::BrowserStorage;

#[derive(Clone, Copy)]
pub struct CartContext {
    store: StoredValue<CartStore<BrowserStorage>>,
    pub items: RwSignal<Vec<CartItem>>,
}

impl CartContext {
    /// Load the persisted cart and wire its listener to the `items` signal
    pub fn load() -> Self {
        let mut store = CartStore::load(BrowserStorage);
        let items = RwSignal::new(store.items().to_vec());
        store.subscribe(move |cart| items.set(cart.items().to_vec()));

        Self {
            store: StoredValue::new(store),
            items,
        }
    }

    pub fn add(&self, id: &str, name: &str, price: Decimal) {
        self.store.update_value(|store| store.add(id, name, price));
    }

    pub fn remove(&self, id: &str) {
        self.store.update_value(|store| store.remove(id));
    }

    pub fn set_quantity(&self, id: &str, delta: i64) {
        self.store.update_value(|store| store.set_quantity(id, delta));
    }

    pub fn clear(&self) {
        self.store.update_value(CartStore::clear);
    }

    /// Units in the cart (reactive)
    pub fn count(&self) -> u32 {
        self.items.with(|items| items.iter().map(|item| item.qty).sum())
    }

    /// Cart total (reactive)
    pub fn total(&self) -> Decimal {
        self.items
            .with(|items| items.iter().map(CartItem::line_total).sum())
    }
}

/// Cart context provided by `App`
pub fn use_cart() -> CartContext {
    expect_context::<CartContext>()
}

/// Format an amount as pesos
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("${rounded:.2} MXN")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(dec!(250.5)), "$250.50 MXN");
        assert_eq!(format_price(dec!(349)), "$349.00 MXN");
        assert_eq!(format_price(dec!(0.005)), "$0.01 MXN");
    }
}
