//! Cart Store
//!
//! Owns the cart, writes it through to storage after each mutation and
//! notifies "cart changed" listeners (navbar counters and the like).

use rust_decimal::Decimal;

use crate::cart::{Adjustment, Cart, CartItem};
use crate::error::CartError;
use crate::storage::KeyValueStorage;

/// Storage key the serialized cart lives under
pub const CART_STORAGE_KEY: &str = "cart";

/// Callback invoked with the new cart after every change
pub type CartListener = Box<dyn Fn(&Cart) + Send + Sync>;

/// Cart state with persistence and change notification
pub struct CartStore<S: KeyValueStorage> {
    cart: Cart,
    storage: S,
    listeners: Vec<CartListener>,
}

impl<S: KeyValueStorage> CartStore<S> {
    /// Load the cart from storage.
    ///
    /// Missing, unreadable or malformed data yields an empty cart.
    pub fn load(storage: S) -> Self {
        let cart = match storage.get_item(CART_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CartItem>>(&raw) {
                Ok(items) => Cart::from_items(items),
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed stored cart");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Cart storage unreadable, starting empty");
                Cart::new()
            }
        };

        tracing::debug!(items = cart.len(), "Loaded cart");

        Self {
            cart,
            storage,
            listeners: Vec::new(),
        }
    }

    /// Register a "cart changed" listener
    pub fn subscribe(&mut self, listener: impl Fn(&Cart) + Send + Sync + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Add one unit of a product
    pub fn add(&mut self, id: &str, name: &str, price: Decimal) {
        self.cart.add(id, name, price);
        tracing::debug!(id, name, "Added to cart");
        self.commit();
    }

    /// Remove a product entirely
    pub fn remove(&mut self, id: &str) {
        self.cart.remove(id);
        self.commit();
    }

    /// Change a product's quantity by `delta`; at zero or below it is removed.
    /// Unknown ids are ignored.
    pub fn set_quantity(&mut self, id: &str, delta: i64) {
        match self.cart.adjust(id, delta) {
            Some(Adjustment::Removed) => {
                tracing::debug!(id, "Quantity reached zero, removed");
                self.commit();
            }
            Some(Adjustment::Updated(_)) => self.commit(),
            None => {}
        }
    }

    /// Empty the cart and delete the stored copy
    pub fn clear(&mut self) {
        self.cart.clear();
        if let Err(e) = self.storage.remove_item(CART_STORAGE_KEY) {
            tracing::warn!(error = %e, "Failed to remove stored cart");
        }
        self.notify();
    }

    /// Sum of price × qty
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    /// Total units, shown on the cart counter
    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    fn commit(&mut self) {
        self.persist();
        self.notify();
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.cart)
            .map_err(CartError::from)
            .and_then(|json| self.storage.set_item(CART_STORAGE_KEY, &json));

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist cart");
        }
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.cart);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::storage::MemoryStorage;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn stored(store: &CartStore<MemoryStorage>) -> Option<String> {
        store.storage().get_item(CART_STORAGE_KEY).unwrap()
    }

    #[test]
    fn test_load_absent_is_empty() {
        let store = CartStore::load(MemoryStorage::new());
        assert!(store.cart().is_empty());
        assert_eq!(store.total(), Decimal::ZERO);
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let store = CartStore::load(MemoryStorage::with_item(CART_STORAGE_KEY, "{not json"));
        assert!(store.cart().is_empty());

        let store = CartStore::load(MemoryStorage::with_item(
            CART_STORAGE_KEY,
            r#"[{"id":"A","name":"Food","price":1,"qty":-1}]"#,
        ));
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_load_existing() {
        let store = CartStore::load(MemoryStorage::with_item(
            CART_STORAGE_KEY,
            r#"[{"id":"A","name":"Food","price":250.5,"qty":2}]"#,
        ));
        assert_eq!(store.item_count(), 2);
        assert_eq!(store.total(), dec!(501));
    }

    #[test]
    fn test_add_persists() {
        let mut store = CartStore::load(MemoryStorage::new());
        store.add("A", "Food", dec!(250.5));
        store.add("A", "Food", dec!(250.5));

        let reloaded: Vec<CartItem> = serde_json::from_str(&stored(&store).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].qty, 2);
        assert_eq!(reloaded[0].price, dec!(250.5));
    }

    #[test]
    fn test_set_quantity_negative_current_removes() {
        let mut store = CartStore::load(MemoryStorage::new());
        store.add("A", "Food", dec!(10));
        store.add("A", "Food", dec!(10));
        store.add("B", "Toy", dec!(5));

        store.set_quantity("A", -2);

        assert!(store.cart().get("A").is_none());
        assert_eq!(stored(&store).as_deref(), Some(r#"[{"id":"B","name":"Toy","price":5.0,"qty":1}]"#));
    }

    #[test]
    fn test_clear_removes_storage() {
        let mut store = CartStore::load(MemoryStorage::new());
        store.add("A", "Food", dec!(10));
        store.clear();

        assert_eq!(store.total(), Decimal::ZERO);
        assert_eq!(stored(&store), None);
    }

    #[test]
    fn test_listeners_fire_on_change() {
        let mut store = CartStore::load(MemoryStorage::new());
        let calls = Arc::new(AtomicU32::new(0));
        let last_count = Arc::new(AtomicU32::new(0));

        let (c, l) = (calls.clone(), last_count.clone());
        store.subscribe(move |cart| {
            c.fetch_add(1, Ordering::SeqCst);
            l.store(cart.item_count(), Ordering::SeqCst);
        });

        store.add("A", "Food", dec!(10));
        store.add("A", "Food", dec!(10));
        store.set_quantity("missing", 1);
        store.set_quantity("A", 1);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(last_count.load(Ordering::SeqCst), 3);

        store.remove("A");
        store.clear();
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(last_count.load(Ordering::SeqCst), 0);
    }

    struct BrokenStorage;

    impl KeyValueStorage for BrokenStorage {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(CartError::Storage("quota exceeded".into()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(CartError::Storage("quota exceeded".into()))
        }

        fn remove_item(&self, _key: &str) -> Result<()> {
            Err(CartError::Storage("quota exceeded".into()))
        }
    }

    #[test]
    fn test_storage_failures_do_not_break_operations() {
        let mut store = CartStore::load(BrokenStorage);
        store.add("A", "Food", dec!(3));
        store.set_quantity("A", 1);

        assert_eq!(store.total(), dec!(6));
        store.clear();
        assert!(store.cart().is_empty());
    }
}
