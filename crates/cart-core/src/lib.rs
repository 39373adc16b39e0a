//! # cart-core
//!
//! Client-side cart state for the storefront.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                     CartStore<S>                      │
//! │  ┌────────────┐  ┌─────────────────┐  ┌────────────┐  │
//! │  │    Cart    │  │ KeyValueStorage │  │ Listeners  │  │
//! │  │ (reducer)  │──│   (adapter)     │──│ (changed)  │  │
//! │  └────────────┘  └─────────────────┘  └────────────┘  │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! `Cart` is a plain value with the add/remove/adjust rules. `CartStore`
//! owns one, writes it through a `KeyValueStorage` after every mutation and
//! tells subscribers the cart changed. The browser build plugs in
//! `window.localStorage`; tests use `MemoryStorage`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cart_core::{CartStore, MemoryStorage};
//!
//! let mut store = CartStore::load(MemoryStorage::new());
//! store.add("omega-3", "Omega 3", dec!(250.50));
//! store.add("omega-3", "Omega 3", dec!(250.50));
//! assert_eq!(store.total(), dec!(501.00));
//! ```

pub mod cart;
pub mod error;
pub mod storage;
pub mod store;

pub use cart::{Cart, CartItem};
pub use error::{CartError, Result};
pub use storage::{KeyValueStorage, MemoryStorage};
pub use store::{CART_STORAGE_KEY, CartListener, CartStore};
