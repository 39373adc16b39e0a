//! Storefront Web Frontend
//!
//! Leptos-based WASM frontend: product catalog, a cart persisted in
//! `localStorage`, and the hand-off to hosted checkout.

mod api;
mod app;
mod catalog;
mod components;
mod pages;
mod state;
mod storage;

pub use app::App;
pub use storage::BrowserStorage;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
