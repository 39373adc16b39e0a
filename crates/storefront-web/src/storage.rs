//! Browser Storage Adapter
//!
//! `KeyValueStorage` over `window.localStorage`. The handle is looked up on
//! every call so the adapter itself holds no JS objects.

use cart_core::{CartError, KeyValueStorage};
use wasm_bindgen::JsValue;

/// `window.localStorage`
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn local_storage() -> cart_core::Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| CartError::Storage("no window".into()))?
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| CartError::Storage("localStorage unavailable".into()))
    }
}

fn js_error(value: JsValue) -> CartError {
    CartError::Storage(format!("{value:?}"))
}

impl KeyValueStorage for BrowserStorage {
    fn get_item(&self, key: &str) -> cart_core::Result<Option<String>> {
        Self::local_storage()?.get_item(key).map_err(js_error)
    }

    fn set_item(&self, key: &str, value: &str) -> cart_core::Result<()> {
        Self::local_storage()?.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&self, key: &str) -> cart_core::Result<()> {
        Self::local_storage()?.remove_item(key).map_err(js_error)
    }
}
