//! `localStorage` persistence for browser games.

use slide2048_core::{Snapshot, StateStore, StoreError};
use wasm_bindgen::JsValue;
use web_sys::Storage;

/// Default `localStorage` key.
pub const STORAGE_KEY: &str = "slide2048.game";

/// Keeps the snapshot as a JSON string under one `localStorage` key.
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        LocalStorageStore { key: key.into() }
    }

    fn storage() -> Result<Storage, StoreError> {
        web_sys::window()
            .ok_or_else(|| StoreError::Backend("no window".to_string()))?
            .local_storage()
            .map_err(js_error)?
            .ok_or_else(|| StoreError::Backend("no localStorage".to_string()))
    }
}

impl StateStore for LocalStorageStore {
    fn load(&mut self) -> Result<Option<Snapshot>, StoreError> {
        match Self::storage()?.get_item(&self.key).map_err(js_error)? {
            Some(text) => Ok(Some(Snapshot::from_json(&text)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let text = snapshot.to_json()?;
        Self::storage()?.set_item(&self.key, &text).map_err(js_error)
    }
}

fn js_error(value: JsValue) -> StoreError {
    StoreError::Backend(format!("{value:?}"))
}
