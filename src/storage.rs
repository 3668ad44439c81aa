use sketch_core::{KeyValueStore, PersistError};
use web_sys as web;

/// `window.localStorage` behind the core key-value trait.
pub struct LocalStorage {
    storage: web::Storage,
}

impl LocalStorage {
    pub fn open() -> Result<Self, PersistError> {
        let window = web::window().ok_or_else(|| PersistError::Storage("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| PersistError::Storage(format!("{:?}", e)))?
            .ok_or_else(|| PersistError::Storage("localStorage unavailable".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, PersistError> {
        self.storage
            .get_item(key)
            .map_err(|e| PersistError::Storage(format!("{:?}", e)))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| PersistError::Storage(format!("{:?}", e)))
    }
}
