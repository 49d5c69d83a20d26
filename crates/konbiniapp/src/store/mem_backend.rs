use super::backend::{StorageBackend, StoreKey};
use crate::error::{KonbiniError, Result};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

/// In-memory storage backend.
///
/// Uses `RefCell` for interior mutability since the core is single-threaded.
/// Clones share the same underlying map, so two handles behave like two tabs
/// open on one device.
#[derive(Clone, Default)]
pub struct MemBackend {
    values: Rc<RefCell<HashMap<StoreKey, String>>>,
    simulate_write_error: Rc<Cell<bool>>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Test helper to place an arbitrary raw value, bypassing the repository.
    pub fn set_raw(&self, key: StoreKey, value: &str) {
        self.values.borrow_mut().insert(key, value.to_string());
    }

    /// Test helper to inspect the raw value under `key`.
    pub fn raw(&self, key: StoreKey) -> Option<String> {
        self.values.borrow().get(&key).cloned()
    }
}

impl StorageBackend for MemBackend {
    fn read(&self, key: StoreKey) -> Result<Option<String>> {
        Ok(self.values.borrow().get(&key).cloned())
    }

    fn write(&self, key: StoreKey, value: &str) -> Result<()> {
        if self.simulate_write_error.get() {
            return Err(KonbiniError::StorageWriteFailed {
                key,
                reason: "Simulated write error".to_string(),
            });
        }
        self.values.borrow_mut().insert(key, value.to_string());
        Ok(())
    }

    fn remove(&self, key: StoreKey) -> Result<()> {
        self.values.borrow_mut().remove(&key);
        Ok(())
    }

    fn location(&self, key: StoreKey) -> PathBuf {
        PathBuf::from(format!("memory://{}", key))
    }
}
