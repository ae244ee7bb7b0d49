//! In-memory implementation of [`ProductStore`].
//!
//! [`InMemoryStore`] is a cloneable handle: every clone sees the same saved
//! collection, so a test can hand one clone to the catalog and keep another
//! to inspect what was persisted and how many writes happened.

use std::sync::{Arc, Mutex, MutexGuard};

use catalog_core::Product;

use crate::error::StorageError;
use crate::traits::ProductStore;

#[derive(Debug, Default)]
struct Inner {
    products: Vec<Product>,
    writes: usize,
    reject_writes: bool,
}

/// Shared in-memory product persistence.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated as if `products` had been saved.
    pub fn with_products(products: Vec<Product>) -> Self {
        let store = Self::new();
        store.lock().products = products;
        store
    }

    /// Creates a store that rejects every write.
    pub fn failing() -> Self {
        let store = Self::new();
        store.set_reject_writes(true);
        store
    }

    /// Toggles write rejection.
    pub fn set_reject_writes(&self, reject: bool) {
        self.lock().reject_writes = reject;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// The most recently saved collection.
    pub fn snapshot(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave `Inner` half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProductStore for InMemoryStore {
    fn read_all(&self) -> Result<Vec<Product>, StorageError> {
        Ok(self.snapshot())
    }

    fn write_all(&mut self, products: &[Product]) -> Result<(), StorageError> {
        let mut inner = self.lock();
        if inner.reject_writes {
            return Err(StorageError::WriteRejected(
                "in-memory store is read-only".to_string(),
            ));
        }
        inner.products = products.to_vec();
        inner.writes += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}
