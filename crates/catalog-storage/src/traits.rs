//! The [`ProductStore`] trait defining the persistence contract.
//!
//! Two-layer API design:
//! - **Strict** methods (`read_all`, `write_all`) are what backends
//!   implement. They report every failure.
//! - **Policy** methods (`load`, `save`) are provided on top. `load`
//!   favours availability: a missing or unreadable collection becomes an
//!   empty one. `save` passes failures through untouched.

use std::collections::HashSet;

use catalog_core::Product;

use crate::error::StorageError;

/// Whole-collection persistence for products.
///
/// The trait is synchronous: writes are bounded local operations and are
/// performed while the caller holds the catalog lock.
pub trait ProductStore: Send {
    /// Reads the stored collection. A store with nothing saved yet returns
    /// an empty collection, not an error.
    fn read_all(&self) -> Result<Vec<Product>, StorageError>;

    /// Replaces the stored collection with `products`, in order.
    fn write_all(&mut self, products: &[Product]) -> Result<(), StorageError>;

    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Loads the collection for startup, never failing.
    ///
    /// Read and parse errors yield an empty collection. Records repeating an
    /// id already seen earlier in the file are dropped.
    fn load(&self) -> Vec<Product> {
        let products = match self.read_all() {
            Ok(products) => products,
            Err(err) => {
                tracing::warn!(
                    "failed to load products from {}, starting empty: {}",
                    self.describe(),
                    err
                );
                return Vec::new();
            }
        };

        let mut seen = HashSet::with_capacity(products.len());
        let total = products.len();
        let unique: Vec<Product> = products
            .into_iter()
            .filter(|p| seen.insert(p.id))
            .collect();
        if unique.len() != total {
            tracing::warn!(
                "dropped {} product(s) with duplicate ids while loading {}",
                total - unique.len(),
                self.describe()
            );
        }
        tracing::info!("loaded {} product(s) from {}", unique.len(), self.describe());
        unique
    }

    /// Persists the complete collection.
    fn save(&mut self, products: &[Product]) -> Result<(), StorageError> {
        self.write_all(products)
    }
}
