//! ProductService: the authoritative in-memory catalog and its persistence.
//!
//! All record operations flow through [`ProductService`]. Handlers are thin
//! wrappers that take the catalog lock and delegate here.
//!
//! Every mutation is copy-persist-commit: the change is applied to a copy
//! of the collection, the copy is saved as a whole, and only then does it
//! replace the live collection. A failed save leaves memory exactly as it
//! was, so memory and the backing file never diverge.

use catalog_core::{IdAllocation, IdAllocator, Product, ProductDraft, ProductId, ProductPatch};
use catalog_storage::ProductStore;

use crate::error::ApiError;

/// The record store.
///
/// Not synchronized on its own; [`crate::state::AppState`] puts it behind a
/// single async mutex so that the collection and the save call form one
/// critical section.
pub struct ProductService {
    /// Live collection in insertion order.
    products: Vec<Product>,
    /// Persistence backend, exclusively owned.
    store: Box<dyn ProductStore>,
    ids: IdAllocator,
}

impl ProductService {
    /// Loads the collection from `store`. Load failures yield an empty
    /// catalog.
    pub fn new(store: Box<dyn ProductStore>, policy: IdAllocation) -> Self {
        let products = store.load();
        let mut ids = IdAllocator::new(policy);
        ids.observe(&products);
        tracing::info!(
            "catalog ready with {} product(s), id policy {}",
            products.len(),
            ids.policy()
        );
        ProductService {
            products,
            store,
            ids,
        }
    }

    /// All products in insertion order.
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Looks up a product by id.
    pub fn get(&self, id: ProductId) -> Result<&Product, ApiError> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(ApiError::product_not_found)
    }

    /// Creates a product with a store-assigned id and persists the catalog.
    pub fn create(&mut self, draft: ProductDraft) -> Result<Product, ApiError> {
        let id = self.ids.next(&self.products)?;
        tracing::debug!("assigning id {} to '{}' at {}", id, draft.name(), draft.price());
        let product = Product::from_draft(id, draft);

        let mut next = self.products.clone();
        next.push(product.clone());
        self.commit(next)?;
        self.ids.advance(id);

        tracing::info!("created product {} ({})", id, product.name);
        Ok(product)
    }

    /// Applies a partial update to an existing product and persists the
    /// catalog. An empty patch still persists and returns the product as-is.
    pub fn update(&mut self, id: ProductId, patch: ProductPatch) -> Result<Product, ApiError> {
        let index = self.position(id)?;
        patch.validate()?;
        if patch.is_empty() {
            tracing::debug!("empty update for product {}, rewriting unchanged", id);
        }

        let mut next = self.products.clone();
        next[index].apply(patch);
        let updated = next[index].clone();
        self.commit(next)?;

        tracing::info!("updated product {}", id);
        Ok(updated)
    }

    /// Removes a product and persists the catalog. A missing id is reported
    /// without writing anything.
    pub fn delete(&mut self, id: ProductId) -> Result<Product, ApiError> {
        let index = self.position(id)?;

        let mut next = self.products.clone();
        let removed = next.remove(index);
        self.commit(next)?;

        tracing::info!("deleted product {}", id);
        Ok(removed)
    }

    fn position(&self, id: ProductId) -> Result<usize, ApiError> {
        self.products
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(ApiError::product_not_found)
    }

    /// Saves `next` and, only on success, makes it the live collection.
    fn commit(&mut self, next: Vec<Product>) -> Result<(), ApiError> {
        if let Err(err) = self.store.save(&next) {
            tracing::error!(
                "failed to save catalog to {}: {}",
                self.store.describe(),
                err
            );
            return Err(err.into());
        }
        self.products = next;
        tracing::debug!("catalog now holds {} product(s)", self.len());
        Ok(())
    }
}
