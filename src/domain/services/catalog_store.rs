//! Catalog Store
//!
//! Immutable, shared product collection with read-only query primitives.
//! This service has NO external dependencies - it's pure Rust.

use crate::domain::entities::Product;
use std::sync::Arc;

/// Read-only view over the catalog loaded at startup.
///
/// Cloning is cheap (the products live behind an `Arc`) and there is no
/// mutating method, so concurrent readers need no synchronization.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    products: Arc<[Product]>,
}

impl CatalogStore {
    /// Freeze a loaded product list into a store. Order is preserved.
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: products.into(),
        }
    }

    /// The full catalog in load order.
    pub fn list_all(&self) -> &[Product] {
        &self.products
    }

    /// Shared handle to the full catalog.
    pub fn snapshot(&self) -> Arc<[Product]> {
        Arc::clone(&self.products)
    }

    /// First product with the given id, in catalog order.
    ///
    /// Ids are expected to be unique; if they are not, the first wins.
    pub fn find_by_id(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Products whose name or description contains `query`, ignoring case.
    ///
    /// An empty query is a substring of everything and returns the whole catalog.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| p.matches_lowercase(&needle))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
