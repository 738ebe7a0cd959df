//! Catalog Service - Main application use case
//!
//! Orchestrates the catalog operations: fault injection checks, store
//! lookups and the observability attributes attached to each request.
//! This is the primary interface for the inbound adapter.

use crate::domain::entities::Product;
use crate::domain::errors::CatalogError;
use crate::domain::services::{CatalogStore, FaultInjector};
use std::sync::Arc;
use tracing::field::Empty;
use tracing::Span;

const FLAG_FAILURE_MESSAGE: &str = "Error: ProductCatalogService Fail Feature Flag Enabled";

/// Catalog service - main application use case.
///
/// Only constructible from an already loaded [`CatalogStore`], so every
/// query it answers runs against a fully populated catalog.
pub struct CatalogService {
    store: CatalogStore,
    faults: FaultInjector,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(store: CatalogStore, faults: FaultInjector) -> Self {
        Self { store, faults }
    }

    /// Every product in catalog order. Never fails.
    #[tracing::instrument(name = "ListProducts", skip_all, fields(app.products.count = Empty))]
    pub fn list_products(&self) -> Arc<[Product]> {
        let products = self.store.snapshot();
        Span::current().record("app.products.count", products.len() as u64);
        products
    }

    /// Look up a single product.
    ///
    /// Order of checks:
    /// 1. Random failure (raises a simulated crash, never returns an error)
    /// 2. Flag-gated failure for the sentinel product (`Internal`)
    /// 3. Store lookup (`NotFound` when absent)
    #[tracing::instrument(
        name = "GetProduct",
        skip_all,
        fields(
            app.product.id = %id,
            app.product.name = Empty,
            otel.status_code = Empty,
            otel.status_message = Empty
        )
    )]
    pub async fn get_product(&self, id: &str) -> Result<Product, CatalogError> {
        if let Some(crash) = self.faults.check_random() {
            crash.raise(self.faults.config().crash_policy);
        }

        if self.faults.check_flag(id).await {
            mark_span_error(FLAG_FAILURE_MESSAGE);
            tracing::error!("Failed to LoadProduct id {}.", id);
            return Err(CatalogError::Internal(FLAG_FAILURE_MESSAGE.to_string()));
        }

        let Some(found) = self.store.find_by_id(id) else {
            let err = CatalogError::NotFound(id.to_string());
            mark_span_error(&err.to_string());
            tracing::warn!("{}", err);
            return Err(err);
        };

        Span::current().record("app.product.name", found.name.as_str());
        tracing::info!("Product Found - ID: {}, Name: {}", id, found.name);
        Ok(found.clone())
    }

    /// Products whose name or description contains `query`. Never fails.
    #[tracing::instrument(name = "SearchProducts", skip_all, fields(app.products_search.count = Empty))]
    pub fn search_products(&self, query: &str) -> Vec<Product> {
        let results: Vec<Product> = self.store.search(query).into_iter().cloned().collect();
        Span::current().record("app.products_search.count", results.len() as u64);
        tracing::debug!("search {:?} matched {} products", query, results.len());
        results
    }
}

fn mark_span_error(message: &str) {
    let span = Span::current();
    span.record("otel.status_code", "ERROR");
    span.record("otel.status_message", message);
}
