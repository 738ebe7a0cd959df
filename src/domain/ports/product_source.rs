//! Product Source Port
//!
//! Defines the interface for loading the catalog at startup.
//! Implementations may read JSON files, an embedded fixture, or anything else.

use crate::domain::entities::Product;
use async_trait::async_trait;

/// Supplier of the product records that make up the catalog.
///
/// This is an outbound port called exactly once, before the service
/// starts serving. The returned order is the catalog order.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Load every product record.
    async fn load(&self) -> anyhow::Result<Vec<Product>>;
}
