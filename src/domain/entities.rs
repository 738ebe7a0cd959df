//! Domain Entities - Core business objects
//!
//! These entities represent the records served by the catalog.
//! They have no external dependencies and are never mutated after load.

use serde::{Deserialize, Serialize};

/// A monetary amount.
///
/// Mirrors the `Money` message of the catalog schema: whole `units` plus
/// `nanos` (10^-9 units) sharing the same sign.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// ISO 4217 currency code (USD, EUR, ...)
    #[serde(default)]
    pub currency_code: String,
    /// Whole units of the amount
    #[serde(default)]
    pub units: i64,
    /// Nano units of the amount, in -999_999_999..=999_999_999
    #[serde(default)]
    pub nanos: i32,
}

impl Money {
    pub fn new(currency_code: impl Into<String>, units: i64, nanos: i32) -> Self {
        Self {
            currency_code: currency_code.into(),
            units,
            nanos,
        }
    }
}

/// A product in the catalog.
///
/// Field names follow the protobuf JSON mapping used by the product
/// files and the RPC surface (`priceUsd`, camelCase money fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Identifier, unique within the catalog
    pub id: String,
    /// Display name
    pub name: String,
    /// Free text description
    #[serde(default)]
    pub description: String,
    /// Picture reference (file name or URL)
    #[serde(default)]
    pub picture: String,
    /// Unit price
    #[serde(default)]
    pub price_usd: Money,
    /// Ordered category labels
    #[serde(default)]
    pub categories: Vec<String>,
}

impl Product {
    /// Case-insensitive substring match against name or description.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_lowercase(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}
