//! JSON Directory Product Source
//!
//! Implements ProductSource by reading every `*.json` file of a directory.
//! Each file holds a product listing: `{"products": [ ... ]}`.

use crate::domain::entities::Product;
use crate::domain::ports::ProductSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// On-disk shape of a product file.
#[derive(Debug, Deserialize)]
struct ProductListing {
    #[serde(default)]
    products: Vec<Product>,
}

/// Directory-backed product source.
///
/// Files are read in file-name order and their products concatenated,
/// which fixes the catalog order across restarts.
pub struct JsonDirectoryProductSource {
    dir: PathBuf,
}

impl JsonDirectoryProductSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Load products from every JSON file in `dir`.
    fn load_from_dir(dir: &Path) -> Result<Vec<Product>> {
        let entries = std::fs::read_dir(dir)
            .with_context(|| format!("reading product directory {}", dir.display()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let is_json = path.extension().map(|ext| ext == "json").unwrap_or(false);
            if is_json && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let mut products = Vec::new();
        for file in &files {
            let data = std::fs::read(file)
                .with_context(|| format!("reading product file {}", file.display()))?;
            let listing: ProductListing = serde_json::from_slice(&data)
                .with_context(|| format!("parsing product file {}", file.display()))?;
            tracing::debug!(
                "{} products from {}",
                listing.products.len(),
                file.display()
            );
            products.extend(listing.products);
        }

        tracing::info!("Loaded {} products", products.len());
        Ok(products)
    }
}

#[async_trait]
impl ProductSource for JsonDirectoryProductSource {
    async fn load(&self) -> Result<Vec<Product>> {
        let dir = self.dir.clone();
        tokio::task::spawn_blocking(move || Self::load_from_dir(&dir)).await?
    }
}
