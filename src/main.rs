//! Product Catalog - Catalog RPC service with fault injection
//!
//! This is the composition root that wires together all the components.

use product_catalog::adapters::inbound::{RpcServer, RpcState};
use product_catalog::adapters::outbound::{
    JsonDirectoryProductSource, OfrepConfig, OfrepFlagEvaluator, StaticFlagEvaluator,
    ThreadRngFaultDraw,
};
use product_catalog::domain::value_objects::PRODUCT_FAILURE_FLAG;
use product_catalog::infrastructure::shutdown_signal;
use product_catalog::{
    load_config, CatalogService, CatalogStore, FailureConfig, FaultInjector, FlagEvaluator,
    Lifecycle, LogConfig, ProductSource,
};
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging before the rest of the configuration so it can warn
    init_tracing(&LogConfig::from_env());

    // Load configuration from environment
    let cfg = load_config()?;

    tracing::info!(
        "starting product catalog listen={} products_dir={} crash_policy={}",
        cfg.listen_addr(),
        cfg.products_dir.display(),
        cfg.crash_policy
    );

    // ===== COMPOSITION ROOT =====
    // Wire up all adapters and services

    // 1. Create outbound adapters

    // Product catalog (JSON files), loaded once and frozen
    let source = JsonDirectoryProductSource::new(cfg.products_dir.clone());
    let store = CatalogStore::new(source.load().await?);
    if store.is_empty() {
        tracing::warn!("no products found in {}, every lookup will miss", cfg.products_dir.display());
    } else {
        tracing::info!("catalog ready with {} products", store.len());
    }

    // Flag evaluator (OFREP when a backend is configured)
    let flags: Arc<dyn FlagEvaluator> = match &cfg.ofrep_url {
        Some(url) => {
            tracing::info!("evaluating flags via OFREP at {}", url);
            Arc::new(OfrepFlagEvaluator::new(OfrepConfig {
                base_url: url.clone(),
                timeout: cfg.flag_timeout,
            })?)
        }
        None => {
            tracing::info!("no flag backend configured, {} stays disabled", PRODUCT_FAILURE_FLAG);
            Arc::new(StaticFlagEvaluator::new())
        }
    };

    // Fault injection
    let faults = FaultInjector::new(
        FailureConfig::new(cfg.failure_rate).crash_policy(cfg.crash_policy),
        Arc::new(ThreadRngFaultDraw::new()),
        flags,
    );
    tracing::info!(
        "This service will fail on calls to getProducts approx {} out of every thousand calls",
        cfg.failure_rate
    );

    // 2. Create application service
    let catalog = Arc::new(CatalogService::new(store, faults));

    // 3. Create inbound adapter and run until drained
    let lifecycle = Lifecycle::new();
    tokio::spawn(shutdown_signal(lifecycle.clone()));

    let server = RpcServer::new(
        cfg.listen_addr(),
        RpcState::new(catalog, lifecycle),
        cfg.crash_policy,
    );

    server.run().await
}

fn init_tracing(log: &LogConfig) {
    let default_level = if log.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE);

    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
