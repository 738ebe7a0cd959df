//! Catalog RPC Server
//!
//! Serves the catalog and health services on a single port:
//!
//! - gRPC over HTTP/2 at `/<package>.<Service>/<Method>`
//!   (see [`super::grpc_service`])
//! - JSON over HTTP at `POST /twirp/<package>.<Service>/<Method>`, with
//!   errors returned as `{"code": ..., "msg": ...}`

use crate::application::{CatalogService, HealthService};
use crate::domain::entities::Product;
use crate::domain::errors::CatalogError;
use crate::domain::value_objects::{CrashPolicy, ServingStatus};
use super::grpc_service::grpc_router;
use super::panic_message;
use crate::infrastructure::Lifecycle;
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

pub const LIST_PRODUCTS_PATH: &str = "/twirp/oteldemo.ProductCatalogService/ListProducts";
pub const GET_PRODUCT_PATH: &str = "/twirp/oteldemo.ProductCatalogService/GetProduct";
pub const SEARCH_PRODUCTS_PATH: &str = "/twirp/oteldemo.ProductCatalogService/SearchProducts";
pub const HEALTH_CHECK_PATH: &str = "/twirp/grpc.health.v1.Health/Check";
pub const HEALTH_WATCH_PATH: &str = "/twirp/grpc.health.v1.Health/Watch";

const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

// ===== Messages =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListProductsRequest {}

#[derive(Debug, Serialize)]
pub struct ListProductsResponse {
    pub products: Arc<[Product]>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GetProductRequest {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchProductsRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Debug, Serialize)]
pub struct SearchProductsResponse {
    pub results: Vec<Product>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthCheckRequest {
    #[serde(default)]
    pub service: String,
}

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: ServingStatus,
}

// ===== Errors =====

/// Wire error: `{"code": "...", "msg": "..."}` with a matching HTTP status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RpcError {
    #[serde(skip)]
    status: StatusCode,
    pub code: &'static str,
    pub msg: String,
}

impl RpcError {
    /// The request body could not be decoded.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "malformed",
            msg: msg.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<CatalogError> for RpcError {
    fn from(err: CatalogError) -> Self {
        let status = match &err {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            CatalogError::Unimplemented(_) => StatusCode::NOT_IMPLEMENTED,
            CatalogError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self {
            status,
            code: err.code(),
            msg: err.to_string(),
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Decode a JSON request body. An empty body decodes as the default message.
fn decode<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, RpcError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }
    serde_json::from_slice(body).map_err(|e| RpcError::malformed(format!("invalid request body: {}", e)))
}

// ===== Server =====

/// Shared handler state.
#[derive(Clone)]
pub struct RpcState {
    pub catalog: Arc<CatalogService>,
    pub health: HealthService,
    pub lifecycle: Lifecycle,
}

impl RpcState {
    pub fn new(catalog: Arc<CatalogService>, lifecycle: Lifecycle) -> Self {
        Self {
            catalog,
            health: HealthService::new(),
            lifecycle,
        }
    }
}

/// RPC server for the product catalog.
pub struct RpcServer {
    listen_addr: String,
    state: RpcState,
    crash_policy: CrashPolicy,
    drain_timeout: Duration,
}

impl RpcServer {
    pub fn new(listen_addr: impl Into<String>, state: RpcState, crash_policy: CrashPolicy) -> Self {
        Self {
            listen_addr: listen_addr.into(),
            state,
            crash_policy,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    /// How long to wait for in-flight requests once draining starts.
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Build the router for both surfaces.
    ///
    /// Catalog routes only admit requests while the lifecycle is serving.
    /// Health routes stay reachable during drain.
    pub fn router(&self) -> Router {
        let catalog = Router::new()
            .route(LIST_PRODUCTS_PATH, post(list_products_handler))
            .route(GET_PRODUCT_PATH, post(get_product_handler))
            .route(SEARCH_PRODUCTS_PATH, post(search_products_handler))
            .route_layer(middleware::from_fn_with_state(
                self.state.lifecycle.clone(),
                admit,
            ));

        let health = Router::new()
            .route(HEALTH_CHECK_PATH, post(health_check_handler))
            .route(HEALTH_WATCH_PATH, post(health_watch_handler));

        let mut router = catalog
            .merge(health)
            .with_state(self.state.clone())
            .merge(grpc_router(&self.state, self.crash_policy))
            .layer(TraceLayer::new_for_http());

        if self.crash_policy == CrashPolicy::Recover {
            router = router.layer(CatchPanicLayer::custom(panic_response));
        }
        router
    }

    /// Bind the configured address and serve until draining completes.
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run(&self) -> anyhow::Result<()> {
        let listener = TcpListener::bind(&self.listen_addr).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    ///
    /// Marks the lifecycle serving, stops accepting once draining begins,
    /// then waits for in-flight requests before marking it stopped.
    pub async fn serve(&self, listener: TcpListener) -> anyhow::Result<()> {
        let local_addr = listener.local_addr()?;
        let lifecycle = self.state.lifecycle.clone();

        lifecycle.mark_serving();
        tracing::info!(
            "Product Catalog RPC server started on port: {}",
            local_addr.port()
        );

        let draining = lifecycle.clone();
        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(async move { draining.draining().await })
            .await;

        self.finish(served).await
    }

    /// Settle the lifecycle once the accept loop has returned.
    ///
    /// The lifecycle ends up `Stopped` on both paths; only a clean exit
    /// waits for in-flight requests.
    async fn finish(&self, served: std::io::Result<()>) -> anyhow::Result<()> {
        let lifecycle = &self.state.lifecycle;

        if let Err(e) = served {
            lifecycle.mark_stopped();
            tracing::error!("Product Catalog RPC server failed: {}", e);
            return Err(e.into());
        }

        if !lifecycle.wait_for_drain(self.drain_timeout).await {
            tracing::warn!("stopping with {} requests in flight", lifecycle.in_flight());
        }
        lifecycle.mark_stopped();
        tracing::info!("Product Catalog RPC server stopped");
        Ok(())
    }
}

// ===== Middleware =====

async fn admit(State(lifecycle): State<Lifecycle>, request: Request, next: Next) -> Response {
    let Some(_guard) = lifecycle.request_guard() else {
        return RpcError::from(CatalogError::Unavailable(format!(
            "service is {}",
            lifecycle.state()
        )))
        .into_response();
    };
    next.run(request).await
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic_message(&*err);
    tracing::error!("recovered from panic: {}", detail);
    RpcError::from(CatalogError::Internal(detail)).into_response()
}

// ===== Handlers =====

async fn list_products_handler(
    State(state): State<RpcState>,
    body: Bytes,
) -> Result<Json<ListProductsResponse>, RpcError> {
    let _req: ListProductsRequest = decode(&body)?;
    Ok(Json(ListProductsResponse {
        products: state.catalog.list_products(),
    }))
}

async fn get_product_handler(
    State(state): State<RpcState>,
    body: Bytes,
) -> Result<Json<Product>, RpcError> {
    let req: GetProductRequest = decode(&body)?;
    let product = state.catalog.get_product(&req.id).await?;
    Ok(Json(product))
}

async fn search_products_handler(
    State(state): State<RpcState>,
    body: Bytes,
) -> Result<Json<SearchProductsResponse>, RpcError> {
    let req: SearchProductsRequest = decode(&body)?;
    Ok(Json(SearchProductsResponse {
        results: state.catalog.search_products(&req.query),
    }))
}

async fn health_check_handler(
    State(state): State<RpcState>,
    body: Bytes,
) -> Result<Json<HealthCheckResponse>, RpcError> {
    let req: HealthCheckRequest = decode(&body)?;
    Ok(Json(HealthCheckResponse {
        status: state.health.check(&req.service),
    }))
}

async fn health_watch_handler(
    State(state): State<RpcState>,
    body: Bytes,
) -> Result<Json<HealthCheckResponse>, RpcError> {
    let req: HealthCheckRequest = decode(&body)?;
    let status = state.health.watch(&req.service)?;
    Ok(Json(HealthCheckResponse { status }))
}
