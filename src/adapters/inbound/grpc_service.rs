//! gRPC Services
//!
//! `oteldemo.ProductCatalogService` and `grpc.health.v1.Health` over the
//! generated tonic stubs. Both are mounted on the same router as the JSON
//! surface, so one port serves HTTP/1.1 JSON and HTTP/2 gRPC.

use super::proto::health_server::{Health, HealthServer};
use super::proto::product_catalog_service_server::{
    ProductCatalogService, ProductCatalogServiceServer,
};
use super::proto::{
    Empty, GetProductRequest, HealthCheckRequest, HealthCheckResponse, ListProductsResponse,
    Product, SearchProductsRequest, SearchProductsResponse,
};
use super::{panic_message, RpcState};
use crate::application::{CatalogService, HealthService};
use crate::domain::errors::CatalogError;
use crate::domain::value_objects::CrashPolicy;
use crate::infrastructure::{Lifecycle, RequestGuard};
use axum::Router;
use futures::stream::BoxStream;
use futures::{FutureExt, StreamExt};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tonic::server::NamedService;
use tonic::{Request, Response, Status};

impl From<CatalogError> for Status {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::NotFound(_) => Status::not_found(message),
            CatalogError::Internal(_) => Status::internal(message),
            CatalogError::Unimplemented(_) => Status::unimplemented(message),
            CatalogError::Unavailable(_) => Status::unavailable(message),
        }
    }
}

/// Routes for both gRPC services, keyed by their fully-qualified names.
pub fn grpc_router(state: &RpcState, crash_policy: CrashPolicy) -> Router {
    Router::new()
        .route_service(
            &service_path::<ProductCatalogServiceServer<GrpcCatalog>>(),
            ProductCatalogServiceServer::new(GrpcCatalog::new(state, crash_policy)),
        )
        .route_service(
            &service_path::<HealthServer<GrpcHealth>>(),
            HealthServer::new(GrpcHealth::new(state.health.clone())),
        )
}

fn service_path<S: NamedService>() -> String {
    format!("/{}/*rest", S::NAME)
}

// ===== Catalog =====

/// Catalog service handler.
///
/// Catalog calls are admitted only while the lifecycle is serving. Under
/// [`CrashPolicy::Recover`] a simulated crash becomes `INTERNAL`; under
/// the other policies it tears down the call.
#[derive(Clone)]
pub struct GrpcCatalog {
    catalog: Arc<CatalogService>,
    lifecycle: Lifecycle,
    crash_policy: CrashPolicy,
}

impl GrpcCatalog {
    pub fn new(state: &RpcState, crash_policy: CrashPolicy) -> Self {
        Self {
            catalog: state.catalog.clone(),
            lifecycle: state.lifecycle.clone(),
            crash_policy,
        }
    }

    fn admit(&self) -> Result<RequestGuard, Status> {
        self.lifecycle.request_guard().ok_or_else(|| {
            Status::from(CatalogError::Unavailable(format!(
                "service is {}",
                self.lifecycle.state()
            )))
        })
    }
}

#[tonic::async_trait]
impl ProductCatalogService for GrpcCatalog {
    async fn list_products(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<ListProductsResponse>, Status> {
        let _guard = self.admit()?;
        let products = self.catalog.list_products();
        Ok(Response::new(ListProductsResponse {
            products: products.iter().map(Product::from).collect(),
        }))
    }

    async fn get_product(
        &self,
        request: Request<GetProductRequest>,
    ) -> Result<Response<Product>, Status> {
        let _guard = self.admit()?;
        let id = request.into_inner().id;

        let lookup = self.catalog.get_product(&id);
        let result = if self.crash_policy == CrashPolicy::Recover {
            match AssertUnwindSafe(lookup).catch_unwind().await {
                Ok(result) => result,
                Err(payload) => {
                    let detail = panic_message(&*payload);
                    tracing::error!("recovered from panic: {}", detail);
                    Err(CatalogError::Internal(detail))
                }
            }
        } else {
            lookup.await
        };

        let product = result?;
        Ok(Response::new(Product::from(&product)))
    }

    async fn search_products(
        &self,
        request: Request<SearchProductsRequest>,
    ) -> Result<Response<SearchProductsResponse>, Status> {
        let _guard = self.admit()?;
        let query = request.into_inner().query;
        let results = self.catalog.search_products(&query);
        Ok(Response::new(SearchProductsResponse {
            results: results.iter().map(Product::from).collect(),
        }))
    }
}

// ===== Health =====

/// Health service handler. Stays reachable while draining.
#[derive(Clone, Default)]
pub struct GrpcHealth {
    health: HealthService,
}

impl GrpcHealth {
    pub fn new(health: HealthService) -> Self {
        Self { health }
    }
}

#[tonic::async_trait]
impl Health for GrpcHealth {
    async fn check(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<HealthCheckResponse>, Status> {
        let status = self.health.check(&request.into_inner().service);
        Ok(Response::new(HealthCheckResponse::from(status)))
    }

    type WatchStream = BoxStream<'static, Result<HealthCheckResponse, Status>>;

    async fn watch(
        &self,
        request: Request<HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        let status = self.health.watch(&request.into_inner().service)?;
        let update = HealthCheckResponse::from(status);
        Ok(Response::new(futures::stream::once(async move { Ok(update) }).boxed()))
    }
}
