//! Wire messages for the `oteldemo` catalog and `grpc.health.v1` services
//!
//! Field tags follow `demo.proto` and `health.proto` so any stock gRPC
//! client of those services can talk to this server.

use crate::domain::entities;
use crate::domain::value_objects;

include!(concat!(env!("OUT_DIR"), "/oteldemo.ProductCatalogService.rs"));
include!(concat!(env!("OUT_DIR"), "/grpc.health.v1.Health.rs"));

// ===== oteldemo =====

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Money {
    #[prost(string, tag = "1")]
    pub currency_code: String,
    #[prost(int64, tag = "2")]
    pub units: i64,
    #[prost(int32, tag = "3")]
    pub nanos: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Product {
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub name: String,
    #[prost(string, tag = "3")]
    pub description: String,
    #[prost(string, tag = "4")]
    pub picture: String,
    #[prost(message, optional, tag = "5")]
    pub price_usd: Option<Money>,
    #[prost(string, repeated, tag = "6")]
    pub categories: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListProductsResponse {
    #[prost(message, repeated, tag = "1")]
    pub products: Vec<Product>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetProductRequest {
    #[prost(string, tag = "1")]
    pub id: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchProductsRequest {
    #[prost(string, tag = "1")]
    pub query: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SearchProductsResponse {
    #[prost(message, repeated, tag = "1")]
    pub results: Vec<Product>,
}

// ===== grpc.health.v1 =====

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheckRequest {
    #[prost(string, tag = "1")]
    pub service: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HealthCheckResponse {
    #[prost(enumeration = "health_check_response::ServingStatus", tag = "1")]
    pub status: i32,
}

pub mod health_check_response {
    /// Full `grpc.health.v1` status set, so clients decode every value.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum ServingStatus {
        Unknown = 0,
        Serving = 1,
        NotServing = 2,
        ServiceUnknown = 3,
    }
}

// ===== Domain Conversions =====

impl From<&entities::Money> for Money {
    fn from(money: &entities::Money) -> Self {
        Self {
            currency_code: money.currency_code.clone(),
            units: money.units,
            nanos: money.nanos,
        }
    }
}

impl From<&entities::Product> for Product {
    fn from(product: &entities::Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            picture: product.picture.clone(),
            price_usd: Some(Money::from(&product.price_usd)),
            categories: product.categories.clone(),
        }
    }
}

impl From<value_objects::ServingStatus> for HealthCheckResponse {
    fn from(status: value_objects::ServingStatus) -> Self {
        let status = match status {
            value_objects::ServingStatus::Serving => health_check_response::ServingStatus::Serving,
        };
        Self {
            status: status as i32,
        }
    }
}
