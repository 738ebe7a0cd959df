//! Generates the gRPC service plumbing for the catalog and health services.
//!
//! Messages are hand-written prost types in `adapters::inbound::proto`, so
//! only the service stubs are generated here and no `protoc` is needed.

use tonic_build::manual::{Builder, Method, Service};

const PROTO_MOD: &str = "crate::adapters::inbound::proto";
const CODEC: &str = "tonic::codec::ProstCodec";

fn unary(name: &str, route: &str, input: &str, output: &str) -> Method {
    Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("{}::{}", PROTO_MOD, input))
        .output_type(format!("{}::{}", PROTO_MOD, output))
        .codec_path(CODEC)
        .build()
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let catalog = Service::builder()
        .name("ProductCatalogService")
        .package("oteldemo")
        .method(unary("list_products", "ListProducts", "Empty", "ListProductsResponse"))
        .method(unary("get_product", "GetProduct", "GetProductRequest", "Product"))
        .method(unary(
            "search_products",
            "SearchProducts",
            "SearchProductsRequest",
            "SearchProductsResponse",
        ))
        .build();

    let health = Service::builder()
        .name("Health")
        .package("grpc.health.v1")
        .method(unary("check", "Check", "HealthCheckRequest", "HealthCheckResponse"))
        .method(
            Method::builder()
                .name("watch")
                .route_name("Watch")
                .input_type(format!("{}::HealthCheckRequest", PROTO_MOD))
                .output_type(format!("{}::HealthCheckResponse", PROTO_MOD))
                .codec_path(CODEC)
                .server_streaming()
                .build(),
        )
        .build();

    Builder::new()
        .build_server(true)
        .build_client(true)
        .compile(&[catalog, health]);
}
