mod grpc_service;
pub mod proto;
mod rpc_server;

pub use rpc_server::{RpcError, RpcServer, RpcState};

// Re-export for external use (e.g., integration tests)
#[allow(unused_imports)]
pub use rpc_server::{
    GET_PRODUCT_PATH, HEALTH_CHECK_PATH, HEALTH_WATCH_PATH, LIST_PRODUCTS_PATH,
    SEARCH_PRODUCTS_PATH,
};

use std::any::Any;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "request handler panicked".to_string()
    }
}
