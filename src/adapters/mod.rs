//! Adapters: inbound transports and outbound infrastructure bindings.

pub mod inbound;
pub mod outbound;
