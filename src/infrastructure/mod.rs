//! Infrastructure Layer
//!
//! Cross-cutting runtime concerns.

pub mod lifecycle;

pub use lifecycle::{shutdown_signal, Lifecycle, RequestGuard};
