//! Fault Draw Port
//!
//! Source of randomness for the randomized failure check.

/// Uniform draw in `0..1000`.
///
/// Called concurrently from many requests at once, so implementations
/// must be safe to share between threads.
pub trait FaultDraw: Send + Sync {
    /// Draw a uniformly distributed value in `0..1000`.
    fn draw(&self) -> u32;
}
