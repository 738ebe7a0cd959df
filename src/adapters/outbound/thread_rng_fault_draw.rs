//! Thread RNG Fault Draw
//!
//! Implements FaultDraw with the thread-local RNG from `rand`, so
//! concurrent requests never contend on a shared generator.

use crate::domain::ports::FaultDraw;
use rand::Rng;

/// Uniform draws in `0..1000`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngFaultDraw;

impl ThreadRngFaultDraw {
    pub fn new() -> Self {
        Self
    }
}

impl FaultDraw for ThreadRngFaultDraw {
    fn draw(&self) -> u32 {
        rand::thread_rng().gen_range(0..1000)
    }
}
