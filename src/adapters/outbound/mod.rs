mod json_product_source;
mod ofrep_flag_evaluator;
mod static_flag_evaluator;
mod thread_rng_fault_draw;

pub use json_product_source::JsonDirectoryProductSource;
pub use ofrep_flag_evaluator::{OfrepConfig, OfrepFlagEvaluator};
pub use static_flag_evaluator::StaticFlagEvaluator;
pub use thread_rng_fault_draw::ThreadRngFaultDraw;
