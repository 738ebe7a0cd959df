mod fault_draw;
mod flag_evaluator;
mod product_source;

pub use fault_draw::FaultDraw;
pub use flag_evaluator::FlagEvaluator;
pub use product_source::ProductSource;
