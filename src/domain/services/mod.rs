mod catalog_store;
mod fault_injector;

pub use catalog_store::CatalogStore;
pub use fault_injector::{FailureConfig, FaultInjector, SimulatedCrash};
