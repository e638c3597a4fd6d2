//! Simulated benchmark engines and work-list helpers for exercising the pool
//! without real benchmark packages installed.

mod simulated;
pub use simulated::{sample_registry, SimulatedEngine, ESMVALTOOL, ILAMB, PMP};

mod worklist;
pub use worklist::{load_work_list, sample_work_list};
