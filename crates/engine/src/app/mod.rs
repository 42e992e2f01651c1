mod input;
mod loop_runner;
mod metrics;
mod scheduler;

pub use input::{EventOrigin, InputAction, KeyInputTracker};
pub use loop_runner::{run_headless, LoopConfig, LoopSummary};
pub use metrics::LoopMetricsSnapshot;
pub use scheduler::{Simulation, TickHooks, TickReport};
