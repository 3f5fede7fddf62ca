//! Dispatch engine: worker pool, completion monitoring, run timing.

pub mod harness;
pub mod monitor;
pub mod progress;
pub mod timer;
pub mod worker;

pub use harness::{Harness, HarnessConfig, RunSummary};
pub use monitor::{CompletionMonitor, CompletionPolicy, MonitorOutcome};
pub use progress::Progress;
pub use timer::Timer;
