// Core watch logic

pub mod config;
pub mod duration;
pub mod manager;
pub mod probe;
pub mod report;
pub mod snapshot;
pub mod watcher;

// Re-export commonly used items
pub use config::Config;
pub use manager::ProbeManager;
pub use probe::{CheckResult, Probe};
pub use report::DirectoryReport;
pub use watcher::{Completion, WatchOutcome, Watcher};
