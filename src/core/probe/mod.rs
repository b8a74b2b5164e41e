//! Completion probes.
//!
//! Each probe is one detection strategy with private state, polled through
//! [`Probe::check`]. The set of strategies is closed: file existence, log
//! markers, GPU power draw and directory changes.

pub mod directory;
pub mod file;
pub mod gpu_power;
pub mod log_file;
pub mod pending;

pub use directory::DirectoryProbe;
pub use file::{FileProbe, FileTrigger};
pub use gpu_power::GpuPowerProbe;
pub use log_file::LogProbe;
pub use pending::{Confirmation, PendingConfirmation};

use serde::Serialize;

/// Method labels reported by probes
pub mod labels {
    pub const DISABLED: &str = "disabled";
    pub const INITIALIZING: &str = "initializing";
    pub const NOT_COMPLETE: &str = "not complete";
    pub const WAITING_FOR_CONFIRMATION: &str = "waiting for confirmation";
    pub const AWAITING_CONFIRMATION: &str = "awaiting confirmation";
    pub const UNSTABLE_CHANGES: &str = "unstable changes";
    pub const PATH_NOT_SET: &str = "path not set";
    pub const PATH_MISSING: &str = "path missing";
    pub const LOG_NOT_FOUND: &str = "log not found";
    pub const NO_NEW_CONTENT: &str = "no new content";

    pub const FILE_CREATED: &str = "file-created";
    pub const FILE_DELETED: &str = "file-deleted";
    pub const LOG_MARKER: &str = "log-marker";
    pub const POWER_THRESHOLD: &str = "power-threshold";
    pub const DIRECTORY_CHANGE: &str = "directory-change";
}

/// Outcome of one probe poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub triggered: bool,
    /// Human-readable method label
    pub method: &'static str,
    pub detail: Option<String>,
}

impl CheckResult {
    /// Not triggered, with a status label
    pub fn idle(method: &'static str) -> Self {
        Self {
            triggered: false,
            method,
            detail: None,
        }
    }

    pub fn triggered(method: &'static str, detail: Option<String>) -> Self {
        Self {
            triggered: true,
            method,
            detail,
        }
    }

    pub fn disabled() -> Self {
        Self::idle(labels::DISABLED)
    }

    pub fn not_complete() -> Self {
        Self::idle(labels::NOT_COMPLETE)
    }
}

/// One configured detection strategy
#[derive(Debug)]
pub enum Probe {
    File(FileProbe),
    Log(LogProbe),
    GpuPower(GpuPowerProbe),
    Directory(DirectoryProbe),
}

impl Probe {
    pub fn name(&self) -> &'static str {
        match self {
            Probe::File(_) => FileProbe::NAME,
            Probe::Log(_) => LogProbe::NAME,
            Probe::GpuPower(_) => GpuPowerProbe::NAME,
            Probe::Directory(_) => DirectoryProbe::NAME,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Probe::File(probe) => probe.enabled(),
            Probe::Log(probe) => probe.enabled(),
            Probe::GpuPower(probe) => probe.enabled(),
            Probe::Directory(probe) => probe.enabled(),
        }
    }

    pub fn check(&mut self) -> CheckResult {
        match self {
            Probe::File(probe) => probe.check(),
            Probe::Log(probe) => probe.check(),
            Probe::GpuPower(probe) => probe.check(),
            Probe::Directory(probe) => probe.check(),
        }
    }

    /// Rearm the probe after a consumed trigger
    pub fn reset(&mut self) {
        match self {
            Probe::File(probe) => probe.reset(),
            Probe::Log(_) => {}
            Probe::GpuPower(probe) => probe.reset(),
            Probe::Directory(probe) => probe.reset(),
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryProbe> {
        match self {
            Probe::Directory(probe) => Some(probe),
            _ => None,
        }
    }

    pub fn as_directory_mut(&mut self) -> Option<&mut DirectoryProbe> {
        match self {
            Probe::Directory(probe) => Some(probe),
            _ => None,
        }
    }
}
