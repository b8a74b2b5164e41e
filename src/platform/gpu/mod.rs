//! GPU power telemetry.
//!
//! Provides per-device power draw readings for the GPU power probe.
//! Supports NVIDIA via NVML (feature `nvml`) and via the `nvidia-smi` tool.

mod nvidia_smi;
mod nvml;

pub use nvidia_smi::{parse_power_csv, NvidiaSmiTelemetry};
pub use nvml::NvmlTelemetry;

use crate::error::{Result, WatchError};
use std::collections::BTreeMap;

/// Device index → current power draw in watts
pub type PowerReadings = BTreeMap<u32, f32>;

/// Source of GPU power readings
///
/// An `Err` means telemetry is unavailable for this sample (missing driver,
/// missing tool, failed query).
pub trait PowerTelemetry: Send {
    /// Short name of the backend, for logs
    fn source(&self) -> &'static str;

    /// Query current power draw for every visible device
    fn power_draw(&mut self) -> Result<PowerReadings>;
}

/// Placeholder used when no backend could be initialized
pub struct UnavailableTelemetry {
    reason: String,
}

impl UnavailableTelemetry {
    pub fn new<S: Into<String>>(reason: S) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl PowerTelemetry for UnavailableTelemetry {
    fn source(&self) -> &'static str {
        "unavailable"
    }

    fn power_draw(&mut self) -> Result<PowerReadings> {
        Err(WatchError::gpu_not_available(self.reason.clone()))
    }
}

/// Pick the best available telemetry backend
///
/// Tries each supported backend in order of preference:
/// 1. NVML
/// 2. `nvidia-smi` on the PATH
///
/// Never fails: without a backend every query reports unavailability.
pub fn default_telemetry() -> Box<dyn PowerTelemetry> {
    match NvmlTelemetry::new() {
        Ok(telemetry) => return Box::new(telemetry),
        Err(e) => log::debug!("NVML telemetry unavailable: {}", e),
    }

    match NvidiaSmiTelemetry::new() {
        Ok(telemetry) => return Box::new(telemetry),
        Err(e) => log::debug!("nvidia-smi telemetry unavailable: {}", e),
    }

    Box::new(UnavailableTelemetry::new(
        "No NVIDIA driver or nvidia-smi found",
    ))
}
