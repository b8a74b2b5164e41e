#[cfg(feature = "nvml")]
use nvml_wrapper::Nvml;

use super::{PowerReadings, PowerTelemetry};
use crate::error::{Result, WatchError};

/// Power telemetry through NVML (the library behind nvidia-smi)
///
/// Reads power without spawning a process per sample.
pub struct NvmlTelemetry {
    #[cfg(feature = "nvml")]
    nvml: Nvml,
}

impl NvmlTelemetry {
    pub fn new() -> Result<Self> {
        #[cfg(feature = "nvml")]
        {
            let nvml = Nvml::init()
                .map_err(|e| WatchError::gpu_not_available(format!("Failed to init NVML: {}", e)))?;

            let count = nvml.device_count().map_err(|e| {
                WatchError::gpu_not_available(format!("Failed to get device count: {}", e))
            })?;
            if count == 0 {
                return Err(WatchError::gpu_not_available("NVML reports no devices"));
            }

            Ok(Self { nvml })
        }
        #[cfg(not(feature = "nvml"))]
        {
            Err(WatchError::gpu_not_available(
                "NVIDIA NVML support not enabled",
            ))
        }
    }
}

impl PowerTelemetry for NvmlTelemetry {
    fn source(&self) -> &'static str {
        "nvml"
    }

    fn power_draw(&mut self) -> Result<PowerReadings> {
        #[cfg(feature = "nvml")]
        {
            let count = self
                .nvml
                .device_count()
                .map_err(|e| WatchError::telemetry(format!("Failed to get device count: {}", e)))?;

            let mut readings = PowerReadings::new();
            for index in 0..count {
                let device = self.nvml.device_by_index(index).map_err(|e| {
                    WatchError::telemetry(format!("Failed to get GPU {}: {}", index, e))
                })?;
                let milliwatts = device.power_usage().map_err(|e| {
                    WatchError::telemetry(format!("Failed to read power of GPU {}: {}", index, e))
                })?;
                readings.insert(index, milliwatts as f32 / 1000.0); // mW -> W
            }

            Ok(readings)
        }
        #[cfg(not(feature = "nvml"))]
        {
            Err(WatchError::gpu_not_available(
                "NVIDIA NVML support not enabled",
            ))
        }
    }
}
