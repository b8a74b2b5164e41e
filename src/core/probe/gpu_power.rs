//! GPU power probe.
//!
//! Triggers once every selected GPU has been below (or above) the power
//! threshold for a number of consecutive samples.

use super::labels;
use super::CheckResult;
use crate::core::config::{DeviceSelector, GpuPowerConfig, TriggerMode};
use crate::platform::gpu::{PowerReadings, PowerTelemetry};
use std::fmt;

pub struct GpuPowerProbe {
    enabled: bool,
    threshold: f32,
    devices: DeviceSelector,
    consecutive_checks: u32,
    trigger_mode: TriggerMode,
    telemetry: Box<dyn PowerTelemetry>,
    /// Consecutive samples satisfying the trigger mode
    count: u32,
}

impl GpuPowerProbe {
    pub const NAME: &'static str = "gpu-power";

    pub fn new(config: &GpuPowerConfig, telemetry: Box<dyn PowerTelemetry>) -> Self {
        Self {
            enabled: config.enabled,
            threshold: config.threshold,
            devices: config.devices.clone(),
            consecutive_checks: config.consecutive_checks.max(1),
            trigger_mode: config.trigger_mode,
            telemetry,
            count: 0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn check(&mut self) -> CheckResult {
        if !self.enabled {
            return CheckResult::disabled();
        }

        if self.sample_satisfied() {
            self.count += 1;
            log::info!(
                "GPU power {} {}W: [{}/{}]",
                self.trigger_mode.describe(),
                self.threshold,
                self.count,
                self.consecutive_checks
            );

            if self.count >= self.consecutive_checks {
                log::info!(
                    "GPU power stayed {} {}W for {} consecutive checks",
                    self.trigger_mode.describe(),
                    self.threshold,
                    self.consecutive_checks
                );
                return CheckResult::triggered(labels::POWER_THRESHOLD, None);
            }
        } else {
            self.count = 0;
        }

        CheckResult::not_complete()
    }

    /// Take one sample; unavailable telemetry counts as not satisfied
    fn sample_satisfied(&mut self) -> bool {
        match self.telemetry.power_draw() {
            Ok(readings) => {
                log::debug!("GPU power draw ({}): {:?}", self.telemetry.source(), readings);
                self.all_selected_satisfy(&readings)
            }
            Err(e) => {
                log::warn!("GPU power check skipped: {}", e);
                false
            }
        }
    }

    /// Requested ids missing from the readings are skipped, so a selection
    /// with no visible device is vacuously satisfied.
    fn all_selected_satisfy(&self, readings: &PowerReadings) -> bool {
        let satisfied = |id: &u32, watts: f32| {
            let ok = self.trigger_mode.is_satisfied(watts, self.threshold);
            if !ok {
                log::debug!(
                    "GPU {} draws {}W, not {} {}W",
                    id,
                    watts,
                    self.trigger_mode.describe(),
                    self.threshold
                );
            }
            ok
        };

        match &self.devices {
            DeviceSelector::All => readings.iter().all(|(id, watts)| satisfied(id, *watts)),
            DeviceSelector::Ids(ids) => ids
                .iter()
                .filter_map(|id| readings.get(id).map(|watts| (id, *watts)))
                .all(|(id, watts)| satisfied(id, watts)),
        }
    }

    /// Rearm after a trigger
    pub fn reset(&mut self) {
        self.count = 0;
    }
}

impl fmt::Debug for GpuPowerProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpuPowerProbe")
            .field("enabled", &self.enabled)
            .field("threshold", &self.threshold)
            .field("devices", &self.devices)
            .field("consecutive_checks", &self.consecutive_checks)
            .field("trigger_mode", &self.trigger_mode)
            .field("telemetry", &self.telemetry.source())
            .field("count", &self.count)
            .finish()
    }
}
