//! OR-composition of the configured probes.

use crate::core::config::Config;
use crate::core::probe::{
    CheckResult, DirectoryProbe, FileProbe, GpuPowerProbe, LogProbe, Probe,
};
use crate::core::report::DirectoryReport;
use crate::platform::gpu::PowerTelemetry;

/// Holds the probes in a fixed order (file, log, GPU power, directory) and
/// reports the first one that triggers.
#[derive(Debug)]
pub struct ProbeManager {
    probes: Vec<Probe>,
}

impl ProbeManager {
    pub fn new(
        file: FileProbe,
        log: LogProbe,
        gpu_power: GpuPowerProbe,
        directory: DirectoryProbe,
    ) -> Self {
        let manager = Self {
            probes: vec![
                Probe::File(file),
                Probe::Log(log),
                Probe::GpuPower(gpu_power),
                Probe::Directory(directory),
            ],
        };

        let enabled = manager.enabled_names();
        if enabled.is_empty() {
            log::warn!("No probe is enabled, the job can never be detected as complete");
        } else {
            log::info!("Enabled probes: {}", enabled.join(", "));
        }

        manager
    }

    pub fn from_config(config: &Config, telemetry: Box<dyn PowerTelemetry>) -> Self {
        Self::new(
            FileProbe::new(&config.file),
            LogProbe::new(&config.log),
            GpuPowerProbe::new(&config.gpu_power, telemetry),
            DirectoryProbe::new(&config.directory),
        )
    }

    /// Poll enabled probes in order; the first trigger wins and later
    /// probes are not polled.
    pub fn check(&mut self) -> CheckResult {
        for probe in self.probes.iter_mut().filter(|p| p.enabled()) {
            let result = probe.check();
            if result.triggered {
                log::info!("Probe '{}' triggered ({})", probe.name(), result.method);
                return result;
            }
            log::debug!("Probe '{}': {}", probe.name(), result.method);
        }

        CheckResult::not_complete()
    }

    /// Poll every enabled probe once, without short-circuiting
    pub fn check_all(&mut self) -> Vec<(&'static str, CheckResult)> {
        self.probes
            .iter_mut()
            .filter(|p| p.enabled())
            .map(|p| (p.name(), p.check()))
            .collect()
    }

    pub fn reset(&mut self) {
        for probe in &mut self.probes {
            probe.reset();
        }
    }

    pub fn get(&self, name: &str) -> Option<&Probe> {
        self.probes.iter().find(|p| p.name() == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Probe> {
        self.probes.iter_mut().find(|p| p.name() == name)
    }

    pub fn directory(&self) -> Option<&DirectoryProbe> {
        self.get(DirectoryProbe::NAME).and_then(Probe::as_directory)
    }

    pub fn directory_mut(&mut self) -> Option<&mut DirectoryProbe> {
        self.get_mut(DirectoryProbe::NAME)
            .and_then(Probe::as_directory_mut)
    }

    /// Report retained by the directory probe after its last trigger
    pub fn directory_report(&self) -> Option<&DirectoryReport> {
        self.directory().and_then(DirectoryProbe::last_report)
    }

    pub fn enabled_names(&self) -> Vec<&'static str> {
        self.probes
            .iter()
            .filter(|p| p.enabled())
            .map(Probe::name)
            .collect()
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }
}
