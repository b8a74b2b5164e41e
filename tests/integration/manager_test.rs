use jobwatch::core::config::Config;
use jobwatch::core::probe::labels;
use jobwatch::core::ProbeManager;
use jobwatch::platform::{PowerReadings, PowerTelemetry};
use jobwatch::Result;
use std::fs;
use tempfile::TempDir;

/// Every GPU always reports the same draw
struct Constant(Vec<(u32, f32)>);

impl PowerTelemetry for Constant {
    fn source(&self) -> &'static str {
        "constant"
    }

    fn power_draw(&mut self) -> Result<PowerReadings> {
        Ok(self.0.iter().copied().collect())
    }
}

fn idle_gpus() -> Box<dyn PowerTelemetry> {
    Box::new(Constant(vec![(0, 12.0), (1, 15.5)]))
}

#[test]
fn test_gpu_probe_triggers_through_manager() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.file.path = temp_dir.path().join("never.pth");
    config.gpu_power.enabled = true;
    config.gpu_power.consecutive_checks = 2;

    let mut manager = ProbeManager::from_config(&config, idle_gpus());
    assert_eq!(manager.enabled_names(), vec!["file", "gpu-power"]);

    assert!(!manager.check().triggered);
    let result = manager.check();
    assert!(result.triggered);
    assert_eq!(result.method, labels::POWER_THRESHOLD);
    assert!(result.detail.is_none());

    // Counter is only rearmed by reset
    assert!(manager.check().triggered);
    manager.reset();
    assert!(!manager.check().triggered);
}

#[test]
fn test_first_probe_in_order_wins() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("model_final.pth");

    let mut config = Config::default();
    config.file.path = target.clone();
    config.gpu_power.enabled = true;
    config.gpu_power.consecutive_checks = 1;

    let mut manager = ProbeManager::from_config(&config, idle_gpus());

    // File probe only initializes, GPU triggers right away
    assert_eq!(manager.check().method, labels::POWER_THRESHOLD);

    fs::write(&target, "w").unwrap();
    let result = manager.check();
    assert_eq!(result.method, labels::FILE_CREATED);
    assert_eq!(result.detail, Some(target.display().to_string()));
}

#[test]
fn test_check_all_reports_every_enabled_probe() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = Config::default();
    config.file.path = temp_dir.path().join("never.pth");
    config.directory.enabled = true;
    config.directory.path = temp_dir.path().to_path_buf();

    let mut manager = ProbeManager::from_config(&config, idle_gpus());
    let results = manager.check_all();

    let names: Vec<_> = results.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["file", "directory"]);
    assert!(results
        .iter()
        .all(|(_, result)| result.method == labels::INITIALIZING));
}
