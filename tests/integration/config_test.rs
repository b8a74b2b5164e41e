use jobwatch::core::config::{Config, DeviceSelector, LogMode, TriggerMode};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert!(config.file.enabled);
    assert!(!config.log.enabled);
    assert!(!config.gpu_power.enabled);
    assert!(!config.directory.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_load_full_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "project_name": "llama-finetune",
            "check_interval": "30s",
            "timeout": "12h",
            "log": {"enabled": true, "path": "/tmp/train.log", "markers": ["DONE"], "mode": "incremental"},
            "gpu_power": {"enabled": true, "devices": "0,2", "trigger_mode": "above", "threshold": 100},
            "directory": {
                "enabled": true,
                "path": "/tmp/runs",
                "action_keywords": {"upload": ["final", "best"], "archive": "log"}
            }
        }"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.project_name, "llama-finetune");
    assert_eq!(config.check_interval, Duration::from_secs(30));
    assert_eq!(config.timeout, Some(Duration::from_secs(12 * 3600)));
    assert_eq!(config.log.mode, LogMode::Incremental);
    assert_eq!(config.log.markers, vec!["DONE".to_string()]);
    assert_eq!(config.gpu_power.devices, DeviceSelector::Ids(vec![0, 2]));
    assert_eq!(config.gpu_power.trigger_mode, TriggerMode::Above);
    assert_eq!(config.gpu_power.threshold, 100.0);

    let actions: Vec<_> = config
        .directory
        .action_keywords
        .rules()
        .iter()
        .map(|rule| rule.action.as_str())
        .collect();
    assert_eq!(actions, vec!["upload", "archive"]);
}

#[test]
fn test_config_load_empty_file_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_config_rejects_zero_interval() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"check_interval": 0}"#).unwrap();

    assert!(Config::load(&path).is_err());
}

#[test]
fn test_config_load_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    assert!(Config::load(&temp_dir.path().join("absent.json")).is_err());
}

#[test]
fn test_config_roundtrip_through_json() {
    let mut config = Config::default();
    config.timeout = Some(Duration::from_secs(90));
    config.gpu_power.devices = DeviceSelector::Ids(vec![1]);

    let json = serde_json::to_string(&config).unwrap();
    let back: Config = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}
