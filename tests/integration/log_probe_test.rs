use jobwatch::core::config::{LogMode, LogProbeConfig};
use jobwatch::core::probe::{labels, LogProbe};
use std::fs::{self, OpenOptions};
use std::io::Write;
use tempfile::TempDir;

fn append(path: &std::path::Path, text: &str) {
    let mut file = OpenOptions::new().append(true).open(path).unwrap();
    file.write_all(text.as_bytes()).unwrap();
}

#[test]
fn test_incremental_log_ignores_old_markers() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("train.log");
    fs::write(&log_path, "previous run\nTraining completed\n").unwrap();

    let mut probe = LogProbe::new(&LogProbeConfig {
        enabled: true,
        path: log_path.clone(),
        markers: vec!["Training completed".to_string()],
        mode: LogMode::Incremental,
    });

    assert_eq!(probe.check().method, labels::INITIALIZING);
    assert_eq!(probe.check().method, labels::NO_NEW_CONTENT);

    append(&log_path, "epoch 10 loss 0.01\n");
    assert!(!probe.check().triggered);

    append(&log_path, "Training completed\n");
    let result = probe.check();
    assert!(result.triggered);
    assert_eq!(result.method, labels::LOG_MARKER);
    assert_eq!(result.detail.as_deref(), Some("Training completed"));

    // Reported once
    assert!(!probe.check().triggered);
}

#[test]
fn test_full_log_sees_existing_marker() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("train.log");
    fs::write(&log_path, "Finished training\n").unwrap();

    let mut probe = LogProbe::new(&LogProbeConfig {
        enabled: true,
        path: log_path,
        markers: vec!["Training completed".to_string(), "Finished training".to_string()],
        mode: LogMode::Full,
    });

    let result = probe.check();
    assert!(result.triggered);
    assert_eq!(result.detail.as_deref(), Some("Finished training"));
}
