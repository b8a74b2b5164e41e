use jobwatch::core::config::DirectoryProbeConfig;
use jobwatch::core::probe::{labels, DirectoryProbe};
use std::fs;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn probe_for(root: &std::path::Path, delay: Duration) -> DirectoryProbe {
    DirectoryProbe::new(&DirectoryProbeConfig {
        enabled: true,
        path: root.to_path_buf(),
        confirm_delay: delay,
        ..Default::default()
    })
}

#[test]
fn test_nested_tree_changes_are_reported() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    fs::create_dir_all(root.join("checkpoints/epoch_1")).unwrap();
    fs::write(root.join("checkpoints/epoch_1/weights.bin"), "1").unwrap();

    let mut probe = probe_for(root, Duration::ZERO);
    assert_eq!(probe.check().method, labels::INITIALIZING);

    fs::create_dir_all(root.join("checkpoints/epoch_2")).unwrap();
    fs::write(root.join("checkpoints/epoch_2/weights.bin"), "2").unwrap();

    let result = probe.check();
    assert!(result.triggered);

    let report = probe.last_report().unwrap();
    assert_eq!(report.counts.added, 1);
    assert!(report.added[0].path.contains("epoch_2"));
    assert!(report.text.contains("weights.bin"));
}

#[test]
fn test_changes_confirmed_after_quiet_period() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    let mut probe = probe_for(root, Duration::from_millis(300));
    probe.check();

    fs::write(root.join("results.csv"), "acc\n0.9\n").unwrap();
    assert_eq!(probe.check().method, labels::AWAITING_CONFIRMATION);
    assert!(!probe.check().triggered);

    thread::sleep(Duration::from_millis(400));
    assert!(probe.check().triggered);
}

#[test]
fn test_action_keywords_flow_into_report() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    let config: DirectoryProbeConfig = serde_json::from_value(serde_json::json!({
        "enabled": true,
        "path": root,
        "confirm_delay": 0,
        "action_keywords": {"deploy": ["final"], "evaluate": ["ckpt"]}
    }))
    .unwrap();
    let mut probe = DirectoryProbe::new(&config);
    probe.check();

    fs::write(root.join("final_model.ckpt"), "w").unwrap();
    fs::write(root.join("epoch3.ckpt"), "w").unwrap();
    assert!(probe.check().triggered);

    let report = probe.last_report().unwrap();
    let action_of = |name: &str| {
        report
            .added
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.action.clone())
            .unwrap()
    };
    assert_eq!(action_of("final_model.ckpt"), "deploy");
    assert_eq!(action_of("epoch3.ckpt"), "evaluate");
    assert_eq!(report.actions, vec!["deploy".to_string(), "evaluate".to_string()]);
}

#[test]
fn test_custom_report_path_accumulates_reports() {
    let temp_dir = TempDir::new().unwrap();
    let watched = temp_dir.path().join("watched");
    fs::create_dir(&watched).unwrap();
    let report_path = temp_dir.path().join("changes.txt");

    let mut probe = DirectoryProbe::new(&DirectoryProbeConfig {
        enabled: true,
        path: watched.clone(),
        report_path: Some(report_path.clone()),
        confirm_delay: Duration::ZERO,
        ..Default::default()
    });
    probe.check();

    fs::write(watched.join("a.txt"), "a").unwrap();
    assert!(probe.check().triggered);
    fs::remove_file(watched.join("a.txt")).unwrap();
    assert!(probe.check().triggered);

    let written = fs::read_to_string(&report_path).unwrap();
    assert_eq!(written.matches("=== Directory Change Report ===").count(), 2);
    assert!(written.contains("[removed] a.txt"));
}
