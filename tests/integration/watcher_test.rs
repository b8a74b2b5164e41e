// Watcher loop tests: continuous directory mode and cooperative cancellation

use jobwatch::core::config::Config;
use jobwatch::core::probe::labels;
use jobwatch::core::{ProbeManager, WatchOutcome, Watcher};
use jobwatch::platform::gpu::UnavailableTelemetry;
use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn directory_config(root: &std::path::Path) -> Config {
    let mut config = Config::default();
    config.project_name = "sweep".to_string();
    config.check_interval = Duration::from_millis(20);
    config.timeout = Some(Duration::from_secs(10));
    config.file.enabled = false;
    config.directory.enabled = true;
    config.directory.path = root.to_path_buf();
    config.directory.confirm_delay = Duration::ZERO;
    config
}

fn watcher_for(config: &Config) -> Watcher {
    let manager = ProbeManager::from_config(config, Box::new(UnavailableTelemetry::new("none")));
    Watcher::new(manager, config)
}

#[test]
fn test_directory_trigger_ends_session() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let config = directory_config(&root);

    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        fs::write(root.join("done.txt"), "ok").unwrap();
    });

    let outcome = watcher_for(&config).run(|_| {});
    writer.join().unwrap();

    match outcome {
        WatchOutcome::Completed(completion) => {
            assert_eq!(completion.method, labels::DIRECTORY_CHANGE);
            let report = completion.report.expect("directory report attached");
            assert_eq!(report.counts.added, 1);
            assert_eq!(report.added[0].name, "done.txt");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_continuous_mode_reports_each_change_set() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let mut config = directory_config(&root);
    config.directory.continuous = true;

    let cancel_flag = Arc::new(AtomicBool::new(false));
    let stop = cancel_flag.clone();
    let mut watcher = watcher_for(&config).with_cancel_flag(cancel_flag);

    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(150));
        fs::write(root.join("first.txt"), "1").unwrap();
        thread::sleep(Duration::from_millis(500));
        fs::write(root.join("second.txt"), "2").unwrap();
    });

    let mut seen = Vec::new();
    let outcome = watcher.run(|completion| {
        let report = completion.report.as_ref().unwrap();
        seen.push(report.added[0].name.clone());
        if seen.len() == 2 {
            stop.store(true, Ordering::Relaxed);
        }
    });
    writer.join().unwrap();

    assert!(matches!(outcome, WatchOutcome::Cancelled));
    assert_eq!(seen, vec!["first.txt".to_string(), "second.txt".to_string()]);
}

#[test]
fn test_timeout_override() {
    let temp_dir = TempDir::new().unwrap();
    let config = directory_config(temp_dir.path());

    let outcome = watcher_for(&config)
        .with_timeout(Some(Duration::from_millis(150)))
        .run(|_| {});
    assert!(matches!(outcome, WatchOutcome::TimedOut));
}

#[test]
fn test_continuous_mode_catches_change_right_after_trigger() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    let mut config = directory_config(&root);
    config.check_interval = Duration::from_millis(600);
    config.directory.continuous = true;

    let cancel_flag = Arc::new(AtomicBool::new(false));
    let stop = cancel_flag.clone();
    let mut watcher = watcher_for(&config).with_cancel_flag(cancel_flag);

    // Polls land at about 0, 600 and 1200 ms; the second file arrives
    // between the first trigger and the next poll
    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(300));
        fs::write(root.join("first.txt"), "1").unwrap();
        thread::sleep(Duration::from_millis(500));
        fs::write(root.join("second.txt"), "2").unwrap();
    });

    let mut seen = Vec::new();
    let outcome = watcher.run(|completion| {
        let report = completion.report.as_ref().unwrap();
        seen.extend(report.added.iter().map(|c| c.name.clone()));
        if seen.len() >= 2 {
            stop.store(true, Ordering::Relaxed);
        }
    });
    writer.join().unwrap();

    assert!(matches!(outcome, WatchOutcome::Cancelled));
    assert_eq!(seen, vec!["first.txt".to_string(), "second.txt".to_string()]);
}
