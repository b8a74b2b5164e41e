//! File existence probe.
//!
//! Reports the target path appearing (and, optionally, disappearing) relative
//! to the state seen on the first poll.

use super::labels;
use super::pending::{Confirmation, PendingConfirmation};
use super::CheckResult;
use crate::core::config::FileProbeConfig;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileTrigger {
    Created,
    Deleted,
}

impl FileTrigger {
    pub fn label(self) -> &'static str {
        match self {
            FileTrigger::Created => labels::FILE_CREATED,
            FileTrigger::Deleted => labels::FILE_DELETED,
        }
    }
}

#[derive(Debug)]
pub struct FileProbe {
    enabled: bool,
    path: PathBuf,
    detect_deletion: bool,
    /// Existence at the last commit; `None` until the first poll
    baseline: Option<bool>,
    window: PendingConfirmation<FileTrigger>,
}

impl FileProbe {
    pub const NAME: &'static str = "file";

    pub fn new(config: &FileProbeConfig) -> Self {
        Self {
            enabled: config.enabled,
            path: config.path.clone(),
            detect_deletion: config.detect_deletion,
            baseline: None,
            window: PendingConfirmation::new(config.confirm_delay),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Whether a candidate trigger is waiting for confirmation
    pub fn is_confirming(&self) -> bool {
        self.window.is_pending()
    }

    pub fn check(&mut self) -> CheckResult {
        self.check_at(Instant::now())
    }

    pub(crate) fn check_at(&mut self, now: Instant) -> CheckResult {
        if !self.enabled {
            return CheckResult::disabled();
        }

        if self.path.as_os_str().is_empty() {
            log::warn!("File probe is enabled but no path is set");
            return CheckResult::idle(labels::PATH_NOT_SET);
        }

        let exists = self.path.exists();

        let Some(baseline) = self.baseline else {
            self.baseline = Some(exists);
            log::info!(
                "File probe watching {:?} (currently {})",
                self.path,
                if exists { "present" } else { "absent" }
            );
            return CheckResult::idle(labels::INITIALIZING);
        };

        let candidate = match (baseline, exists) {
            (false, true) => Some(FileTrigger::Created),
            (true, false) if self.detect_deletion => Some(FileTrigger::Deleted),
            (true, false) => {
                // Follow the disappearance so a later re-creation is an edge again
                log::debug!("{:?} disappeared, deletion detection is off", self.path);
                self.baseline = Some(false);
                None
            }
            _ => None,
        };

        let Some(candidate) = candidate else {
            if self.window.is_pending() {
                log::info!("{:?} reverted before confirmation, discarding", self.path);
                self.window.clear();
            }
            return CheckResult::not_complete();
        };

        match self.window.observe(candidate, now, |a, b| a == b) {
            Confirmation::Started => {
                log::info!(
                    "{:?} {}, confirming in {}s",
                    self.path,
                    if candidate == FileTrigger::Created { "appeared" } else { "disappeared" },
                    self.window.delay().as_secs()
                );
                CheckResult::idle(labels::WAITING_FOR_CONFIRMATION)
            }
            Confirmation::Waiting => CheckResult::idle(labels::WAITING_FOR_CONFIRMATION),
            Confirmation::Restarted => {
                log::info!("{:?} changed during confirmation, restarting window", self.path);
                CheckResult::idle(labels::WAITING_FOR_CONFIRMATION)
            }
            Confirmation::Confirmed(trigger) => {
                self.baseline = Some(exists);
                log::info!("File probe triggered: {} {:?}", trigger.label(), self.path);
                CheckResult::triggered(trigger.label(), Some(self.path.display().to_string()))
            }
        }
    }

    /// Forget the baseline and any pending confirmation
    pub fn reset(&mut self) {
        self.baseline = None;
        self.window.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    fn probe(path: &Path, detect_deletion: bool, delay_secs: u64) -> FileProbe {
        FileProbe::new(&FileProbeConfig {
            enabled: true,
            path: path.to_path_buf(),
            detect_deletion,
            confirm_delay: Duration::from_secs(delay_secs),
        })
    }

    #[test]
    fn test_disabled_probe_never_triggers() {
        let mut probe = FileProbe::new(&FileProbeConfig {
            enabled: false,
            ..Default::default()
        });
        assert_eq!(probe.check(), CheckResult::disabled());
        assert_eq!(probe.check(), CheckResult::disabled());
    }

    #[test]
    fn test_empty_path_is_not_triggered() {
        let mut probe = probe(Path::new(""), false, 0);
        assert_eq!(probe.check(), CheckResult::idle(labels::PATH_NOT_SET));
    }

    #[test]
    fn test_first_check_never_triggers_even_if_present() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("model.pth");
        fs::write(&target, "weights").unwrap();

        let mut probe = probe(&target, false, 0);
        assert_eq!(probe.check(), CheckResult::idle(labels::INITIALIZING));
        assert!(!probe.check().triggered);
    }

    #[test]
    fn test_creation_triggers_without_delay() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("model.pth");

        let mut probe = probe(&target, false, 0);
        assert!(!probe.check().triggered);

        fs::write(&target, "weights").unwrap();
        let result = probe.check();
        assert_eq!(
            result,
            CheckResult::triggered(labels::FILE_CREATED, Some(target.display().to_string()))
        );

        // Baseline moved to present, so no second trigger
        assert!(!probe.check().triggered);
    }

    #[test]
    fn test_deletion_confirmed_after_delay() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("lock");
        fs::write(&target, "").unwrap();

        let start = Instant::now();
        let mut probe = probe(&target, true, 10);
        probe.check_at(start);

        fs::remove_file(&target).unwrap();
        let first = probe.check_at(start + Duration::from_secs(1));
        assert_eq!(first.method, labels::WAITING_FOR_CONFIRMATION);
        assert!(probe.is_confirming());

        let early = probe.check_at(start + Duration::from_secs(5));
        assert!(!early.triggered);

        let confirmed = probe.check_at(start + Duration::from_secs(11));
        assert!(confirmed.triggered);
        assert_eq!(confirmed.method, labels::FILE_DELETED);
        assert!(!probe.is_confirming());
    }

    #[test]
    fn test_flap_clears_window_without_trigger() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("lock");
        fs::write(&target, "").unwrap();

        let start = Instant::now();
        let mut probe = probe(&target, true, 10);
        probe.check_at(start);

        fs::remove_file(&target).unwrap();
        probe.check_at(start + Duration::from_secs(1));
        assert!(probe.is_confirming());

        fs::write(&target, "").unwrap();
        let result = probe.check_at(start + Duration::from_secs(12));
        assert_eq!(result, CheckResult::not_complete());
        assert!(!probe.is_confirming());
    }

    #[test]
    fn test_recreation_detected_when_deletion_ignored() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("model.pth");
        fs::write(&target, "v1").unwrap();

        let mut probe = probe(&target, false, 0);
        probe.check();

        fs::remove_file(&target).unwrap();
        assert!(!probe.check().triggered);

        fs::write(&target, "v2").unwrap();
        assert_eq!(probe.check().method, labels::FILE_CREATED);
    }

    #[test]
    fn test_reset_rebaselines() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("done");

        let mut probe = probe(&target, false, 0);
        probe.check();
        fs::write(&target, "").unwrap();
        assert!(probe.check().triggered);

        probe.reset();
        assert_eq!(probe.check().method, labels::INITIALIZING);
        assert!(!probe.check().triggered);
    }
}
