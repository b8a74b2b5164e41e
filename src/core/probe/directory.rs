//! Directory tree probe.
//!
//! Takes a baseline snapshot of a directory tree, then reports files being
//! added, removed or modified. With a confirmation delay, the same change set
//! must be observed twice, `delay` apart, before it is reported; any other
//! change set restarts the wait. Confirmed changes produce a
//! [`DirectoryReport`] that is appended to a report file and kept for the
//! completion sink.

use super::labels;
use super::pending::{Confirmation, PendingConfirmation};
use super::CheckResult;
use crate::core::config::{ActionKeywords, DirectoryProbeConfig};
use crate::core::report::DirectoryReport;
use crate::core::snapshot::{
    diff_snapshots, same_changes, Change, DetectKinds, DirectorySnapshot, SnapshotScanner,
};
use std::path::PathBuf;
use std::time::Instant;

/// Report file name used when no report path is configured
pub const DEFAULT_REPORT_FILE: &str = "jobwatch_report.txt";

#[derive(Debug)]
pub struct DirectoryProbe {
    enabled: bool,
    root: PathBuf,
    include_folders: bool,
    exclude_keywords: Vec<String>,
    report_path: PathBuf,
    kinds: DetectKinds,
    continuous: bool,
    action_keywords: ActionKeywords,
    baseline: Option<DirectorySnapshot>,
    window: PendingConfirmation<Vec<Change>>,
    last_report: Option<DirectoryReport>,
}

impl DirectoryProbe {
    pub const NAME: &'static str = "directory";

    pub fn new(config: &DirectoryProbeConfig) -> Self {
        let report_path = config
            .report_path
            .clone()
            .unwrap_or_else(|| config.path.join(DEFAULT_REPORT_FILE));

        Self {
            enabled: config.enabled,
            root: config.path.clone(),
            include_folders: config.include_folders,
            exclude_keywords: config.exclude_keywords.clone(),
            report_path,
            kinds: DetectKinds {
                added: config.detect_added,
                removed: config.detect_removed,
                modified: config.detect_modified,
            },
            continuous: config.continuous,
            action_keywords: config.action_keywords.clone(),
            baseline: None,
            window: PendingConfirmation::new(config.confirm_delay),
            last_report: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Keep watching after a trigger (the orchestrator resets the probe)
    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn is_initialized(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn is_confirming(&self) -> bool {
        self.window.is_pending()
    }

    /// Report of the most recent confirmed trigger
    pub fn last_report(&self) -> Option<&DirectoryReport> {
        self.last_report.as_ref()
    }

    pub fn check(&mut self) -> CheckResult {
        self.check_at(Instant::now())
    }

    pub(crate) fn check_at(&mut self, now: Instant) -> CheckResult {
        if !self.enabled {
            return CheckResult::disabled();
        }

        if self.root.as_os_str().is_empty() || !self.root.is_dir() {
            log::warn!("Directory probe path does not exist: {:?}", self.root);
            return CheckResult::idle(labels::PATH_MISSING);
        }

        let current = match self.scanner().scan() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("Failed to scan {:?}: {}", self.root, e);
                return CheckResult::not_complete();
            }
        };

        let Some(baseline) = self.baseline.as_ref() else {
            log::info!(
                "Directory probe watching {:?}: initial snapshot has {} entries",
                self.root,
                current.len()
            );
            self.baseline = Some(current);
            return CheckResult::idle(labels::INITIALIZING);
        };

        let mut changes = diff_snapshots(baseline, &current, self.kinds);
        for change in &mut changes {
            change.suggested_action = suggest_action(&self.action_keywords, &change.entry.name);
        }

        if changes.is_empty() {
            if self.window.is_pending() {
                log::debug!("Pending changes in {:?} vanished", self.root);
                self.window.clear();
            }
            return CheckResult::not_complete();
        }

        let count = changes.len();
        match self.window.observe(changes, now, |a, b| same_changes(a, b)) {
            Confirmation::Started => {
                log::info!(
                    "Detected {} changes in {:?}, confirming in {}s",
                    count,
                    self.root,
                    self.window.delay().as_secs()
                );
                CheckResult::idle(labels::AWAITING_CONFIRMATION)
            }
            Confirmation::Waiting => CheckResult::idle(labels::AWAITING_CONFIRMATION),
            Confirmation::Restarted => {
                log::info!("Changes in {:?} are not stable yet, waiting again", self.root);
                CheckResult::idle(labels::UNSTABLE_CHANGES)
            }
            Confirmation::Confirmed(changes) => self.commit(current, &changes),
        }
    }

    fn commit(&mut self, current: DirectorySnapshot, changes: &[Change]) -> CheckResult {
        let report = DirectoryReport::build(&self.root, changes);

        match report.append_to(&self.report_path) {
            Ok(()) => log::info!("Report saved to {:?}", self.report_path),
            Err(e) => log::error!("Failed to save report to {:?}: {}", self.report_path, e),
        }

        log::info!("Directory probe triggered: {}", report.summary());

        self.baseline = Some(current);
        let text = report.text.clone();
        self.last_report = Some(report);

        CheckResult::triggered(labels::DIRECTORY_CHANGE, Some(text))
    }

    fn scanner(&self) -> SnapshotScanner {
        SnapshotScanner::new(&self.root)
            .include_folders(self.include_folders)
            .exclude_keywords(&self.exclude_keywords)
            .skip_path(self.report_path.clone())
    }

    /// Forget baseline and pending changes so the next poll rebaselines.
    ///
    /// The last report is kept.
    pub fn reset(&mut self) {
        self.baseline = None;
        self.window.clear();
    }
}

/// First action (in declaration order) with a keyword contained in `name`,
/// case-insensitively; empty when nothing matches.
pub fn suggest_action(actions: &ActionKeywords, name: &str) -> String {
    let name = name.to_lowercase();
    actions
        .rules()
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .any(|k| !k.is_empty() && name.contains(&k.to_lowercase()))
        })
        .map(|rule| rule.action.clone())
        .unwrap_or_default()
}
