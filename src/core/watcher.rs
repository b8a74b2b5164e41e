//! Polling loop around a [`ProbeManager`].
//!
//! Polls on a fixed interval, sleeping in short slices so a cancel request is
//! honored promptly. An optional timeout ends the session without a trigger.

use crate::core::config::Config;
use crate::core::duration::{self, format_duration};
use crate::core::manager::ProbeManager;
use crate::core::probe::{labels, CheckResult};
use crate::core::report::DirectoryReport;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Granularity of cancel-flag checks while sleeping
const SLEEP_SLICE: Duration = Duration::from_millis(200);

/// Completion event handed to the caller
#[derive(Debug, Clone, Serialize)]
pub struct Completion {
    pub project_name: String,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    #[serde(with = "duration::secs")]
    pub duration: Duration,
    pub method: &'static str,
    pub detail: Option<String>,
    /// Present for directory triggers
    pub report: Option<DirectoryReport>,
}

impl Completion {
    pub fn elapsed_display(&self) -> String {
        format_duration(self.duration)
    }
}

#[derive(Debug)]
pub enum WatchOutcome {
    Completed(Completion),
    Cancelled,
    TimedOut,
}

pub struct Watcher {
    manager: ProbeManager,
    project_name: String,
    interval: Duration,
    timeout: Option<Duration>,
    status_interval: Duration,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl Watcher {
    pub fn new(manager: ProbeManager, config: &Config) -> Self {
        Self {
            manager,
            project_name: config.project_name.clone(),
            interval: config.check_interval,
            timeout: config.timeout,
            status_interval: config.status_interval,
            cancel_flag: None,
        }
    }

    /// Stop the loop once `flag` is set
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Poll until a probe triggers, the cancel flag is set, or the timeout
    /// elapses.
    ///
    /// `on_complete` is called for every completion. In continuous directory
    /// mode that is once per confirmed change set, and the loop only ends
    /// through cancel or timeout.
    pub fn run<F>(&mut self, mut on_complete: F) -> WatchOutcome
    where
        F: FnMut(&Completion),
    {
        let mut started = Instant::now();
        let mut started_at = Local::now();
        let mut last_status = Instant::now();

        log::info!(
            "Watching {} (every {}, timeout {})",
            self.project_name,
            format_duration(self.interval),
            self.timeout
                .map(format_duration)
                .unwrap_or_else(|| "none".to_string())
        );

        loop {
            if self.is_cancelled() {
                log::info!("Watch cancelled");
                return WatchOutcome::Cancelled;
            }

            let result = self.manager.check();
            if result.triggered {
                let completion = self.completion(result, started, started_at);
                on_complete(&completion);

                if !self.continues_after(&completion) {
                    return WatchOutcome::Completed(completion);
                }

                log::info!("Continuous mode: watching for further changes");
                if let Some(directory) = self.manager.directory_mut() {
                    directory.reset();
                }
                started = Instant::now();
                started_at = Local::now();
                last_status = Instant::now();
                // Rebaseline right away so nothing written now is absorbed
                continue;
            }

            if let Some(timeout) = self.timeout {
                if started.elapsed() >= timeout {
                    log::warn!(
                        "Timed out after {} without detecting completion",
                        format_duration(timeout)
                    );
                    return WatchOutcome::TimedOut;
                }
            }

            if last_status.elapsed() >= self.status_interval {
                log::info!(
                    "Still waiting for {} ({} elapsed)",
                    self.project_name,
                    format_duration(started.elapsed())
                );
                last_status = Instant::now();
            }

            let wait = match self.timeout {
                Some(timeout) => self.interval.min(timeout.saturating_sub(started.elapsed())),
                None => self.interval,
            };
            if !self.sleep(wait) {
                log::info!("Watch cancelled");
                return WatchOutcome::Cancelled;
            }
        }
    }

    fn completion(
        &self,
        result: CheckResult,
        started: Instant,
        started_at: DateTime<Local>,
    ) -> Completion {
        let report = if result.method == labels::DIRECTORY_CHANGE {
            self.manager.directory_report().cloned()
        } else {
            None
        };

        Completion {
            project_name: self.project_name.clone(),
            started_at,
            finished_at: Local::now(),
            duration: started.elapsed(),
            method: result.method,
            detail: result.detail,
            report,
        }
    }

    fn continues_after(&self, completion: &Completion) -> bool {
        completion.method == labels::DIRECTORY_CHANGE
            && self
                .manager
                .directory()
                .is_some_and(|directory| directory.is_continuous())
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Sleep for `total`; returns false if cancelled meanwhile
    fn sleep(&self, total: Duration) -> bool {
        let deadline = Instant::now() + total;
        loop {
            if self.is_cancelled() {
                return false;
            }
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            thread::sleep(SLEEP_SLICE.min(deadline - now));
        }
    }
}
