//! Log marker probe.
//!
//! Looks for any of the configured marker strings in a log file. Markers are
//! tried in configuration order and the first one present wins, wherever it
//! sits in the file.

use super::labels;
use super::CheckResult;
use crate::core::config::{LogMode, LogProbeConfig};
use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::PathBuf;

enum ReadOutcome {
    /// First incremental read: position recorded, content ignored
    Initialized(u64),
    Unchanged,
    Appended(String),
}

#[derive(Debug)]
pub struct LogProbe {
    enabled: bool,
    path: PathBuf,
    markers: Vec<String>,
    mode: LogMode,
    /// Byte offset already consumed in incremental mode
    offset: Option<u64>,
}

impl LogProbe {
    pub const NAME: &'static str = "log";

    pub fn new(config: &LogProbeConfig) -> Self {
        Self {
            enabled: config.enabled,
            path: config.path.clone(),
            markers: config.markers.clone(),
            mode: config.mode,
            offset: None,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn check(&mut self) -> CheckResult {
        if !self.enabled {
            return CheckResult::disabled();
        }

        if self.path.as_os_str().is_empty() {
            log::warn!("Log probe is enabled but no path is set");
            return CheckResult::idle(labels::PATH_NOT_SET);
        }

        match self.mode {
            LogMode::Full => self.check_full(),
            LogMode::Incremental => self.check_incremental(),
        }
    }

    fn check_full(&self) -> CheckResult {
        if !self.path.exists() {
            return CheckResult::idle(labels::LOG_NOT_FOUND);
        }

        match fs::read(&self.path) {
            Ok(bytes) => self.scan(&String::from_utf8_lossy(&bytes)),
            Err(e) => {
                log::error!("Failed to read log file {:?}: {}", self.path, e);
                CheckResult::not_complete()
            }
        }
    }

    fn check_incremental(&mut self) -> CheckResult {
        if !self.path.exists() {
            if self.offset.is_none() {
                // The log does not exist yet, so everything it will contain is new
                self.offset = Some(0);
            }
            return CheckResult::idle(labels::LOG_NOT_FOUND);
        }

        match self.read_appended() {
            Ok(ReadOutcome::Initialized(offset)) => {
                log::info!("Log probe starting at byte {} of {:?}", offset, self.path);
                CheckResult::idle(labels::INITIALIZING)
            }
            Ok(ReadOutcome::Unchanged) => CheckResult::idle(labels::NO_NEW_CONTENT),
            Ok(ReadOutcome::Appended(content)) => {
                log::debug!("Read {} new bytes from {:?}", content.len(), self.path);
                self.scan(&content)
            }
            Err(e) => {
                log::error!("Failed to read log file {:?}: {}", self.path, e);
                CheckResult::not_complete()
            }
        }
    }

    /// Read bytes appended since the recorded offset.
    ///
    /// The offset only moves after a successful read.
    fn read_appended(&mut self) -> io::Result<ReadOutcome> {
        let mut file = File::open(&self.path)?;
        let len = file.metadata()?.len();

        let Some(offset) = self.offset else {
            self.offset = Some(len);
            return Ok(ReadOutcome::Initialized(len));
        };

        let start = if len < offset {
            log::warn!("{:?} shrank from {} to {} bytes, rereading", self.path, offset, len);
            0
        } else {
            offset
        };

        if len == start {
            self.offset = Some(len);
            return Ok(ReadOutcome::Unchanged);
        }

        file.seek(SeekFrom::Start(start))?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;

        self.offset = Some(start + buf.len() as u64);
        Ok(ReadOutcome::Appended(String::from_utf8_lossy(&buf).into_owned()))
    }

    fn scan(&self, content: &str) -> CheckResult {
        match self.find_marker(content) {
            Some(marker) => {
                log::info!("Found completion marker {:?} in {:?}", marker, self.path);
                CheckResult::triggered(labels::LOG_MARKER, Some(marker.to_string()))
            }
            None => CheckResult::not_complete(),
        }
    }

    /// First configured marker contained in `content`
    pub fn find_marker(&self, content: &str) -> Option<&str> {
        self.markers
            .iter()
            .find(|marker| !marker.is_empty() && content.contains(marker.as_str()))
            .map(String::as_str)
    }
}
