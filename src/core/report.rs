//! Directory change reports.
//!
//! A [`DirectoryReport`] is built for every confirmed directory trigger. It
//! carries structured per-kind lists for notification templates and a plain
//! text rendering that is appended to the report file.

use crate::core::snapshot::{Change, ChangeKind};
use crate::error::Result;
use crate::ui::formatters::{format_datetime, format_size, format_time};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// One changed entry, flattened for display and serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    pub path: String,
    pub name: String,
    pub size: u64,
    pub size_display: String,
    pub modified: String,
    pub is_dir: bool,
    /// Empty when no action keyword matched
    pub action: String,
}

impl From<&Change> for ChangeRecord {
    fn from(change: &Change) -> Self {
        let entry = &change.entry;
        Self {
            kind: change.kind,
            path: entry.path.display().to_string(),
            name: entry.name.clone(),
            size: if entry.is_dir { 0 } else { entry.size },
            size_display: if entry.is_dir {
                "<dir>".to_string()
            } else {
                format_size(entry.size)
            },
            modified: format_time(entry.modified),
            is_dir: entry.is_dir,
            action: change.suggested_action.clone(),
        }
    }
}

impl ChangeRecord {
    fn render(&self) -> String {
        let mut line = format!("[{}] {}", self.kind.as_str(), self.path);
        if self.is_dir {
            line.push('/');
        } else {
            line.push_str(&format!(" ({})", self.size_display));
        }
        line.push_str(&format!(" - {}", self.modified));
        if !self.action.is_empty() {
            line.push_str(&format!(" -> {}", self.action));
        }
        line
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectoryReport {
    pub timestamp: DateTime<Local>,
    pub scan_root: PathBuf,
    pub counts: ChangeCounts,
    pub added: Vec<ChangeRecord>,
    pub removed: Vec<ChangeRecord>,
    pub modified: Vec<ChangeRecord>,
    /// Distinct suggested actions, sorted
    pub actions: Vec<String>,
    pub text: String,
}

impl DirectoryReport {
    pub fn build(scan_root: &Path, changes: &[Change]) -> Self {
        let timestamp = Local::now();
        let records: Vec<ChangeRecord> = changes.iter().map(ChangeRecord::from).collect();

        let of_kind = |kind: ChangeKind| -> Vec<ChangeRecord> {
            records.iter().filter(|r| r.kind == kind).cloned().collect()
        };
        let added = of_kind(ChangeKind::Added);
        let removed = of_kind(ChangeKind::Removed);
        let modified = of_kind(ChangeKind::Modified);

        let counts = ChangeCounts {
            added: added.len(),
            removed: removed.len(),
            modified: modified.len(),
            total: records.len(),
        };

        let actions: Vec<String> = records
            .iter()
            .filter(|r| !r.action.is_empty())
            .map(|r| r.action.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut lines = vec![
            "=== Directory Change Report ===".to_string(),
            format!("Time: {}", format_datetime(&timestamp)),
            format!("Path: {}", scan_root.display()),
            format!("Changes: {}", summarize(&counts)),
            String::new(),
        ];
        lines.extend(records.iter().map(ChangeRecord::render));
        if !actions.is_empty() {
            lines.push(String::new());
            lines.push(format!("Suggested actions: {}", actions.join(", ")));
        }
        lines.push(String::new());

        Self {
            timestamp,
            scan_root: scan_root.to_path_buf(),
            counts,
            added,
            removed,
            modified,
            actions,
            text: lines.join("\n"),
        }
    }

    /// "N added, N removed, N modified"
    pub fn summary(&self) -> String {
        summarize(&self.counts)
    }

    /// Every change in report order
    pub fn all_changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.added
            .iter()
            .chain(self.removed.iter())
            .chain(self.modified.iter())
    }

    /// Append the text report plus a blank line to `path`
    pub fn append_to(&self, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(self.text.as_bytes())?;
        file.write_all(b"\n\n")?;
        Ok(())
    }
}

fn summarize(counts: &ChangeCounts) -> String {
    format!(
        "{} added, {} removed, {} modified",
        counts.added, counts.removed, counts.modified
    )
}
