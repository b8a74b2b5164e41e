//! Point-in-time directory snapshots and the changes between them.
//!
//! A [`DirectorySnapshot`] maps relative paths to [`FileEntry`] descriptors.
//! [`SnapshotScanner`] builds one by walking a tree recursively, pruning every
//! subtree whose name contains an exclude keyword, and [`diff_snapshots`]
//! compares two snapshots into an ordered list of [`Change`]s.

use crate::error::Result;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A file or directory as seen during one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path relative to the scanned root
    pub path: PathBuf,
    pub name: String,
    /// Size in bytes (always 0 for directories)
    pub size: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    pub captured_at: DateTime<Local>,
    pub entries: BTreeMap<PathBuf, FileEntry>,
}

impl DirectorySnapshot {
    pub fn new() -> Self {
        Self {
            captured_at: Local::now(),
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn insert(&mut self, entry: FileEntry) {
        self.entries.insert(entry.path.clone(), entry);
    }
}

impl Default for DirectorySnapshot {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub kind: ChangeKind,
    pub entry: FileEntry,
    /// Empty when no action keyword matched
    pub suggested_action: String,
}

impl Change {
    pub fn key(&self) -> (ChangeKind, PathBuf) {
        (self.kind, self.entry.path.clone())
    }
}

/// Identity of a change set: `(kind, path)` pairs, ignoring sizes and times
pub fn change_keys(changes: &[Change]) -> BTreeSet<(ChangeKind, PathBuf)> {
    changes.iter().map(Change::key).collect()
}

/// Two change sets describe the same changes when their keys are equal
pub fn same_changes(a: &[Change], b: &[Change]) -> bool {
    a.len() == b.len() && change_keys(a) == change_keys(b)
}

/// Which change kinds a diff reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectKinds {
    pub added: bool,
    pub removed: bool,
    pub modified: bool,
}

impl Default for DetectKinds {
    fn default() -> Self {
        Self {
            added: true,
            removed: true,
            modified: false,
        }
    }
}

/// Compare two snapshots.
///
/// Output is grouped by kind (added, removed, modified) and sorted by path
/// within each group. Modified means present in both with a different size or
/// modification time. `suggested_action` is left empty.
pub fn diff_snapshots(
    old: &DirectorySnapshot,
    new: &DirectorySnapshot,
    kinds: DetectKinds,
) -> Vec<Change> {
    let mut changes = Vec::new();

    if kinds.added {
        for (path, entry) in &new.entries {
            if !old.entries.contains_key(path) {
                changes.push(Change {
                    kind: ChangeKind::Added,
                    entry: entry.clone(),
                    suggested_action: String::new(),
                });
            }
        }
    }

    if kinds.removed {
        for (path, entry) in &old.entries {
            if !new.entries.contains_key(path) {
                changes.push(Change {
                    kind: ChangeKind::Removed,
                    entry: entry.clone(),
                    suggested_action: String::new(),
                });
            }
        }
    }

    if kinds.modified {
        for (path, entry) in &new.entries {
            if let Some(previous) = old.entries.get(path) {
                if previous.size != entry.size || previous.modified != entry.modified {
                    changes.push(Change {
                        kind: ChangeKind::Modified,
                        entry: entry.clone(),
                        suggested_action: String::new(),
                    });
                }
            }
        }
    }

    changes
}

/// Recursive directory scanner with keyword pruning
#[derive(Debug, Clone)]
pub struct SnapshotScanner {
    root: PathBuf,
    include_folders: bool,
    exclude_keywords: Vec<String>,
    skip_paths: Vec<PathBuf>,
}

impl SnapshotScanner {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            include_folders: false,
            exclude_keywords: Vec::new(),
            skip_paths: Vec::new(),
        }
    }

    pub fn include_folders(mut self, include: bool) -> Self {
        self.include_folders = include;
        self
    }

    /// Keywords are matched case-insensitively against entry names
    pub fn exclude_keywords(mut self, keywords: &[String]) -> Self {
        self.exclude_keywords = keywords
            .iter()
            .filter(|k| !k.is_empty())
            .map(|k| k.to_lowercase())
            .collect();
        self
    }

    /// Never report this absolute path (used for the probe's own report file)
    pub fn skip_path(mut self, path: PathBuf) -> Self {
        self.skip_paths.push(path);
        self
    }

    /// True when `name` contains any exclude keyword
    pub fn is_excluded(&self, name: &str) -> bool {
        if self.exclude_keywords.is_empty() {
            return false;
        }
        let lower = name.to_lowercase();
        self.exclude_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Scan the whole tree.
    ///
    /// Fails only when the root itself cannot be read; unreadable entries
    /// deeper in the tree are skipped.
    pub fn scan(&self) -> Result<DirectorySnapshot> {
        let mut snapshot = DirectorySnapshot::new();
        let entries = fs::read_dir(&self.root)?;
        let skip = self.resolved_skip_paths();
        self.scan_entries(entries, Path::new(""), &skip, &mut snapshot);
        log::debug!(
            "Scanned {:?}: {} entries",
            self.root,
            snapshot.len()
        );
        Ok(snapshot)
    }

    /// Skip paths in canonical form; ones that do not exist yet stay as given
    fn resolved_skip_paths(&self) -> Vec<PathBuf> {
        self.skip_paths
            .iter()
            .map(|p| fs::canonicalize(p).unwrap_or_else(|_| p.clone()))
            .collect()
    }

    /// Compare canonical forms so `./run/report.txt` matches `/abs/run/report.txt`
    fn is_skipped(path: &Path, skip: &[PathBuf]) -> bool {
        if skip.is_empty() {
            return false;
        }
        if skip.iter().any(|p| p == path) {
            return true;
        }
        // Only pay for canonicalize when the file name could match
        let name = path.file_name();
        if !skip.iter().any(|p| p.file_name() == name) {
            return false;
        }
        match fs::canonicalize(path) {
            Ok(canonical) => skip.iter().any(|p| p == &canonical),
            Err(_) => false,
        }
    }

    fn scan_dir(
        &self,
        dir: &Path,
        relative: &Path,
        skip: &[PathBuf],
        snapshot: &mut DirectorySnapshot,
    ) {
        match fs::read_dir(dir) {
            Ok(entries) => self.scan_entries(entries, relative, skip, snapshot),
            Err(e) => log::debug!("Skipping unreadable directory {:?}: {}", dir, e),
        }
    }

    fn scan_entries(
        &self,
        entries: fs::ReadDir,
        relative: &Path,
        skip: &[PathBuf],
        snapshot: &mut DirectorySnapshot,
    ) {
        for entry in entries.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();

            if self.is_excluded(&name) {
                continue;
            }

            let full_path = entry.path();
            if Self::is_skipped(&full_path, skip) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(_) => continue,
            };

            let rel_path = relative.join(&name);
            let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);

            if metadata.is_dir() {
                if self.include_folders {
                    snapshot.insert(FileEntry {
                        path: rel_path.clone(),
                        name,
                        size: 0,
                        modified,
                        is_dir: true,
                    });
                }
                self.scan_dir(&full_path, &rel_path, skip, snapshot);
            } else {
                snapshot.insert(FileEntry {
                    path: rel_path,
                    name,
                    size: metadata.len(),
                    modified,
                    is_dir: false,
                });
            }
        }
    }
}
