//! Config tree snapshots, byte-level diffing, and user-edit detection
//!
//! The update workflow compares the source-of-truth config tree against
//! the installed tree and applies changes per policy. Snapshots are plain
//! path-to-bytes maps, so the diff is a pure function that is easy to
//! reason about and test.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Relative path (forward slashes) -> raw file content
pub type Snapshot = BTreeMap<String, Vec<u8>>;

/// Disjoint partition of the union of two snapshots' paths
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub added: Vec<String>,
    pub modified: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
}

impl DiffResult {
    /// True when the installed tree already matches the source
    pub fn is_clean(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }
}

/// Read every file under `root` into a snapshot. A missing root yields an
/// empty snapshot; unreadable files are skipped with a warning.
pub fn scan_tree(root: &Path) -> Snapshot {
    let mut snapshot = Snapshot::new();
    if !root.is_dir() {
        return snapshot;
    }
    for entry in WalkDir::new(root).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        match fs::read(entry.path()) {
            Ok(bytes) => {
                snapshot.insert(rel, bytes);
            }
            Err(e) => {
                tracing::warn!("skipping unreadable file {}: {}", entry.path().display(), e);
            }
        }
    }
    snapshot
}

/// Byte-level comparison of a source tree against an installed tree
pub fn compare_trees(source: &Snapshot, installed: &Snapshot) -> DiffResult {
    let mut diff = DiffResult::default();

    for (rel, bytes) in source {
        match installed.get(rel) {
            None => diff.added.push(rel.clone()),
            Some(other) if other != bytes => diff.modified.push(rel.clone()),
            Some(_) => diff.unchanged.push(rel.clone()),
        }
    }

    for rel in installed.keys() {
        if !source.contains_key(rel) {
            diff.removed.push(rel.clone());
        }
    }

    diff
}

/// SHA-256 hex digest of a byte slice
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Content hashes for every file under a tree, keyed by relative path
pub fn tree_hashes(root: &Path) -> BTreeMap<String, String> {
    scan_tree(root)
        .into_iter()
        .map(|(rel, bytes)| (rel, hash_bytes(&bytes)))
        .collect()
}

/// Files whose current content no longer matches the hash recorded at
/// install/update time, meaning the user edited them by hand. Files
/// without a recorded hash are not reported.
pub fn user_edited(recorded: &BTreeMap<String, String>, installed: &Snapshot) -> Vec<String> {
    installed
        .iter()
        .filter_map(|(rel, bytes)| {
            let rec = recorded.get(rel)?;
            (hash_bytes(bytes) != *rec).then(|| rel.clone())
        })
        .collect()
}
