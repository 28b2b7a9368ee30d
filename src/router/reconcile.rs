//! Active/inactive reconciliation
//!
//! Activation state is the file's location: the active directory holds
//! rules the assistant currently loads, the inactive directory parks the
//! rest. Reconciliation converges the split to a desired set with physical
//! renames in two passes. Files outside the managed corpus are never
//! touched; per-file move failures degrade to a logged no-op.

use crate::config::SplitPaths;
use crate::utils::fs::ensure_dir;
use crate::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Moves performed by a reconciliation pass
#[derive(Debug, Default, Clone)]
pub struct ReconcileReport {
    pub activated: Vec<String>,
    pub deactivated: Vec<String>,
}

impl ReconcileReport {
    pub fn is_converged(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

/// Converges the on-disk split to a desired set of active rule files
pub struct Reconciler {
    split: SplitPaths,
}

impl Reconciler {
    pub fn new(split: SplitPaths) -> Self {
        Self { split }
    }

    /// Create both split directories; idempotent, runs before any move
    pub fn ensure_dirs(&self) -> Result<()> {
        ensure_dir(&self.split.active)?;
        ensure_dir(&self.split.inactive)?;
        Ok(())
    }

    /// Two passes: park active files that are managed but no longer
    /// desired, then pull desired managed files out of the inactive
    /// directory. `desired` and `corpus` hold filenames relative to the
    /// split; `always_active` names are exempt from deactivation.
    pub fn reconcile(
        &self,
        desired: &BTreeSet<String>,
        corpus: &BTreeSet<String>,
        always_active: &BTreeSet<String>,
    ) -> Result<ReconcileReport> {
        self.ensure_dirs()?;
        let mut report = ReconcileReport::default();

        for file in list_markdown(&self.split.active) {
            if corpus.contains(&file) && !desired.contains(&file) && !always_active.contains(&file)
            {
                let src = self.split.active.join(&file);
                let dest = self.split.inactive.join(&file);
                if move_file(&src, &dest) {
                    tracing::info!("deactivated {}", file);
                    report.deactivated.push(file);
                }
            }
        }

        for file in desired {
            if !corpus.contains(file) {
                continue;
            }
            let src = self.split.inactive.join(file);
            if !src.exists() {
                continue;
            }
            let dest = self.split.active.join(file);
            if move_file(&src, &dest) {
                tracing::info!("activated {}", file);
                report.activated.push(file.clone());
            }
        }

        Ok(report)
    }
}

/// Markdown filenames directly under a directory; unreadable directories
/// yield an empty listing
fn list_markdown(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".md"))
        .collect()
}

/// Rename one file. A populated destination or a failed rename is reduced
/// to a no-op; returns whether the move happened.
fn move_file(src: &Path, dest: &Path) -> bool {
    if dest.exists() {
        tracing::warn!("skipping move, destination exists: {}", dest.display());
        return false;
    }
    match fs::rename(src, dest) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("failed to move {}: {}", src.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn setup() -> (tempfile::TempDir, Reconciler, PathBuf, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let active = tmp.path().join("rules");
        let inactive = tmp.path().join("rules-inactive");
        fs::create_dir_all(&active).unwrap();
        fs::create_dir_all(&inactive).unwrap();
        let reconciler = Reconciler::new(SplitPaths::new(&active, &inactive));
        (tmp, reconciler, active, inactive)
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_deactivates_undesired_and_activates_desired() {
        let (_tmp, reconciler, active, inactive) = setup();
        fs::write(active.join("react.md"), "react").unwrap();
        fs::write(inactive.join("rust.md"), "rust").unwrap();

        let corpus = set(&["react.md", "rust.md"]);
        let report = reconciler
            .reconcile(&set(&["rust.md"]), &corpus, &set(&[]))
            .unwrap();

        assert_eq!(report.deactivated, vec!["react.md"]);
        assert_eq!(report.activated, vec!["rust.md"]);
        assert!(inactive.join("react.md").exists());
        assert!(active.join("rust.md").exists());
        assert!(!active.join("react.md").exists());
    }

    #[test]
    fn test_idempotent_second_run_moves_nothing() {
        let (_tmp, reconciler, active, inactive) = setup();
        fs::write(active.join("react.md"), "react").unwrap();
        fs::write(inactive.join("rust.md"), "rust").unwrap();

        let corpus = set(&["react.md", "rust.md"]);
        let desired = set(&["rust.md"]);
        reconciler.reconcile(&desired, &corpus, &set(&[])).unwrap();
        let second = reconciler.reconcile(&desired, &corpus, &set(&[])).unwrap();
        assert!(second.is_converged());
    }

    #[test]
    fn test_always_active_never_deactivated() {
        let (_tmp, reconciler, active, _inactive) = setup();
        fs::write(active.join("essential.md"), "essential").unwrap();

        let corpus = set(&["essential.md"]);
        let report = reconciler
            .reconcile(&set(&[]), &corpus, &set(&["essential.md"]))
            .unwrap();

        assert!(report.is_converged());
        assert!(active.join("essential.md").exists());
    }

    #[test]
    fn test_unmanaged_files_untouched() {
        let (_tmp, reconciler, active, _inactive) = setup();
        fs::write(active.join("personal-notes.md"), "mine").unwrap();

        let report = reconciler
            .reconcile(&set(&[]), &set(&["react.md"]), &set(&[]))
            .unwrap();

        assert!(report.is_converged());
        assert!(active.join("personal-notes.md").exists());
    }

    #[test]
    fn test_desired_outside_corpus_ignored() {
        let (_tmp, reconciler, _active, inactive) = setup();
        fs::write(inactive.join("mystery.md"), "?").unwrap();

        let report = reconciler
            .reconcile(&set(&["mystery.md"]), &set(&["react.md"]), &set(&[]))
            .unwrap();

        assert!(report.is_converged());
        assert!(inactive.join("mystery.md").exists());
    }

    #[test]
    fn test_destination_collision_is_noop() {
        let (_tmp, reconciler, active, inactive) = setup();
        // same name on both sides: the move must be skipped, not an error
        fs::write(active.join("react.md"), "active copy").unwrap();
        fs::write(inactive.join("react.md"), "inactive copy").unwrap();

        let corpus = set(&["react.md"]);
        let report = reconciler
            .reconcile(&set(&["react.md"]), &corpus, &set(&[]))
            .unwrap();

        assert!(report.is_converged());
        assert_eq!(
            fs::read_to_string(active.join("react.md")).unwrap(),
            "active copy"
        );
    }

    #[test]
    fn test_creates_split_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let split = SplitPaths::new(tmp.path().join("rules"), tmp.path().join("rules-inactive"));
        let reconciler = Reconciler::new(split.clone());
        reconciler
            .reconcile(&set(&[]), &set(&[]), &set(&[]))
            .unwrap();
        assert!(split.active.is_dir());
        assert!(split.inactive.is_dir());
    }
}
