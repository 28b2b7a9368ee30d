//! `rulehub update` - refresh external sources and sync the installed tree

use crate::commands::require_install;
use crate::meta::{InstallMeta, InstallMode, SourceKind};
use crate::sync::{compare_trees, scan_tree, tree_hashes, user_edited, DiffResult};
use crate::utils::fs::ensure_dir;
use crate::utils::git;
use crate::Result;
use colored::Colorize;
use inquire::{Confirm, MultiSelect};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct UpdateOptions {
    /// Overwrite modified files and delete files removed upstream
    pub force: bool,
    /// Only add new files; never touch existing ones
    pub add_only: bool,
    /// Choose per modified file
    pub interactive: bool,
}

pub async fn run(options: UpdateOptions) -> Result<()> {
    let install = require_install()?;
    let mut meta = InstallMeta::load(&install.meta_path())?;

    println!(
        "\n  Updating {} rules ({})\n",
        install.scope.label(),
        install.root.display()
    );
    println!("  Mode:    {}", meta.mode);
    println!(
        "  Sources: {}\n",
        meta.sources
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // refresh external checkouts first
    for source in &meta.sources {
        if source.kind != SourceKind::External {
            continue;
        }
        let repo_path = install.sources_dir().join(&source.name);
        if !repo_path.exists() {
            println!("  {} {} checkout missing, skipped", "!".yellow(), source.name);
            continue;
        }
        if git::update_repo(&repo_path) {
            println!("  {} {} updated", "✓".green(), source.name);
        } else {
            println!("  {} {} already up to date", "-".dimmed(), source.name);
        }
    }

    if meta.mode == InstallMode::Symlink {
        // linked categories track the config tree directly
        meta.touch();
        meta.save(&install.meta_path())?;
        println!("\n{}", "  ✅ Update complete (symlinked)".green());
        return Ok(());
    }

    let config_dir = install.config_dir();
    let claude_dir = install.claude_dir();
    let source_files = scan_tree(&config_dir);
    let installed_files = scan_tree(&claude_dir);
    let diff = compare_trees(&source_files, &installed_files);

    if diff.is_clean() {
        println!("\n{}", "  ✅ Already up to date".green());
        return Ok(());
    }

    print_summary(&diff);

    let recorded = meta.file_hashes.clone().unwrap_or_default();
    let plan = decide_plan(&options, &diff, &recorded, &installed_files)?;

    let mut applied = 0usize;
    for rel in plan.add.iter().chain(plan.update.iter()) {
        let dest = claude_dir.join(rel);
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        if let Some(bytes) = source_files.get(rel) {
            std::fs::write(&dest, bytes).map_err(|e| crate::HubError::file_system(&dest, e))?;
            applied += 1;
        }
    }
    for rel in &plan.remove {
        let dest = claude_dir.join(rel);
        if dest.exists() {
            std::fs::remove_file(&dest).map_err(|e| crate::HubError::file_system(&dest, e))?;
            applied += 1;
        }
    }

    if applied > 0 {
        println!("\n  Applied:");
        if !plan.add.is_empty() {
            println!("{}", format!("  + {} files added", plan.add.len()).green());
        }
        if !plan.update.is_empty() {
            println!(
                "{}",
                format!("  ~ {} files updated", plan.update.len()).yellow()
            );
        }
        if !plan.remove.is_empty() {
            println!("{}", format!("  - {} files removed", plan.remove.len()).red());
        }
    }

    meta.file_hashes = Some(tree_hashes(&claude_dir));
    meta.touch();
    meta.save(&install.meta_path())?;

    println!("\n{}", "  ✅ Update complete".green());
    Ok(())
}

fn print_summary(diff: &DiffResult) {
    println!("\n  Changes detected:");
    if !diff.added.is_empty() {
        println!("{}", format!("  + {} new files", diff.added.len()).green());
    }
    if !diff.modified.is_empty() {
        println!(
            "{}",
            format!("  ~ {} modified files", diff.modified.len()).yellow()
        );
    }
    if !diff.removed.is_empty() {
        println!(
            "{}",
            format!("  - {} removed in source", diff.removed.len()).red()
        );
    }
}

#[derive(Debug, Default)]
struct UpdatePlan {
    add: Vec<String>,
    update: Vec<String>,
    remove: Vec<String>,
}

/// Translate a diff into concrete work per the selected policy. New files
/// are always added; what happens to modified/removed files depends on
/// the flags, and hand-edited files require explicit confirmation before
/// a forced overwrite.
fn decide_plan(
    options: &UpdateOptions,
    diff: &DiffResult,
    recorded: &BTreeMap<String, String>,
    installed: &crate::sync::Snapshot,
) -> Result<UpdatePlan> {
    let mut plan = UpdatePlan {
        add: diff.added.clone(),
        ..Default::default()
    };

    if options.force {
        plan.update = diff.modified.clone();
        plan.remove = diff.removed.clone();

        let edited = user_edited(recorded, installed);
        let edited_and_modified: Vec<String> = plan
            .update
            .iter()
            .filter(|rel| edited.contains(*rel))
            .cloned()
            .collect();
        if !edited_and_modified.is_empty() {
            println!(
                "\n{}",
                format!(
                    "  ⚠ {} file(s) were edited locally since the last update:",
                    edited_and_modified.len()
                )
                .yellow()
            );
            for rel in &edited_and_modified {
                println!("    {}", rel);
            }
            let overwrite = Confirm::new("Overwrite locally edited files?")
                .with_default(false)
                .prompt()?;
            if !overwrite {
                plan.update.retain(|rel| !edited_and_modified.contains(rel));
            }
        }
    } else if options.add_only {
        // nothing beyond added files
    } else if options.interactive && !diff.modified.is_empty() {
        println!("{}", "\n  Modified files (choose which to overwrite):".cyan());
        plan.update = MultiSelect::new("Select files to overwrite", diff.modified.clone())
            .prompt()?;
        if !diff.removed.is_empty() {
            let remove = Confirm::new(&format!(
                "Remove {} files that no longer exist in source?",
                diff.removed.len()
            ))
            .with_default(false)
            .prompt()?;
            if remove {
                plan.remove = diff.removed.clone();
            }
        }
    } else if !diff.modified.is_empty() {
        // default merge policy: keep local modifications
        println!(
            "{}",
            format!(
                "\n  Skipping {} modified files (use --force to overwrite)",
                diff.modified.len()
            )
            .dimmed()
        );
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::hash_bytes;

    fn diff_fixture() -> DiffResult {
        DiffResult {
            added: vec!["rules/new.md".to_string()],
            modified: vec!["rules/changed.md".to_string()],
            removed: vec!["rules/gone.md".to_string()],
            unchanged: vec![],
        }
    }

    #[test]
    fn test_merge_policy_only_adds() {
        let plan = decide_plan(
            &UpdateOptions::default(),
            &diff_fixture(),
            &BTreeMap::new(),
            &crate::sync::Snapshot::new(),
        )
        .unwrap();
        assert_eq!(plan.add, vec!["rules/new.md"]);
        assert!(plan.update.is_empty());
        assert!(plan.remove.is_empty());
    }

    #[test]
    fn test_add_only_policy() {
        let options = UpdateOptions {
            add_only: true,
            ..Default::default()
        };
        let plan = decide_plan(
            &options,
            &diff_fixture(),
            &BTreeMap::new(),
            &crate::sync::Snapshot::new(),
        )
        .unwrap();
        assert_eq!(plan.add, vec!["rules/new.md"]);
        assert!(plan.update.is_empty());
        assert!(plan.remove.is_empty());
    }

    #[test]
    fn test_force_policy_without_user_edits() {
        // recorded hash matches installed content: no confirmation needed
        let mut installed = crate::sync::Snapshot::new();
        installed.insert("rules/changed.md".to_string(), b"local".to_vec());
        let mut recorded = BTreeMap::new();
        recorded.insert("rules/changed.md".to_string(), hash_bytes(b"local"));

        let options = UpdateOptions {
            force: true,
            ..Default::default()
        };
        let plan = decide_plan(&options, &diff_fixture(), &recorded, &installed).unwrap();
        assert_eq!(plan.update, vec!["rules/changed.md"]);
        assert_eq!(plan.remove, vec!["rules/gone.md"]);
    }
}
