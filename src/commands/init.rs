//! `rulehub init` - scaffold an installation and project the config tree
//! into the assistant directory

use crate::config::SplitPaths;
use crate::corpus::Category;
use crate::meta::{InstallMeta, InstallMode, MetaSource, SourceKind};
use crate::sync::{scan_tree, tree_hashes};
use crate::utils::fs::{copy_file, count_files, create_symlink, ensure_dir, is_symlink};
use crate::utils::git;
use crate::{Install, Result, Scope};
use colored::Colorize;
use std::path::Path;

pub struct InitOptions {
    pub scope: Scope,
    /// External rules repository to seed the config tree from
    pub rules_url: Option<String>,
    /// Copy files instead of symlinking category directories
    pub copy: bool,
}

/// Starter rule set written when no external source is given. Kept small:
/// the always-active pair plus one routed example per side of the split.
const STARTER_FILES: &[(&str, &str)] = &[
    (
        "rules/essential.md",
        "---\ndescription: Core conventions that are always loaded\n---\n\n\
         # Essential Rules\n\n\
         - Prefer small, focused changes over sweeping rewrites.\n\
         - Keep explanations short; show the code.\n\
         - Never commit secrets, tokens, or credentials.\n",
    ),
    (
        "rules/security.md",
        "---\ndescription: Security rules that apply to every change\n---\n\n\
         # Security Rules\n\n\
         - Validate all external input at the boundary.\n\
         - Use parameterized queries; never interpolate SQL.\n\
         - Treat file paths from users as hostile until normalized.\n",
    ),
    (
        "rules/commit.md",
        "---\ndescription: Commit message conventions\nkeywords: [commit, message, convention]\n---\n\n\
         # Commit Messages\n\n\
         - Subject line in imperative mood, 50 characters or less.\n\
         - Body explains what and why, not how.\n",
    ),
    (
        "rules/testing.md",
        "---\ndescription: Testing conventions and coverage expectations\n---\n\n\
         # Testing\n\n\
         - Every bug fix ships with a regression test.\n\
         - Test names describe behavior, not implementation.\n",
    ),
    (
        "commands/commit.md",
        "---\ndescription: Stage and commit with a conventional message\n---\n\n\
         # /commit\n\n\
         Stage the current changes and write a commit message following the\n\
         commit rules.\n",
    ),
];

pub async fn run(options: InitOptions) -> Result<()> {
    let install = Install::for_scope(options.scope)?;
    let config_dir = install.config_dir();
    let mode = if options.copy {
        InstallMode::Copy
    } else {
        InstallMode::Symlink
    };

    println!(
        "\n  {} {} setup\n",
        crate::APP_NAME.bold(),
        options.scope.label()
    );

    ensure_dir(&install.root)?;
    ensure_dir(&config_dir)?;

    let mut sources = Vec::new();

    if let Some(url) = &options.rules_url {
        println!("  Fetching rules from: {}", url);
        let name = git::repo_name(url)?;
        let repo_path = install.sources_dir().join(&name);
        ensure_dir(install.sources_dir())?;
        git::clone_repo(url, &repo_path)?;
        println!("  {} Cloned {}\n", "✓".green(), name);

        copy_source_config(&repo_path, &config_dir)?;
        sources.push(MetaSource {
            name,
            url: Some(git::normalize_git_url(url)?),
            kind: SourceKind::External,
        });
    } else {
        write_starter_files(&config_dir)?;
        sources.push(MetaSource {
            name: "builtin".to_string(),
            url: None,
            kind: SourceKind::Builtin,
        });
    }

    // project category directories into the assistant config dir
    let claude_dir = install.claude_dir();
    ensure_dir(&claude_dir)?;

    for category in Category::ALL {
        let source_dir = config_dir.join(category.dir_name());
        if !source_dir.is_dir() {
            continue;
        }
        let target = claude_dir.join(category.dir_name());
        let files = count_files(&source_dir);

        // local priority: never clobber a real directory the user owns
        if target.exists() && !is_symlink(&target) {
            println!(
                "  {} {}/ kept local copy ({} files upstream)",
                "-".yellow(),
                category.dir_name(),
                files
            );
            continue;
        }

        match mode {
            InstallMode::Symlink => {
                create_symlink(&source_dir, &target)?;
                println!(
                    "  {} {}/ linked ({} files)",
                    "✓".green(),
                    category.dir_name(),
                    files
                );
            }
            InstallMode::Copy => {
                for (rel, bytes) in scan_tree(&source_dir) {
                    let dest = target.join(&rel);
                    if let Some(parent) = dest.parent() {
                        ensure_dir(parent)?;
                    }
                    std::fs::write(&dest, bytes)
                        .map_err(|e| crate::HubError::file_system(&dest, e))?;
                }
                println!(
                    "  {} {}/ copied ({} files)",
                    "✓".green(),
                    category.dir_name(),
                    files
                );
            }
        }
    }

    // the router needs the inactive side of the split to exist up front
    let split = SplitPaths::for_claude_dir(&claude_dir);
    ensure_dir(&split.inactive)?;

    let mut meta = InstallMeta::new(mode);
    meta.sources = sources;
    if mode == InstallMode::Copy {
        meta.file_hashes = Some(tree_hashes(&claude_dir));
    }
    meta.save(&install.meta_path())?;

    println!(
        "\n{}",
        format!(
            "  ✅ {} installation ready at {}",
            options.scope.label(),
            install.root.display()
        )
        .green()
    );
    println!("  Try: rulehub test \"write a commit message\"\n");
    Ok(())
}

/// Seed the config tree from a cloned source repository: its `config/`
/// subtree when present, otherwise the repository root
fn copy_source_config(repo_path: &Path, config_dir: &Path) -> Result<()> {
    let external_config = repo_path.join("config");
    let source_root = if external_config.is_dir() {
        external_config
    } else {
        repo_path.to_path_buf()
    };

    for category in Category::ALL {
        let source_dir = source_root.join(category.dir_name());
        if !source_dir.is_dir() {
            continue;
        }
        for (rel, _) in scan_tree(&source_dir) {
            copy_file(
                source_dir.join(&rel),
                config_dir.join(category.dir_name()).join(&rel),
            )?;
        }
    }
    Ok(())
}

/// Write the built-in starter rules, never overwriting existing files
fn write_starter_files(config_dir: &Path) -> Result<()> {
    for (rel, content) in STARTER_FILES {
        let dest = config_dir.join(rel);
        if dest.exists() {
            continue;
        }
        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }
        std::fs::write(&dest, content).map_err(|e| crate::HubError::file_system(&dest, e))?;
    }
    Ok(())
}
