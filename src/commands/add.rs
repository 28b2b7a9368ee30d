//! `rulehub add` - register an external rule source and merge its files

use crate::commands::require_install;
use crate::corpus::Category;
use crate::meta::{InstallMeta, MetaSource, SourceKind};
use crate::sync::scan_tree;
use crate::utils::fs::ensure_dir;
use crate::utils::git;
use crate::{HubError, Result};
use colored::Colorize;
use std::path::Path;

#[derive(Debug, Default)]
pub struct AddOptions {
    /// Override the source name derived from the URL
    pub name: Option<String>,
}

pub async fn run(source_url: String, options: AddOptions) -> Result<()> {
    let install = require_install()?;
    let mut meta = InstallMeta::load(&install.meta_path())?;

    let name = match options.name {
        Some(name) => name,
        None => git::repo_name(&source_url)?,
    };
    let normalized = git::normalize_git_url(&source_url)?;

    if meta.has_source(&name) {
        return Err(HubError::source(format!(
            "source \"{}\" already exists; run `rulehub update` to refresh it",
            name
        )));
    }

    println!("\n  Adding rule source: {}\n", source_url);

    let repo_path = install.sources_dir().join(&name);
    ensure_dir(install.sources_dir())?;
    git::clone_repo(&source_url, &repo_path)?;
    println!("  {} Cloned {}", "✓".green(), name);

    let added = merge_source_files(&repo_path, &install.config_dir(), &name)?;

    meta.sources.push(MetaSource {
        name: name.clone(),
        url: Some(normalized),
        kind: SourceKind::External,
    });
    meta.touch();
    meta.save(&install.meta_path())?;

    println!(
        "\n{}",
        format!("  ✅ Added {} files from \"{}\"", added, name).green()
    );
    println!("  Run \"rulehub update\" to sync changes.\n");
    Ok(())
}

/// Copy the source's category files into the config tree. Filenames get a
/// `<source>-` prefix so independently maintained sources cannot collide.
fn merge_source_files(repo_path: &Path, config_dir: &Path, name: &str) -> Result<usize> {
    let external_config = repo_path.join("config");
    let source_root = if external_config.is_dir() {
        external_config
    } else {
        repo_path.to_path_buf()
    };

    let mut added = 0usize;
    for category in Category::ALL {
        let source_dir = source_root.join(category.dir_name());
        if !source_dir.is_dir() {
            continue;
        }
        let dest_dir = config_dir.join(category.dir_name());
        ensure_dir(&dest_dir)?;

        for (rel, bytes) in scan_tree(&source_dir) {
            let prefixed = match rel.rsplit_once('/') {
                Some((dir, file)) => format!("{}/{}-{}", dir, name, file),
                None => format!("{}-{}", name, rel),
            };
            let dest = dest_dir.join(&prefixed);
            if let Some(parent) = dest.parent() {
                ensure_dir(parent)?;
            }
            std::fs::write(&dest, bytes).map_err(|e| HubError::file_system(&dest, e))?;
            added += 1;
        }
    }
    Ok(added)
}
