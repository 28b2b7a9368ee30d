//! `rulehub remove` - drop an external rule source and its merged files

use crate::commands::require_install;
use crate::corpus::Category;
use crate::meta::{InstallMeta, SourceKind};
use crate::utils::fs::remove_path;
use crate::{HubError, Result};
use colored::Colorize;
use std::fs;

pub async fn run(name: String) -> Result<()> {
    let install = require_install()?;
    let mut meta = InstallMeta::load(&install.meta_path())?;

    let Some(position) = meta.sources.iter().position(|s| s.name == name) else {
        let available: Vec<&str> = meta.sources.iter().map(|s| s.name.as_str()).collect();
        return Err(HubError::source(format!(
            "source \"{}\" not found; available: {}",
            name,
            available.join(", ")
        )));
    };
    if meta.sources[position].kind == SourceKind::Builtin {
        return Err(HubError::source("cannot remove the built-in source"));
    }

    println!("\n  Removing source: {}\n", name);

    let repo_path = install.sources_dir().join(&name);
    if repo_path.exists() {
        remove_path(&repo_path)?;
        println!("  {} Removed repository", "✓".green());
    }

    // merged files carry the `<source>-` prefix (see `rulehub add`)
    let prefix = format!("{}-", name);
    let mut removed = 0usize;
    for category in Category::ALL {
        let dir = install.config_dir().join(category.dir_name());
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if path.is_file() && file_name.starts_with(&prefix) {
                remove_path(&path)?;
                removed += 1;
            }
        }
    }

    meta.sources.remove(position);
    meta.touch();
    meta.save(&install.meta_path())?;

    println!("  {} Removed {} files", "✓".green(), removed);
    println!(
        "\n{}",
        format!("  ✅ Source \"{}\" removed", name).green()
    );
    Ok(())
}
