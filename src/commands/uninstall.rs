//! `rulehub uninstall` - remove installed directories after confirmation

use crate::config::{Install, Scope};
use crate::utils::fs::remove_path;
use crate::Result;
use colored::Colorize;
use inquire::Confirm;
use std::path::PathBuf;

#[derive(Debug, Default)]
pub struct UninstallOptions {
    /// Skip the confirmation prompt
    pub force: bool,
    /// Restrict to the global installation
    pub global: bool,
    /// Restrict to the project installation
    pub project: bool,
}

/// Assistant directories that an install may have written into
const TOOL_DIRS: &[&str] = &[".claude", ".codex", ".cursor"];

pub async fn run(options: UninstallOptions) -> Result<()> {
    let scopes: Vec<Scope> = if options.global {
        vec![Scope::Global]
    } else if options.project {
        vec![Scope::Project]
    } else {
        vec![Scope::Project, Scope::Global]
    };

    let mut targets: Vec<(PathBuf, &'static str)> = Vec::new();
    for scope in scopes {
        let Ok(install) = Install::for_scope(scope) else {
            continue;
        };
        let base = install.target_dir();
        if install.root.exists() {
            targets.push((install.root.clone(), scope.label()));
        }
        for dir in TOOL_DIRS {
            let path = base.join(dir);
            if path.exists() {
                targets.push((path, scope.label()));
            }
        }
    }

    if targets.is_empty() {
        println!("\n{}", "  ✅ Nothing to uninstall\n".green());
        return Ok(());
    }

    println!(
        "{}",
        "\n  ⚠ The following directories will be removed:\n".yellow()
    );
    for (path, scope) in &targets {
        println!(
            "  {} {} {}",
            "•".red(),
            path.display(),
            format!("({})", scope).dimmed()
        );
    }
    println!();

    if !options.force {
        let confirmed = Confirm::new("Are you sure you want to uninstall?")
            .with_default(false)
            .prompt()?;
        if !confirmed {
            println!("{}", "\n  Cancelled.\n".dimmed());
            return Ok(());
        }
    }

    let mut removed = 0usize;
    for (path, _) in &targets {
        match remove_path(path) {
            Ok(()) => {
                println!("  {} Removed {}", "✓".green(), path.display());
                removed += 1;
            }
            Err(e) => {
                println!("  {} Failed to remove {}: {}", "✗".red(), path.display(), e);
            }
        }
    }

    println!(
        "\n{}",
        format!("  ✅ Uninstalled {} directories", removed).green()
    );
    Ok(())
}
