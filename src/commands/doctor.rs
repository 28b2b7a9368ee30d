//! `rulehub doctor` - environment and installation health checks

use crate::config::SplitPaths;
use crate::meta::InstallMeta;
use crate::utils::git;
use crate::{Install, Result, RouterConfig};
use colored::Colorize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckStatus {
    Ok,
    Warn,
    Error,
}

struct CheckResult {
    name: &'static str,
    status: CheckStatus,
    message: String,
    fix: Option<String>,
}

impl CheckResult {
    fn ok(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Ok,
            message: message.into(),
            fix: None,
        }
    }

    fn warn(name: &'static str, message: impl Into<String>, fix: Option<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Warn,
            message: message.into(),
            fix,
        }
    }

    fn error(name: &'static str, message: impl Into<String>, fix: Option<String>) -> Self {
        Self {
            name,
            status: CheckStatus::Error,
            message: message.into(),
            fix,
        }
    }
}

pub async fn run() -> Result<()> {
    println!("{}", format!("\n  🩺 {} doctor\n", crate::APP_NAME).cyan());
    println!("{}", format!("  {}", "-".repeat(50)).dimmed());

    let mut results = Vec::new();

    let install = Install::detect();
    match &install {
        Some(install) => {
            results.push(CheckResult::ok(
                "Installation",
                format!(
                    "found {} installation at {}",
                    install.scope.label(),
                    install.root.display()
                ),
            ));
            match InstallMeta::load(&install.meta_path()) {
                Ok(meta) => {
                    results.push(CheckResult::ok("Metadata", format!("{} mode", meta.mode)));
                }
                Err(_) => {
                    results.push(CheckResult::warn(
                        "Metadata",
                        "meta.json missing or unparseable",
                        Some("Run: rulehub init".to_string()),
                    ));
                }
            }

            let claude_dir = install.claude_dir();
            if claude_dir.is_dir() {
                let split = SplitPaths::for_claude_dir(&claude_dir);
                let mut missing = Vec::new();
                if !split.active.is_dir() {
                    missing.push("rules/");
                }
                if !split.inactive.is_dir() {
                    missing.push("rules-inactive/");
                }
                if missing.is_empty() {
                    results.push(CheckResult::ok(
                        "Router split",
                        "rules/ and rules-inactive/ present",
                    ));
                } else {
                    results.push(CheckResult::warn(
                        "Router split",
                        format!("missing: {}", missing.join(", ")),
                        Some("Run: rulehub init".to_string()),
                    ));
                }
                if claude_dir.join("settings.json").exists() {
                    results.push(CheckResult::ok("Hook", "settings.json present"));
                } else {
                    results.push(CheckResult::warn(
                        "Hook",
                        "settings.json not found; the route hook is not registered",
                        Some(format!(
                            "Register `{} route` as a prompt-submit hook",
                            crate::APP_NAME
                        )),
                    ));
                }
            } else {
                results.push(CheckResult::warn(
                    ".claude directory",
                    format!("not found at {}", claude_dir.display()),
                    Some("Run: rulehub init".to_string()),
                ));
            }
        }
        None => {
            results.push(CheckResult::error(
                "Installation",
                "no installation found",
                Some("Run: rulehub init (project) or rulehub init --global".to_string()),
            ));
        }
    }

    if git::git_available() {
        results.push(CheckResult::ok("Git", "git binary available"));
    } else {
        results.push(CheckResult::warn(
            "Git",
            "git not found on PATH; external sources will not work",
            None,
        ));
    }

    let config = match &install {
        Some(install) => RouterConfig::load(Some(&install.config_file_path()))?,
        None => RouterConfig::from_env(),
    };
    match (&config.anthropic_api_key, &config.openai_api_key) {
        (Some(_), Some(_)) => {
            results.push(CheckResult::ok("Credentials", "anthropic and openai keys set"))
        }
        (Some(_), None) => results.push(CheckResult::ok("Credentials", "anthropic key set")),
        (None, Some(_)) => results.push(CheckResult::ok("Credentials", "openai key set")),
        (None, None) => results.push(CheckResult::warn(
            "Credentials",
            "no provider API key; router will use keyword fallback",
            Some("Set ANTHROPIC_API_KEY or OPENAI_API_KEY".to_string()),
        )),
    }
    if config.semantic_enabled {
        results.push(CheckResult::ok("Semantic routing", "enabled"));
    } else {
        results.push(CheckResult::warn(
            "Semantic routing",
            "disabled (keyword matching only)",
            Some("Set SEMANTIC_ROUTER_ENABLED=true".to_string()),
        ));
    }

    let mut warns = 0usize;
    let mut errors = 0usize;
    for result in &results {
        let symbol = match result.status {
            CheckStatus::Ok => "✓".green(),
            CheckStatus::Warn => "!".yellow(),
            CheckStatus::Error => "✗".red(),
        };
        println!("  {} {:<16} {}", symbol, result.name, result.message);
        if let Some(fix) = &result.fix {
            println!("      {}", format!("fix: {}", fix).dimmed());
        }
        match result.status {
            CheckStatus::Warn => warns += 1,
            CheckStatus::Error => errors += 1,
            CheckStatus::Ok => {}
        }
    }

    println!("{}", format!("  {}", "-".repeat(50)).dimmed());
    if errors > 0 {
        println!("{}", format!("  {} error(s), {} warning(s)\n", errors, warns).red());
    } else if warns > 0 {
        println!("{}", format!("  {} warning(s)\n", warns).yellow());
    } else {
        println!("{}", "  All checks passed\n".green());
    }
    Ok(())
}
