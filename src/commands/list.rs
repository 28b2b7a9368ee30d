//! `rulehub list` - show installed rules by category with router status

use crate::corpus::{scan_config_dir, Category};
use crate::meta::InstallMeta;
use crate::utils::text::truncate;
use crate::{Install, Result, RouterConfig};
use colored::Colorize;

pub async fn run() -> Result<()> {
    let Some(install) = Install::detect() else {
        println!("\n  {} - no installation found\n", crate::APP_NAME);
        println!("  Run \"rulehub init\" to get started.\n");
        return Ok(());
    };

    println!("\n  {} - installed rules\n", crate::APP_NAME.bold());
    println!("{}", format!("  {}", "-".repeat(48)).dimmed());

    if let Ok(meta) = InstallMeta::load(&install.meta_path()) {
        println!("  Scope:   {}", install.scope.label());
        println!("  Mode:    {}", meta.mode);
        let sources: Vec<String> = meta
            .sources
            .iter()
            .map(|s| match &s.url {
                Some(url) => format!("{} ({})", s.name, url),
                None => s.name.clone(),
            })
            .collect();
        println!("  Sources: {}", sources.join(", "));
    }

    let files = scan_config_dir(&install.config_dir());
    let mut total = 0usize;
    let mut categories_seen = 0usize;

    for category in Category::ALL {
        let in_category: Vec<_> = files.iter().filter(|f| f.category == category).collect();
        if in_category.is_empty() {
            continue;
        }
        categories_seen += 1;
        println!(
            "\n  {} {}",
            format!("{}/", category.dir_name()).bold(),
            format!("({})", category.label()).dimmed()
        );
        for file in in_category {
            total += 1;
            if file.description.is_empty() || file.description == file.name {
                println!("    {}", file.file);
            } else {
                println!(
                    "    {}{}",
                    file.file,
                    format!(" - {}", truncate(&file.description, 50)).dimmed()
                );
            }
        }
    }

    println!("\n{}", format!("  {}", "-".repeat(48)).dimmed());
    println!("  {} files across {} categories", total, categories_seen);

    let config = RouterConfig::load(Some(&install.config_file_path()))?;
    match (&config.anthropic_api_key, &config.openai_api_key) {
        (Some(_), _) => println!("{}", "  Semantic router: AI routing (anthropic)".green()),
        (None, Some(_)) => println!("{}", "  Semantic router: AI routing (openai)".green()),
        (None, None) => println!(
            "{}",
            "  Semantic router: keyword fallback (no API key)".yellow()
        ),
    }
    if config.has_credential() && !config.semantic_enabled {
        println!(
            "{}",
            "  (set SEMANTIC_ROUTER_ENABLED=true to enable AI routing)".dimmed()
        );
    }

    println!(
        "{}",
        "\n  Tip: rulehub test <prompt>  to preview rule selection\n".dimmed()
    );
    Ok(())
}
