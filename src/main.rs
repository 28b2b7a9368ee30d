//! rulehub - rule file manager and semantic router for AI coding assistants

use clap::{Parser, Subcommand};
use colored::Colorize;
use rulehub::commands;
use rulehub::commands::{
    add::AddOptions, init::InitOptions, test::TestOptions, uninstall::UninstallOptions,
    update::UpdateOptions,
};
use rulehub::{HubError, Scope};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// rulehub: manage and route rule files for AI coding assistants
#[derive(Parser)]
#[command(name = "rulehub")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Set up a rulehub installation
    Init {
        /// Install into the home directory instead of the current project
        #[arg(long)]
        global: bool,
        /// Copy files instead of symlinking category directories
        #[arg(long)]
        copy: bool,
        /// Seed the config tree from an external rules repository
        #[arg(long)]
        rules: Option<String>,
    },
    /// Refresh sources and sync the installed config tree
    Update {
        /// Overwrite modified files and delete files removed upstream
        #[arg(long)]
        force: bool,
        /// Only add new files
        #[arg(long = "add-only")]
        add_only: bool,
        /// Choose per modified file
        #[arg(short, long)]
        interactive: bool,
    },
    /// List installed rules by category
    List,
    /// Add an external rule source
    Add {
        /// Repository URL (github.com/org/repo, https, or git@ form)
        source: String,
        /// Override the source name derived from the URL
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove an external rule source
    Remove { name: String },
    /// Preview which rules a prompt selects
    Test {
        prompt: String,
        /// Use keyword matching only
        #[arg(short, long)]
        keyword: bool,
    },
    /// Route a prompt and converge the active/inactive split (hook entry)
    Route { prompt: String },
    /// Remove installed directories
    Uninstall {
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
        /// Only the global installation
        #[arg(long)]
        global: bool,
        /// Only the project installation
        #[arg(long)]
        project: bool,
    },
    /// Check the installation and environment
    Doctor,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli.log_level) {
        eprintln!("{} {}", "error:".red(), e);
        std::process::exit(1);
    }

    let result = match cli.command {
        Commands::Init {
            global,
            copy,
            rules,
        } => {
            commands::init::run(InitOptions {
                scope: if global { Scope::Global } else { Scope::Project },
                rules_url: rules,
                copy,
            })
            .await
        }
        Commands::Update {
            force,
            add_only,
            interactive,
        } => {
            commands::update::run(UpdateOptions {
                force,
                add_only,
                interactive,
            })
            .await
        }
        Commands::List => commands::list::run().await,
        Commands::Add { source, name } => commands::add::run(source, AddOptions { name }).await,
        Commands::Remove { name } => commands::remove::run(name).await,
        Commands::Test { prompt, keyword } => {
            commands::test::run(
                prompt,
                TestOptions {
                    keyword_only: keyword,
                },
            )
            .await
        }
        Commands::Route { prompt } => commands::route::run(prompt).await,
        Commands::Uninstall {
            force,
            global,
            project,
        } => {
            commands::uninstall::run(UninstallOptions {
                force,
                global,
                project,
            })
            .await
        }
        Commands::Doctor => commands::doctor::run().await,
    };

    if let Err(e) = result {
        eprintln!("\n{} {}\n", "error:".red(), e);
        std::process::exit(1);
    }
}

/// Initialize tracing from the CLI flag (RUST_LOG overrides it)
fn init_logging(log_level: &str) -> Result<(), HubError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .map_err(|e| HubError::unknown(format!("Invalid log level: {}", e)))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| HubError::unknown(format!("Failed to set logger: {}", e)))?;
    Ok(())
}
