//! RuleHub - rule file manager and semantic router for AI coding assistants
//!
//! This library provides the core functionality for managing markdown rule
//! files across AI assistant configuration directories: scanning the rule
//! corpus, routing a user prompt to the relevant subset (via an LLM call or
//! keyword fallback), reconciling the active/inactive split on disk, and
//! diffing installed config trees against their source of truth.

pub mod commands;
pub mod config;
pub mod corpus;
pub mod llm;
pub mod meta;
pub mod router;
pub mod sync;
pub mod utils;

// Re-export commonly used types
pub use config::{Install, ProviderKind, RouterConfig, Scope, SplitPaths};
pub use corpus::{scan_config_dir, Category, RuleFile};
pub use llm::{SelectorError, SelectorProvider, SemanticSelector};
pub use meta::{InstallMeta, InstallMode, MetaSource, SourceKind};
pub use router::{Router, SelectionMethod, SelectionResult};
pub use sync::{compare_trees, scan_tree, DiffResult, Snapshot};
pub use utils::errors::{ConfigError, HubError};

/// The main result type used throughout the application
pub type Result<T> = std::result::Result<T, HubError>;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = "rulehub";
