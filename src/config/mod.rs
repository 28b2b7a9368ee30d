//! Router configuration and installation discovery
//!
//! Settings are resolved in three layers: built-in defaults, an optional
//! `config.toml` in the installation root, and finally the process
//! environment. The resolved [`RouterConfig`] is passed explicitly into the
//! router and the selector adapters so tests can inject credentials and
//! flags without touching global environment state.

use crate::utils::errors::ConfigError;
use crate::Result;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the per-target installation directory
pub const INSTALL_DIR: &str = ".rulehub";

/// Optional settings file inside the installation root
pub const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The selector providers the router knows how to call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Anthropic,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::OpenAi => "openai",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" | "claude" => Some(ProviderKind::Anthropic),
            "openai" => Some(ProviderKind::OpenAi),
            _ => None,
        }
    }
}

/// Settings consumed by the router and the selector adapters
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Semantic routing is opt-in: it only runs when this is set to true
    /// (via `[router] enabled` or `SEMANTIC_ROUTER_ENABLED=true`)
    pub semantic_enabled: bool,
    /// Providers in the order they are tried
    pub provider_priority: Vec<ProviderKind>,
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_model: String,
    pub openai_model: String,
    /// Budget for each outbound provider request
    pub request_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            semantic_enabled: false,
            provider_priority: vec![ProviderKind::Anthropic, ProviderKind::OpenAi],
            anthropic_api_key: None,
            openai_api_key: None,
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Shape of the optional `config.toml`
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    router: Option<RouterSection>,
}

#[derive(Debug, Default, Deserialize)]
struct RouterSection {
    enabled: Option<bool>,
    providers: Option<Vec<String>>,
    anthropic_model: Option<String>,
    openai_model: Option<String>,
    timeout_secs: Option<u64>,
}

impl RouterConfig {
    /// Resolve settings from defaults, an optional config file, and the
    /// process environment (in that order)
    pub fn load<P: AsRef<Path>>(config_file: Option<P>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = config_file {
            let path = path.as_ref();
            if path.exists() {
                let content =
                    fs::read_to_string(path).map_err(|e| ConfigError::ReadError { source: e })?;
                let file: FileConfig =
                    toml::from_str(&content).map_err(|e| ConfigError::ParseError { source: e })?;
                config.apply_file(file);
            }
        }
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Resolve settings from defaults and the process environment only
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn apply_file(&mut self, file: FileConfig) {
        let Some(router) = file.router else {
            return;
        };
        if let Some(enabled) = router.enabled {
            self.semantic_enabled = enabled;
        }
        if let Some(providers) = router.providers {
            let parsed: Vec<ProviderKind> = providers
                .iter()
                .filter_map(|name| {
                    let kind = ProviderKind::parse(name);
                    if kind.is_none() {
                        tracing::warn!("ignoring unknown provider in config: {}", name);
                    }
                    kind
                })
                .collect();
            if !parsed.is_empty() {
                self.provider_priority = parsed;
            }
        }
        if let Some(model) = router.anthropic_model {
            self.anthropic_model = model;
        }
        if let Some(model) = router.openai_model {
            self.openai_model = model;
        }
        if let Some(secs) = router.timeout_secs {
            self.request_timeout = Duration::from_secs(secs);
        }
    }

    /// Overlay environment variables onto the current settings. The lookup
    /// is injected so tests can supply a fake environment.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, get: F) {
        if let Some(value) = get("SEMANTIC_ROUTER_ENABLED") {
            self.semantic_enabled = value == "true";
        }
        if let Some(key) = get("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
            self.anthropic_api_key = Some(key);
        }
        if let Some(key) = get("OPENAI_API_KEY").filter(|k| !k.is_empty()) {
            self.openai_api_key = Some(key);
        }
        if let Some(model) = get("ANTHROPIC_MODEL") {
            self.anthropic_model = model;
        }
        if let Some(model) = get("OPENAI_MODEL") {
            self.openai_model = model;
        }
    }

    /// True when at least one provider credential is present
    pub fn has_credential(&self) -> bool {
        self.anthropic_api_key.is_some() || self.openai_api_key.is_some()
    }
}

/// Installation scope: a project-local tree or the user's home directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Project,
    Global,
}

impl Scope {
    pub fn label(&self) -> &'static str {
        match self {
            Scope::Project => "project",
            Scope::Global => "global",
        }
    }
}

/// A discovered (or target) rulehub installation
#[derive(Debug, Clone)]
pub struct Install {
    pub root: PathBuf,
    pub scope: Scope,
}

impl Install {
    /// The installation root for a scope, whether or not it exists yet
    pub fn for_scope(scope: Scope) -> Result<Self> {
        let base = match scope {
            Scope::Project => {
                std::env::current_dir().map_err(|e| ConfigError::ReadError { source: e })?
            }
            Scope::Global => dirs::home_dir()
                .ok_or_else(|| crate::HubError::unknown("could not resolve home directory"))?,
        };
        Ok(Self {
            root: base.join(INSTALL_DIR),
            scope,
        })
    }

    /// Locate an existing installation: project first, then global
    pub fn detect() -> Option<Self> {
        if let Ok(install) = Self::for_scope(Scope::Project) {
            if install.root.exists() {
                return Some(install);
            }
        }
        if let Ok(install) = Self::for_scope(Scope::Global) {
            if install.root.exists() {
                return Some(install);
            }
        }
        None
    }

    /// Source-of-truth config tree (`<root>/config`)
    pub fn config_dir(&self) -> PathBuf {
        self.root.join("config")
    }

    /// Checkouts of external rule sources
    pub fn sources_dir(&self) -> PathBuf {
        self.root.join("sources")
    }

    pub fn meta_path(&self) -> PathBuf {
        self.root.join(crate::meta::META_FILE)
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    /// Directory the assistant config is installed into (`.claude` sibling)
    pub fn target_dir(&self) -> PathBuf {
        self.root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.root.clone())
    }

    pub fn claude_dir(&self) -> PathBuf {
        self.target_dir().join(".claude")
    }
}

/// The active/inactive directory pair managed by the reconciler
#[derive(Debug, Clone)]
pub struct SplitPaths {
    pub active: PathBuf,
    pub inactive: PathBuf,
}

impl SplitPaths {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(active: P, inactive: Q) -> Self {
        Self {
            active: active.into(),
            inactive: inactive.into(),
        }
    }

    /// The split for an assistant config directory: `rules/` holds active
    /// files, `rules-inactive/` holds parked ones
    pub fn for_claude_dir(claude_dir: &Path) -> Self {
        Self {
            active: claude_dir.join("rules"),
            inactive: claude_dir.join("rules-inactive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::default();
        assert!(!config.semantic_enabled);
        assert_eq!(
            config.provider_priority,
            vec![ProviderKind::Anthropic, ProviderKind::OpenAi]
        );
        assert_eq!(config.anthropic_model, DEFAULT_ANTHROPIC_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(!config.has_credential());
    }

    #[test]
    fn test_apply_env_overlay() {
        let mut env = HashMap::new();
        env.insert("SEMANTIC_ROUTER_ENABLED", "true");
        env.insert("OPENAI_API_KEY", "sk-test");
        env.insert("OPENAI_MODEL", "gpt-4o");

        let mut config = RouterConfig::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()));

        assert!(config.semantic_enabled);
        assert_eq!(config.openai_api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.openai_model, "gpt-4o");
        assert!(config.anthropic_api_key.is_none());
        assert!(config.has_credential());
    }

    #[test]
    fn test_enable_flag_is_opt_in() {
        let mut config = RouterConfig::default();
        config.apply_env(|key| {
            (key == "SEMANTIC_ROUTER_ENABLED").then(|| "1".to_string())
        });
        // anything but the literal "true" leaves routing disabled
        assert!(!config.semantic_enabled);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(CONFIG_FILE);
        std::fs::write(
            &path,
            r#"
[router]
enabled = true
providers = ["openai", "anthropic"]
openai_model = "gpt-4.1-mini"
timeout_secs = 3
"#,
        )
        .unwrap();

        let mut config = RouterConfig::default();
        let content = std::fs::read_to_string(&path).unwrap();
        let file: FileConfig = toml::from_str(&content).unwrap();
        config.apply_file(file);

        assert!(config.semantic_enabled);
        assert_eq!(
            config.provider_priority,
            vec![ProviderKind::OpenAi, ProviderKind::Anthropic]
        );
        assert_eq!(config.openai_model, "gpt-4.1-mini");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_unknown_providers_ignored() {
        let file: FileConfig = toml::from_str(
            r#"
[router]
providers = ["mystery", "openai"]
"#,
        )
        .unwrap();
        let mut config = RouterConfig::default();
        config.apply_file(file);
        assert_eq!(config.provider_priority, vec![ProviderKind::OpenAi]);
    }

    #[test]
    fn test_split_paths_for_claude_dir() {
        let split = SplitPaths::for_claude_dir(Path::new("/home/u/.claude"));
        assert!(split.active.ends_with("rules"));
        assert!(split.inactive.ends_with("rules-inactive"));
    }
}
