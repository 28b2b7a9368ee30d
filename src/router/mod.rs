//! Router decision engine
//!
//! Per invocation the router derives everything from scratch: it builds
//! the keyword index (static table plus triggers derived from the files
//! on disk), enumerates the universe of available files, and settles on a
//! desired active set. AI selection runs first when it is enabled and a
//! credential exists; every failure on that path silently degrades to
//! keyword matching. The always-active subset is part of every decision.

use crate::config::{RouterConfig, SplitPaths};
use crate::llm::SemanticSelector;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

pub mod keywords;
pub mod reconcile;

pub use keywords::KeywordIndex;
pub use reconcile::{ReconcileReport, Reconciler};

/// Rule files that stay active no matter what the router decides
pub const ALWAYS_ACTIVE: [&str; 2] = ["rules/essential.md", "rules/security.md"];

/// How a selection was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMethod {
    Semantic,
    Keyword,
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionMethod::Semantic => f.write_str("semantic"),
            SelectionMethod::Keyword => f.write_str("keyword"),
        }
    }
}

/// Outcome of a routing decision
#[derive(Debug, Clone)]
pub struct SelectionResult {
    /// Desired active files as `category/filename` paths
    pub files: BTreeSet<String>,
    pub method: SelectionMethod,
}

/// The router: keyword index + selector chain + the managed split
pub struct Router {
    config: RouterConfig,
    selector: SemanticSelector,
    index: KeywordIndex,
    split: SplitPaths,
}

impl Router {
    /// Build a router for a split, deriving the selector chain from config
    /// and augmenting the keyword index from the files on disk
    pub fn new(config: RouterConfig, split: SplitPaths) -> Self {
        let selector = SemanticSelector::from_config(&config);
        Self::with_selector(config, split, selector)
    }

    /// Build a router with an explicit selector (used by tests)
    pub fn with_selector(config: RouterConfig, split: SplitPaths, selector: SemanticSelector) -> Self {
        let mut index = KeywordIndex::builtin(&ALWAYS_ACTIVE);
        index.augment_from_disk(&[split.active.as_path(), split.inactive.as_path()]);
        Self {
            config,
            selector,
            index,
            split,
        }
    }

    pub fn keyword_index(&self) -> &KeywordIndex {
        &self.index
    }

    /// Whether AI selection would be attempted for this router
    pub fn semantic_available(&self) -> bool {
        self.config.semantic_enabled && self.selector.has_credential()
    }

    /// The universe of selectable files: everything currently in either
    /// split directory plus everything the keyword index knows about
    pub fn available_files(&self) -> Vec<String> {
        let mut available = BTreeSet::new();
        for dir in [&self.split.active, &self.split.inactive] {
            for name in markdown_names(dir) {
                available.insert(format!("rules/{}", name));
            }
        }
        available.extend(self.index.known_files());
        available.into_iter().collect()
    }

    /// Decide the desired active set for a prompt. Never fails: the AI
    /// path degrades to keyword matching on any error.
    pub async fn select(&self, prompt: &str) -> SelectionResult {
        let mut desired: BTreeSet<String> =
            ALWAYS_ACTIVE.iter().map(|p| (*p).to_string()).collect();

        if self.semantic_available() {
            let available = self.available_files();
            if let Some(files) = self.selector.try_select(prompt, &available).await {
                desired.extend(files.into_iter().map(normalize_path));
                return SelectionResult {
                    files: desired,
                    method: SelectionMethod::Semantic,
                };
            }
            tracing::warn!("semantic selection unavailable, falling back to keywords");
        }

        desired.extend(self.index.matches(prompt));
        SelectionResult {
            files: desired,
            method: SelectionMethod::Keyword,
        }
    }

    /// Decide and converge: run selection, then reconcile the split
    pub async fn route(&self, prompt: &str) -> crate::Result<(SelectionResult, ReconcileReport)> {
        let selection = self.select(prompt).await;

        let desired = rule_names(&selection.files);
        let mut corpus = self.index.known_rule_names();
        let always: BTreeSet<String> = rule_names(
            &ALWAYS_ACTIVE
                .iter()
                .map(|p| (*p).to_string())
                .collect::<BTreeSet<_>>(),
        );
        // always-active files are managed too, so pass 2 can pull them
        // back out of the inactive directory
        corpus.extend(always.iter().cloned());

        let reconciler = Reconciler::new(self.split.clone());
        let report = reconciler.reconcile(&desired, &corpus, &always)?;
        Ok((selection, report))
    }
}

/// Providers sometimes answer with bare filenames; those belong to the
/// routed rules category
fn normalize_path(file: String) -> String {
    if file.contains('/') {
        file
    } else {
        format!("rules/{}", file)
    }
}

/// Project `category/filename` paths onto filenames within the split
/// (only the rules category is physically reconciled)
fn rule_names(paths: &BTreeSet<String>) -> BTreeSet<String> {
    paths
        .iter()
        .filter_map(|p| p.strip_prefix("rules/"))
        .filter(|name| !name.contains('/'))
        .map(str::to_string)
        .collect()
}

fn markdown_names(dir: &Path) -> Vec<String> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .flatten()
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".md"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled_config() -> RouterConfig {
        RouterConfig::default()
    }

    fn temp_split() -> (tempfile::TempDir, SplitPaths) {
        let tmp = tempfile::tempdir().unwrap();
        let split = SplitPaths::new(tmp.path().join("rules"), tmp.path().join("rules-inactive"));
        std::fs::create_dir_all(&split.active).unwrap();
        std::fs::create_dir_all(&split.inactive).unwrap();
        (tmp, split)
    }

    #[tokio::test]
    async fn test_keyword_selection_for_commit_prompt() {
        let (_tmp, split) = temp_split();
        let router = Router::new(disabled_config(), split);

        let result = router.select("write a commit message").await;
        assert_eq!(result.method, SelectionMethod::Keyword);
        assert!(result.files.contains("rules/commit.md"));
        assert!(result.files.contains("commands/commit.md"));
        assert!(result.files.contains("rules/essential.md"));
        assert!(result.files.contains("rules/security.md"));
    }

    #[tokio::test]
    async fn test_unmatched_prompt_keeps_only_always_active() {
        let (_tmp, split) = temp_split();
        let router = Router::new(disabled_config(), split);

        let result = router.select("hello world").await;
        assert_eq!(result.method, SelectionMethod::Keyword);
        let expected: BTreeSet<String> =
            ALWAYS_ACTIVE.iter().map(|p| (*p).to_string()).collect();
        assert_eq!(result.files, expected);
    }

    #[tokio::test]
    async fn test_korean_prompt_matches_english_equivalent() {
        let (_tmp, split) = temp_split();
        let router = Router::new(disabled_config(), split.clone());
        let korean = router.select("커밋 메시지 작성해줘").await;
        let english = router.select("write a commit message").await;
        assert_eq!(korean.files, english.files);
    }

    #[tokio::test]
    async fn test_semantic_failure_falls_back_to_keyword() {
        let (_tmp, split) = temp_split();
        let mut config = disabled_config();
        config.semantic_enabled = true;
        config.anthropic_api_key = Some("test-key".to_string());
        config.request_timeout = std::time::Duration::from_secs(2);

        let provider = crate::llm::AnthropicSelector::new(
            Some("test-key".to_string()),
            "claude-3-haiku-20240307",
            std::time::Duration::from_secs(2),
        )
        .with_base_url("http://127.0.0.1:9");
        let selector = SemanticSelector::with_providers(vec![Box::new(provider)]);

        let router = Router::with_selector(config, split, selector);
        assert!(router.semantic_available());

        let result = router.select("write a commit message").await;
        assert_eq!(result.method, SelectionMethod::Keyword);
        assert!(result.files.contains("rules/commit.md"));
    }

    #[tokio::test]
    async fn test_route_reconciles_split() {
        let (_tmp, split) = temp_split();
        std::fs::write(split.active.join("react.md"), "# React\n").unwrap();
        std::fs::write(
            split.inactive.join("testing.md"),
            "---\ndescription: Testing conventions\n---\n",
        )
        .unwrap();
        std::fs::write(split.active.join("essential.md"), "# Essential\n").unwrap();

        let router = Router::new(disabled_config(), split.clone());
        let (selection, report) = router.route("add a unit test").await.unwrap();

        assert_eq!(selection.method, SelectionMethod::Keyword);
        // testing.md is desired and parked -> activated; react.md is
        // managed but undesired -> deactivated; essential.md stays put
        assert!(report.activated.contains(&"testing.md".to_string()));
        assert!(report.deactivated.contains(&"react.md".to_string()));
        assert!(split.active.join("testing.md").exists());
        assert!(split.inactive.join("react.md").exists());
        assert!(split.active.join("essential.md").exists());
    }

    #[tokio::test]
    async fn test_route_is_idempotent() {
        let (_tmp, split) = temp_split();
        std::fs::write(split.active.join("react.md"), "# React\n").unwrap();
        std::fs::write(split.inactive.join("testing.md"), "# Testing\n").unwrap();

        let router = Router::new(disabled_config(), split.clone());
        router.route("add a unit test").await.unwrap();

        // rebuild so the index reflects the converged layout
        let router = Router::new(disabled_config(), split);
        let (_, report) = router.route("add a unit test").await.unwrap();
        assert!(report.is_converged());
    }

    #[test]
    fn test_available_files_unions_disk_and_index() {
        let (_tmp, split) = temp_split();
        std::fs::write(split.active.join("custom-thing.md"), "# Custom\n").unwrap();
        let router = Router::new(disabled_config(), split);

        let available = router.available_files();
        assert!(available.contains(&"rules/custom-thing.md".to_string()));
        assert!(available.contains(&"rules/commit.md".to_string()));
    }

    #[test]
    fn test_normalize_path_prefixes_bare_names() {
        assert_eq!(normalize_path("react.md".into()), "rules/react.md");
        assert_eq!(normalize_path("skills/go.md".into()), "skills/go.md");
    }
}
