//! Selector providers for semantic routing
//!
//! Each provider turns a user prompt plus the list of available rule files
//! into a filename selection by calling an external text-generation API.
//! The chain is fail-soft: any network error, bad status, or unparseable
//! response degrades to `None`, and the router falls back to keyword
//! matching.

use crate::config::{ProviderKind, RouterConfig};
use async_trait::async_trait;
use thiserror::Error;

pub mod anthropic;
pub mod openai;

pub use anthropic::AnthropicSelector;
pub use openai::OpenAiSelector;

/// Error types for selector operations. These never escape
/// [`SemanticSelector::try_select`]; they exist for logging and tests.
#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Missing API credential for {provider}")]
    MissingCredential { provider: &'static str },

    #[error("Request failed: {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Invalid response format: {message}")]
    InvalidResponse { message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single text-generation backend that can select rule files
#[async_trait]
pub trait SelectorProvider: Send + Sync {
    /// Provider name used in logs and status output
    fn provider_name(&self) -> &'static str;

    /// Whether an API credential is configured for this provider
    fn has_credential(&self) -> bool;

    /// Ask the provider to pick relevant files from `available`
    async fn select_files(
        &self,
        prompt: &str,
        available: &[String],
    ) -> Result<Vec<String>, SelectorError>;
}

/// Instruction message shared by all providers. Embeds the available file
/// list and demands a bare JSON array answer.
pub fn selection_instruction(available: &[String]) -> String {
    format!(
        "You are a semantic router for a coding assistant. Your job is to select the most \
         relevant rule files for a given user prompt.\n\
         Available files: {}\n\
         Return ONLY a JSON array of filenames that should be active. Do not include any \
         explanation.\n\
         Example: [\"rules/commit.md\", \"commands/commit.md\"]\n\
         If no files are needed, return an empty array: []",
        available.join(", ")
    )
}

/// Pull a filename array out of free-form model output: parse the whole
/// text as JSON first (unwrapping a `files` field if the provider returned
/// an object), then fall back to the first `[...]` substring.
pub fn parse_selection(raw: &str) -> Option<Vec<String>> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw.trim()) {
        if let Some(items) = value.as_array() {
            return collect_strings(items);
        }
        if let Some(items) = value.get("files").and_then(|f| f.as_array()) {
            return collect_strings(items);
        }
    }
    extract_file_array(raw)
}

/// Locate the first bracketed substring and JSON-decode it
pub fn extract_file_array(raw: &str) -> Option<Vec<String>> {
    let start = raw.find('[')?;
    let end = raw[start..].find(']')? + start;
    serde_json::from_str(&raw[start..=end]).ok()
}

fn collect_strings(items: &[serde_json::Value]) -> Option<Vec<String>> {
    Some(
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

/// Tries providers in priority order until one returns a usable selection
pub struct SemanticSelector {
    providers: Vec<Box<dyn SelectorProvider>>,
}

impl SemanticSelector {
    /// Build the provider chain from resolved configuration
    pub fn from_config(config: &RouterConfig) -> Self {
        let providers = config
            .provider_priority
            .iter()
            .map(|kind| -> Box<dyn SelectorProvider> {
                match kind {
                    ProviderKind::Anthropic => Box::new(AnthropicSelector::new(
                        config.anthropic_api_key.clone(),
                        config.anthropic_model.clone(),
                        config.request_timeout,
                    )),
                    ProviderKind::OpenAi => Box::new(OpenAiSelector::new(
                        config.openai_api_key.clone(),
                        config.openai_model.clone(),
                        config.request_timeout,
                    )),
                }
            })
            .collect();
        Self { providers }
    }

    /// Build a selector from explicit providers (used by tests)
    pub fn with_providers(providers: Vec<Box<dyn SelectorProvider>>) -> Self {
        Self { providers }
    }

    /// True when at least one provider in the chain has a credential
    pub fn has_credential(&self) -> bool {
        self.providers.iter().any(|p| p.has_credential())
    }

    /// Attempt AI selection. Resolves to `None` on every failure path:
    /// missing credentials, network errors, bad statuses, malformed JSON.
    pub async fn try_select(&self, prompt: &str, available: &[String]) -> Option<Vec<String>> {
        for provider in &self.providers {
            if !provider.has_credential() {
                tracing::debug!("skipping {}: no credential", provider.provider_name());
                continue;
            }
            match provider.select_files(prompt, available).await {
                Ok(files) => {
                    tracing::debug!(
                        "{} selected {} file(s)",
                        provider.provider_name(),
                        files.len()
                    );
                    return Some(files);
                }
                Err(e) => {
                    tracing::warn!("{} selection failed: {}", provider.provider_name(), e);
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_array() {
        let files = parse_selection(r#"["rules/commit.md", "commands/commit.md"]"#).unwrap();
        assert_eq!(files, vec!["rules/commit.md", "commands/commit.md"]);
    }

    #[test]
    fn test_parse_array_embedded_in_prose() {
        let raw = "Sure! Here are the files:\n[\"rules/pr.md\"]\nLet me know.";
        assert_eq!(parse_selection(raw).unwrap(), vec!["rules/pr.md"]);
    }

    #[test]
    fn test_parse_object_with_files_field() {
        let raw = r#"{"files": ["skills/react.md"]}"#;
        assert_eq!(parse_selection(raw).unwrap(), vec!["skills/react.md"]);
    }

    #[test]
    fn test_parse_empty_array() {
        assert_eq!(parse_selection("[]").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_parse_garbage_yields_none() {
        assert!(parse_selection("no brackets here").is_none());
        assert!(parse_selection("[not json").is_none());
    }

    #[test]
    fn test_extract_first_bracket_pair() {
        let raw = r#"["a.md"] trailing ["b.md"]"#;
        assert_eq!(extract_file_array(raw).unwrap(), vec!["a.md"]);
    }

    #[test]
    fn test_instruction_embeds_available_files() {
        let available = vec!["rules/commit.md".to_string(), "skills/go.md".to_string()];
        let instruction = selection_instruction(&available);
        assert!(instruction.contains("rules/commit.md, skills/go.md"));
        assert!(instruction.contains("JSON array"));
    }

    #[tokio::test]
    async fn test_try_select_skips_uncredentialed_providers() {
        let selector = SemanticSelector::with_providers(vec![
            Box::new(AnthropicSelector::new(
                None,
                "claude-3-haiku-20240307",
                std::time::Duration::from_secs(1),
            )),
            Box::new(OpenAiSelector::new(
                None,
                "gpt-4o-mini",
                std::time::Duration::from_secs(1),
            )),
        ]);
        assert!(!selector.has_credential());
        assert!(selector.try_select("commit", &[]).await.is_none());
    }

    #[tokio::test]
    async fn test_try_select_fail_soft_on_unreachable_endpoint() {
        // nothing listens on this port; the request errors immediately and
        // the selector must resolve to None instead of propagating
        let provider = AnthropicSelector::new(
            Some("test-key".to_string()),
            "claude-3-haiku-20240307",
            std::time::Duration::from_secs(2),
        )
        .with_base_url("http://127.0.0.1:9");
        let selector = SemanticSelector::with_providers(vec![Box::new(provider)]);
        assert!(selector.has_credential());
        assert!(selector.try_select("commit", &[]).await.is_none());
    }
}
