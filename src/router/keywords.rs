//! Keyword index: the deterministic fallback for rule selection
//!
//! Two layers feed one matcher. A curated static table maps trigger words
//! (English plus Korean synonyms) to explicit `category/filename` lists.
//! On top of that, an optional disk scan derives triggers for rule files
//! the static table does not know about, so third-party files participate
//! in routing without manual curation. Static entries take precedence:
//! no triggers are derived for a filename that is already statically
//! mapped. Always-active files are never emitted by either layer.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// Curated trigger table. Multiple triggers may reference the same files;
/// a native-language synonym always sits next to its English counterpart.
const STATIC_TABLE: &[(&str, &[&str])] = &[
    ("commit", &["rules/commit.md", "commands/commit.md"]),
    ("커밋", &["rules/commit.md", "commands/commit.md"]),
    ("pr", &["rules/pr.md"]),
    ("pull request", &["rules/pr.md"]),
    ("풀리퀘", &["rules/pr.md"]),
    ("merge", &["rules/pr.md"]),
    ("머지", &["rules/pr.md"]),
    ("security", &["rules/security.md", "agents/security-rules.md"]),
    ("보안", &["rules/security.md", "agents/security-rules.md"]),
    (
        "review",
        &["commands/review.md", "skills/review.md", "agents/review-checklist.md"],
    ),
    (
        "리뷰",
        &["commands/review.md", "skills/review.md", "agents/review-checklist.md"],
    ),
    ("react", &["skills/react.md"]),
    ("리액트", &["skills/react.md"]),
    ("next", &["skills/nextjs.md"]),
    ("nextjs", &["skills/nextjs.md"]),
    ("typescript", &["rules/typescript.md"]),
    ("ts", &["rules/typescript.md"]),
    ("test", &["rules/testing.md", "commands/test.md"]),
    ("testing", &["rules/testing.md", "commands/test.md"]),
    ("테스트", &["rules/testing.md", "commands/test.md"]),
    ("error", &["rules/error-handling.md"]),
    ("exception", &["rules/error-handling.md"]),
    ("naming", &["rules/naming.md"]),
    ("python", &["skills/python.md"]),
    ("django", &["skills/python.md"]),
    ("fastapi", &["skills/python.md"]),
    ("go", &["skills/go.md"]),
    ("golang", &["skills/go.md"]),
    ("rust", &["skills/rust.md"]),
    ("cargo", &["skills/rust.md"]),
    ("docker", &["skills/docker.md"]),
    ("container", &["skills/docker.md"]),
    ("dockerfile", &["skills/docker.md"]),
    ("api", &["skills/api-design.md"]),
    ("rest", &["skills/api-design.md"]),
    ("endpoint", &["skills/api-design.md"]),
    ("vue", &["skills/vue.md"]),
    ("nuxt", &["skills/vue.md"]),
    ("svelte", &["skills/svelte.md"]),
    ("sveltekit", &["skills/svelte.md"]),
    ("refactor", &["commands/refactor.md"]),
    ("리팩토링", &["commands/refactor.md"]),
    ("debug", &["commands/debug.md", "contexts/debug.md"]),
    ("디버그", &["commands/debug.md", "contexts/debug.md"]),
    ("bug", &["commands/debug.md", "contexts/debug.md"]),
    ("code", &["agents/code-standards.md"]),
    ("코드", &["agents/code-standards.md"]),
    ("standard", &["agents/code-standards.md"]),
    ("dev", &["contexts/dev.md"]),
    ("개발", &["contexts/dev.md"]),
    ("develop", &["contexts/dev.md"]),
    ("research", &["contexts/research.md"]),
    ("리서치", &["contexts/research.md"]),
    ("조사", &["contexts/research.md"]),
    ("workflow", &["rules/development-workflow.md"]),
    ("워크플로우", &["rules/development-workflow.md"]),
    ("threshold", &["rules/code-thresholds.md"]),
    ("기준", &["rules/code-thresholds.md"]),
];

const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "not",
];

lazy_static! {
    static ref FRONTMATTER_DESC_RE: Regex =
        Regex::new(r"(?s)\A---\r?\n.*?description:[ \t]*(.+?)\r?\n.*?---").unwrap();
    static ref WORD_RE: Regex = Regex::new(r"[a-z]{3,}").unwrap();
}

/// Trigger-to-files index with case-insensitive substring matching
#[derive(Debug, Clone)]
pub struct KeywordIndex {
    /// Lower-cased trigger -> `category/filename` paths
    entries: IndexMap<String, BTreeSet<String>>,
    /// Filenames (relative to the rules category) covered by the static
    /// table or an earlier derivation; dynamic scanning skips these
    mapped_rule_files: BTreeSet<String>,
    /// Paths excluded from every match result
    always_active: BTreeSet<String>,
}

impl KeywordIndex {
    /// Build the index from the curated static table
    pub fn builtin(always_active: &[&str]) -> Self {
        let mut entries: IndexMap<String, BTreeSet<String>> = IndexMap::new();
        let mut mapped_rule_files = BTreeSet::new();

        for (trigger, files) in STATIC_TABLE {
            let set = entries.entry(trigger.to_lowercase()).or_default();
            for file in *files {
                set.insert((*file).to_string());
                if let Some(name) = file.strip_prefix("rules/") {
                    mapped_rule_files.insert(name.to_string());
                }
            }
        }

        Self {
            entries,
            mapped_rule_files,
            always_active: always_active.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// Derive triggers for markdown files found in the given directories
    /// (typically the active and inactive router splits). Files already
    /// covered by the static table, and always-active files, are skipped.
    pub fn augment_from_disk(&mut self, dirs: &[&Path]) {
        for dir in dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if !path.is_file() || !file_name.ends_with(".md") {
                    continue;
                }
                if self.mapped_rule_files.contains(&file_name) {
                    continue;
                }
                let rule_path = format!("rules/{}", file_name);
                if self.always_active.contains(&rule_path) {
                    continue;
                }

                let triggers = derive_triggers(&path, &file_name);
                if triggers.is_empty() {
                    continue;
                }
                self.mapped_rule_files.insert(file_name);
                for trigger in triggers {
                    self.entries
                        .entry(trigger)
                        .or_default()
                        .insert(rule_path.clone());
                }
            }
        }
    }

    /// All files selected by triggers occurring in the prompt, as a union.
    /// Matching is case-insensitive substring containment.
    pub fn matches(&self, prompt: &str) -> BTreeSet<String> {
        let lower = prompt.to_lowercase();
        let mut selected = BTreeSet::new();
        for (trigger, files) in &self.entries {
            if lower.contains(trigger.as_str()) {
                selected.extend(files.iter().cloned());
            }
        }
        selected
            .into_iter()
            .filter(|f| !self.always_active.contains(f))
            .collect()
    }

    /// Every file the index knows about (always-active excluded)
    pub fn known_files(&self) -> BTreeSet<String> {
        self.entries
            .values()
            .flatten()
            .filter(|f| !self.always_active.contains(f.as_str()))
            .cloned()
            .collect()
    }

    /// Filenames in the rules category the index can route (used as the
    /// reconciler's managed corpus)
    pub fn known_rule_names(&self) -> BTreeSet<String> {
        self.known_files()
            .iter()
            .filter_map(|f| f.strip_prefix("rules/").map(str::to_string))
            .collect()
    }
}

/// Triggers for a single file: the filename slug, its hyphen-split tokens
/// (3+ chars), and alphabetic words from the frontmatter description
/// (3+ chars, stop words removed)
fn derive_triggers(path: &Path, file_name: &str) -> Vec<String> {
    let mut triggers = Vec::new();
    let stem = file_name.trim_end_matches(".md").to_lowercase();
    triggers.push(stem.clone());
    if stem.contains('-') {
        for part in stem.split('-') {
            if part.len() > 2 && !triggers.contains(&part.to_string()) {
                triggers.push(part.to_string());
            }
        }
    }

    if let Ok(content) = fs::read_to_string(path) {
        let head: String = content.chars().take(500).collect();
        if let Some(desc) = FRONTMATTER_DESC_RE.captures(&head) {
            let desc = desc[1].to_lowercase();
            for word in WORD_RE.find_iter(&desc) {
                let word = word.as_str().to_string();
                if !STOP_WORDS.contains(&word.as_str()) && !triggers.contains(&word) {
                    triggers.push(word);
                }
            }
        }
    }

    triggers
}
