//! Rule file corpus: categories, metadata extraction, and directory scanning

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

/// The fixed set of category directories in a config tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Rules,
    Commands,
    Skills,
    Agents,
    Contexts,
    Hooks,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Rules,
        Category::Commands,
        Category::Skills,
        Category::Agents,
        Category::Contexts,
        Category::Hooks,
    ];

    /// Directory name under the config tree
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Rules => "rules",
            Category::Commands => "commands",
            Category::Skills => "skills",
            Category::Agents => "agents",
            Category::Contexts => "contexts",
            Category::Hooks => "hooks",
        }
    }

    /// Human-readable label for listings
    pub fn label(&self) -> &'static str {
        match self {
            Category::Rules => "Coding Rules",
            Category::Commands => "Slash Commands",
            Category::Skills => "AI Skills",
            Category::Agents => "Sub-Agents",
            Category::Contexts => "Contexts",
            Category::Hooks => "Router Hooks",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Category::ALL.iter().copied().find(|c| c.dir_name() == s)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A scanned rule file with its extracted metadata
#[derive(Debug, Clone)]
pub struct RuleFile {
    pub category: Category,
    /// Filename relative to the category directory; may contain one
    /// subdirectory level (`vendor/file.md`)
    pub file: String,
    pub name: String,
    pub description: String,
    /// Explicit keywords from frontmatter, if any
    pub keywords: Vec<String>,
}

impl RuleFile {
    /// The `category/filename` path used throughout the router
    pub fn path(&self) -> String {
        format!("{}/{}", self.category.dir_name(), self.file)
    }
}

lazy_static! {
    static ref FRONTMATTER_RE: Regex = Regex::new(r"(?s)\A---\r?\n(.*?)\r?\n---").unwrap();
    static ref DESCRIPTION_RE: Regex =
        Regex::new(r#"(?m)^description:\s*["']?(.+?)["']?\s*$"#).unwrap();
    static ref NAME_RE: Regex = Regex::new(r#"(?m)^(?:name|title):\s*["']?(.+?)["']?\s*$"#).unwrap();
    static ref KEYWORDS_RE: Regex = Regex::new(r"(?m)^keywords:\s*\[([^\]]*)\]").unwrap();
}

#[derive(Debug, Default)]
struct FileMeta {
    name: Option<String>,
    description: Option<String>,
    keywords: Vec<String>,
}

/// Extract name/description/keywords from a file's frontmatter, falling
/// back to the first `#` heading. Read errors yield empty metadata; the
/// caller substitutes the filename.
fn parse_file_meta(path: &Path) -> FileMeta {
    let Ok(content) = fs::read_to_string(path) else {
        return FileMeta::default();
    };

    let mut meta = FileMeta::default();
    if let Some(fm) = FRONTMATTER_RE.captures(&content) {
        let block = fm.get(1).map(|m| m.as_str()).unwrap_or_default();
        meta.name = NAME_RE
            .captures(block)
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty());
        meta.description = DESCRIPTION_RE
            .captures(block)
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty());
        if let Some(kw) = KEYWORDS_RE.captures(block) {
            meta.keywords = kw[1]
                .split(',')
                .map(|k| k.trim().trim_matches(|c| c == '\'' || c == '"').to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
    }

    // fall back to the first markdown heading
    if meta.name.is_none() || meta.description.is_none() {
        let heading = content
            .lines()
            .find(|l| l.starts_with('#'))
            .map(|l| l.trim_start_matches('#').trim().to_string())
            .filter(|s| !s.is_empty());
        if meta.name.is_none() {
            meta.name = heading.clone();
        }
        if meta.description.is_none() {
            meta.description = heading;
        }
    }

    meta
}

fn file_stem(file_name: &str) -> String {
    file_name.trim_end_matches(".md").to_string()
}

fn push_rule_file(out: &mut Vec<RuleFile>, path: &Path, category: Category, file: String) {
    let meta = parse_file_meta(path);
    let stem = file_stem(
        file.rsplit('/')
            .next()
            .unwrap_or(file.as_str()),
    );
    out.push(RuleFile {
        category,
        file,
        name: meta.name.unwrap_or_else(|| stem.clone()),
        description: meta.description.unwrap_or(stem),
        keywords: meta.keywords,
    });
}

/// Scan one category directory, including a single level of nested
/// subdirectories whose entries get `subdir/file.md` composite names
fn scan_category_dir(dir: &Path, category: Category, out: &mut Vec<RuleFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Some(entry_name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if path.is_dir() {
            let Ok(sub_entries) = fs::read_dir(&path) else {
                continue;
            };
            for sub in sub_entries.flatten() {
                let sub_path = sub.path();
                let Some(sub_name) = sub.file_name().to_str().map(str::to_string) else {
                    continue;
                };
                if sub_path.is_file() && sub_name.ends_with(".md") {
                    push_rule_file(
                        out,
                        &sub_path,
                        category,
                        format!("{}/{}", entry_name, sub_name),
                    );
                }
            }
        } else if entry_name.ends_with(".md") {
            push_rule_file(out, &path, category, entry_name);
        }
    }
}

/// Scan all category directories under a config tree. Missing categories
/// are skipped; result ordering is not guaranteed.
pub fn scan_config_dir(config_dir: &Path) -> Vec<RuleFile> {
    let mut files = Vec::new();
    for category in Category::ALL {
        let dir = config_dir.join(category.dir_name());
        if dir.is_dir() {
            scan_category_dir(&dir, category, &mut files);
        }
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_frontmatter_description_and_keywords() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "rules/commit.md",
            "---\ndescription: Commit message conventions\nkeywords: [commit, 'message', \"convention\"]\n---\n\n# Commit\n",
        );

        let files = scan_config_dir(tmp.path());
        assert_eq!(files.len(), 1);
        let file = &files[0];
        assert_eq!(file.category, Category::Rules);
        assert_eq!(file.file, "commit.md");
        assert_eq!(file.path(), "rules/commit.md");
        assert_eq!(file.description, "Commit message conventions");
        assert_eq!(file.keywords, vec!["commit", "message", "convention"]);
    }

    #[test]
    fn test_heading_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "skills/react.md", "# React Component Patterns\n\nbody\n");

        let files = scan_config_dir(tmp.path());
        assert_eq!(files[0].name, "React Component Patterns");
        assert_eq!(files[0].description, "React Component Patterns");
        assert!(files[0].keywords.is_empty());
    }

    #[test]
    fn test_filename_fallback() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "contexts/dev.md", "just prose, no heading\n");

        let files = scan_config_dir(tmp.path());
        assert_eq!(files[0].name, "dev");
        assert_eq!(files[0].description, "dev");
    }

    #[test]
    fn test_nested_subdirectory_composite_names() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "rules/vendor/style.md",
            "---\ndescription: Vendor style guide\n---\n",
        );

        let files = scan_config_dir(tmp.path());
        assert_eq!(files[0].file, "vendor/style.md");
        assert_eq!(files[0].path(), "rules/vendor/style.md");
        assert_eq!(files[0].name, "style");
    }

    #[test]
    fn test_non_markdown_entries_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "rules/readme.txt", "not markdown");
        write(tmp.path(), "rules/real.md", "# Real\n");

        let files = scan_config_dir(tmp.path());
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file, "real.md");
    }

    #[test]
    fn test_missing_categories_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(scan_config_dir(tmp.path()).is_empty());
    }

    #[test]
    fn test_category_parse_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.dir_name()), Some(category));
        }
        assert_eq!(Category::parse("unknown"), None);
    }
}
