//! Git helpers for managing external rule sources

use crate::{HubError, Result};
use std::path::Path;
use std::process::Command;

/// Components of a parsed repository URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitUrl {
    pub host: String,
    pub owner: String,
    pub repo: String,
}

/// Parse the various git URL shapes users paste in:
/// `github.com/org/repo`, `https://github.com/org/repo`,
/// `git@github.com:org/repo.git`
pub fn parse_git_url(url: &str) -> Result<GitUrl> {
    let mut normalized = url.trim().to_string();
    for prefix in ["https://", "http://", "git@"] {
        if let Some(rest) = normalized.strip_prefix(prefix) {
            normalized = rest.to_string();
            break;
        }
    }
    if let Some(rest) = normalized.strip_suffix(".git") {
        normalized = rest.to_string();
    }
    // scp-style separator between host and owner
    normalized = normalized.replacen(':', "/", 1);

    let parts: Vec<&str> = normalized.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() < 3 {
        return Err(HubError::git(format!("Invalid git URL: {}", url)));
    }

    Ok(GitUrl {
        host: parts[0].to_string(),
        owner: parts[1].to_string(),
        repo: parts[2].to_string(),
    })
}

/// Normalize any supported URL shape to `https://host/owner/repo.git`
pub fn normalize_git_url(url: &str) -> Result<String> {
    let GitUrl { host, owner, repo } = parse_git_url(url)?;
    Ok(format!("https://{}/{}/{}.git", host, owner, repo))
}

/// Repository name portion of a URL
pub fn repo_name(url: &str) -> Result<String> {
    Ok(parse_git_url(url)?.repo)
}

/// Clone a repository (shallow) into `target`, or fast-forward it if the
/// checkout already exists
pub fn clone_repo(url: &str, target: &Path) -> Result<()> {
    if target.exists() {
        let output = Command::new("git")
            .args(["pull", "--ff-only"])
            .current_dir(target)
            .output()
            .map_err(|e| HubError::git(format!("failed to run git: {}", e)))?;
        if !output.status.success() {
            return Err(HubError::git(format!(
                "git pull failed for {}: {}",
                target.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        return Ok(());
    }

    let normalized = normalize_git_url(url)?;
    let output = Command::new("git")
        .args(["clone", "--depth", "1", &normalized])
        .arg(target)
        .output()
        .map_err(|e| HubError::git(format!("failed to run git: {}", e)))?;
    if !output.status.success() {
        return Err(HubError::git(format!(
            "git clone failed for {}: {}",
            normalized,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}

/// Fast-forward an existing checkout. Returns true if new commits arrived;
/// any failure is reported as "no change" so the update run can continue.
pub fn update_repo(path: &Path) -> bool {
    let output = Command::new("git")
        .args(["pull", "--ff-only"])
        .current_dir(path)
        .output();
    match output {
        Ok(out) if out.status.success() => {
            !String::from_utf8_lossy(&out.stdout).contains("Already up to date")
        }
        _ => false,
    }
}

/// Check whether a git binary is on PATH
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_host_path() {
        let parsed = parse_git_url("github.com/acme/rules").unwrap();
        assert_eq!(parsed.host, "github.com");
        assert_eq!(parsed.owner, "acme");
        assert_eq!(parsed.repo, "rules");
    }

    #[test]
    fn test_parse_https_url() {
        let parsed = parse_git_url("https://github.com/acme/rules").unwrap();
        assert_eq!(parsed.repo, "rules");
    }

    #[test]
    fn test_parse_scp_style() {
        let parsed = parse_git_url("git@github.com:acme/rules.git").unwrap();
        assert_eq!(parsed.host, "github.com");
        assert_eq!(parsed.owner, "acme");
        assert_eq!(parsed.repo, "rules");
    }

    #[test]
    fn test_normalize_git_url() {
        assert_eq!(
            normalize_git_url("git@github.com:acme/rules.git").unwrap(),
            "https://github.com/acme/rules.git"
        );
        assert_eq!(
            normalize_git_url("github.com/acme/rules").unwrap(),
            "https://github.com/acme/rules.git"
        );
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(parse_git_url("not-a-url").is_err());
        assert!(parse_git_url("github.com/only-owner").is_err());
    }

    #[test]
    fn test_repo_name() {
        assert_eq!(repo_name("https://github.com/acme/rules").unwrap(), "rules");
    }
}
