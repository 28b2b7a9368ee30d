//! Installation metadata persisted as `meta.json`

use crate::{HubError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const META_FILE: &str = "meta.json";

/// How the config tree is projected into the assistant directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMode {
    Symlink,
    Copy,
}

impl std::fmt::Display for InstallMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstallMode::Symlink => f.write_str("symlink"),
            InstallMode::Copy => f.write_str("copy"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Builtin,
    External,
}

/// One rule source: the built-in starter set or a cloned repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaSource {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

/// The persisted installation record. Field names stay camelCase on disk
/// so the file remains hand-inspectable alongside other assistant config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallMeta {
    pub version: String,
    pub mode: InstallMode,
    pub sources: Vec<MetaSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,
    /// Content hashes captured at install/update time (copy mode only);
    /// used to tell user edits apart from upstream changes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_hashes: Option<BTreeMap<String, String>>,
    pub created_at: String,
    pub updated_at: String,
}

impl InstallMeta {
    pub fn new(mode: InstallMode) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            version: crate::VERSION.to_string(),
            mode,
            sources: Vec::new(),
            tools: None,
            file_hashes: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|_| HubError::meta(format!("metadata not found at {}", path.display())))?;
        serde_json::from_str(&content)
            .map_err(|e| HubError::meta(format!("could not parse {}: {}", path.display(), e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| HubError::file_system(path, e))?;
        Ok(())
    }

    /// Refresh the update timestamp
    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    pub fn has_source(&self, name: &str) -> bool {
        self.sources.iter().any(|s| s.name == name)
    }

    pub fn source(&self, name: &str) -> Option<&MetaSource> {
        self.sources.iter().find(|s| s.name == name)
    }
}
