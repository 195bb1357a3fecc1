//! Input configuration and credential resolution.
//!
//! The watch list is a JSON document describing plugins and the repository
//! references tracked for each. The GitHub token comes from `key.txt` in the
//! working directory when present, otherwise the `GH_TOKEN` environment
//! variable; absence of both aborts the run before any fetch starts.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

/// Environment variable consulted when no key file is present.
pub const TOKEN_ENV_VAR: &str = "GH_TOKEN";

/// Default key file checked before the environment.
pub const TOKEN_FILE: &str = "key.txt";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read watch list: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed watch list: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("auth token not found: no {TOKEN_FILE} file and {TOKEN_ENV_VAR} is unset")]
    AuthMissing,
}

/// One tracked repository reference within a plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoReference {
    /// Fork author label — half of the fork identity.
    pub author: String,
    /// Repository name — the other half of the fork identity.
    pub name: String,
    /// Owner/org actually hosting the code, when it differs from `author`.
    #[serde(default)]
    pub location: Option<String>,
    /// Track a non-default branch.
    #[serde(default)]
    pub branch: Option<String>,
}

impl RepoReference {
    /// Owner used for API lookups.
    pub fn location(&self) -> &str {
        self.location.as_deref().unwrap_or(&self.author)
    }
}

impl std::fmt::Display for RepoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.location(), self.name)
    }
}

/// A plugin and the set of forks tracked for it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    pub name: String,
    pub original_author: String,
    pub repositories: Vec<RepoReference>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub endorsed_author: Option<String>,
}

/// The full watch list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchConfig {
    pub plugins: Vec<PluginConfig>,
}

impl WatchConfig {
    /// Parse the watch list from a byte stream.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConfigError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Resolve the GitHub token: key file first, then environment.
pub fn load_token(key_file: &Path) -> Result<String, ConfigError> {
    if key_file.exists() {
        info!(path = %key_file.display(), "reading auth token from key file");
        let token = std::fs::read_to_string(key_file)?;
        return Ok(token.trim().to_string());
    }
    std::env::var(TOKEN_ENV_VAR)
        .ok()
        .filter(|t| !t.is_empty())
        .ok_or(ConfigError::AuthMissing)
}
