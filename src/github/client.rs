//! GitHub REST client backing the [`RepoHost`] trait.

use anyhow::{anyhow, Context as _};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

use super::{HostBranch, HostCommit, HostError, HostRelease, HostRepo, RepoHost};

const DEFAULT_API_BASE: &str = "https://api.github.com";

// ─── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GhRepo {
    name: String,
    owner: GhOwner,
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct GhOwner {
    login: String,
}

#[derive(Debug, Deserialize)]
struct GhRelease {
    tag_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    assets: Vec<GhAsset>,
    created_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct GhAsset {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GhBranch {
    name: String,
    commit: GhBranchTip,
}

#[derive(Debug, Deserialize)]
struct GhBranchTip {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct GhCommit {
    sha: String,
    commit: GhCommitInner,
    author: Option<GhOwner>,
}

#[derive(Debug, Deserialize)]
struct GhCommitInner {
    message: String,
    author: GhGitSignature,
    committer: GhGitSignature,
}

#[derive(Debug, Deserialize)]
struct GhGitSignature {
    name: String,
    date: DateTime<Utc>,
}

// ─── Client ───────────────────────────────────────────────────────────────────

/// Authenticated GitHub API client.
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl GithubClient {
    pub fn new(token: String) -> Result<Self, HostError> {
        Self::with_base_url(token, DEFAULT_API_BASE.to_string())
    }

    /// Point the client at a different API root. Tests use this to hit a
    /// local stub server.
    pub fn with_base_url(token: String, base_url: String) -> Result<Self, HostError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")
            .map_err(HostError::Transient)?;
        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    /// GET a JSON document, mapping 404 to [`HostError::NotFound`] and
    /// everything else that goes wrong to [`HostError::Transient`].
    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, HostError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.token)
            .header(
                "User-Agent",
                concat!("forkwatch/", env!("CARGO_PKG_VERSION")),
            )
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))
            .map_err(HostError::Transient)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(HostError::NotFound(url));
        }
        let status = response.status();
        if !status.is_success() {
            return Err(HostError::Transient(anyhow!(
                "GitHub API returned {status} for {url}"
            )));
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to decode response from {url}"))
            .map_err(HostError::Transient)
    }
}

#[async_trait]
impl RepoHost for GithubClient {
    async fn get_repo(&self, owner: &str, name: &str) -> Result<HostRepo, HostError> {
        let repo: GhRepo = self.get_json(&format!("/repos/{owner}/{name}")).await?;
        Ok(HostRepo {
            owner: repo.owner.login,
            name: repo.name,
            default_branch: repo.default_branch,
        })
    }

    async fn list_releases(&self, repo: &HostRepo) -> Result<Vec<HostRelease>, HostError> {
        // First page only — older releases are never fresh enough to report.
        let releases: Vec<GhRelease> = self
            .get_json(&format!(
                "/repos/{}/{}/releases?per_page=30&page=1",
                repo.owner, repo.name
            ))
            .await?;
        Ok(releases
            .into_iter()
            .map(|r| HostRelease {
                title: r.name.unwrap_or_else(|| r.tag_name.clone()),
                tag: r.tag_name,
                asset_names: r.assets.into_iter().map(|a| a.name).collect(),
                body: r.body.unwrap_or_default(),
                created_at: r.created_at,
                published_at: r.published_at,
            })
            .collect())
    }

    async fn get_branch(&self, repo: &HostRepo, branch: &str) -> Result<HostBranch, HostError> {
        let branch: GhBranch = self
            .get_json(&format!(
                "/repos/{}/{}/branches/{branch}",
                repo.owner, repo.name
            ))
            .await?;
        Ok(HostBranch {
            name: branch.name,
            tip_sha: branch.commit.sha,
        })
    }

    async fn get_commit(&self, repo: &HostRepo, sha: &str) -> Result<HostCommit, HostError> {
        let commit: GhCommit = self
            .get_json(&format!(
                "/repos/{}/{}/commits/{sha}",
                repo.owner, repo.name
            ))
            .await?;
        Ok(HostCommit {
            message: commit.commit.message,
            sha: commit.sha,
            author_login: commit.author.map(|a| a.login),
            author_name: commit.commit.author.name,
            committer_date: commit.commit.committer.date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_title_falls_back_to_tag() {
        let json = r#"{
            "tag_name": "v1.0",
            "name": null,
            "body": null,
            "assets": [{"name": "plugin.zip"}],
            "created_at": "2024-01-01T00:00:00Z",
            "published_at": null
        }"#;
        let release: GhRelease = serde_json::from_str(json).unwrap();
        let title = release.name.unwrap_or_else(|| release.tag_name.clone());
        assert_eq!(title, "v1.0");
        assert!(release.published_at.is_none());
    }

    #[test]
    fn commit_wire_format_decodes() {
        let json = r#"{
            "sha": "abc123",
            "commit": {
                "message": "fix: things",
                "author": {"name": "Alice", "date": "2024-01-02T03:04:05Z"},
                "committer": {"name": "GitHub", "date": "2024-01-02T03:04:06Z"}
            },
            "author": null
        }"#;
        let commit: GhCommit = serde_json::from_str(json).unwrap();
        assert_eq!(commit.sha, "abc123");
        assert!(commit.author.is_none());
        assert_eq!(commit.commit.author.name, "Alice");
    }
}
