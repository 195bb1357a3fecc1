// SPDX-License-Identifier: MIT
//! Narrow interface over the repository host.
//!
//! The fetcher only ever needs four lookups: repository, releases (first
//! page), branch, commit. Keeping the trait this small lets the fetcher be
//! tested against an in-memory stub without network access.

pub mod client;
pub mod urls;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use client::GithubClient;

/// Failure modes of a host lookup.
///
/// `NotFound` is terminal for the reference being fetched — the fetcher skips
/// it without retrying. Everything else is transient and retried against the
/// attempt budget.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("transient host failure: {0}")]
    Transient(#[source] anyhow::Error),
}

impl HostError {
    /// True when retrying cannot help.
    pub fn is_terminal(&self) -> bool {
        matches!(self, HostError::NotFound(_))
    }
}

/// Repository identity plus its default branch.
#[derive(Debug, Clone)]
pub struct HostRepo {
    pub owner: String,
    pub name: String,
    pub default_branch: String,
}

/// A branch and its tip commit SHA.
#[derive(Debug, Clone)]
pub struct HostBranch {
    pub name: String,
    pub tip_sha: String,
}

/// Full commit metadata as reported by the host.
#[derive(Debug, Clone)]
pub struct HostCommit {
    pub message: String,
    pub sha: String,
    /// Platform login of the author — absent for unlinked external
    /// contributors.
    pub author_login: Option<String>,
    /// Raw author name from the commit metadata itself.
    pub author_name: String,
    pub committer_date: DateTime<Utc>,
}

/// One release as reported by the host, drafts included.
#[derive(Debug, Clone)]
pub struct HostRelease {
    pub tag: String,
    pub title: String,
    pub asset_names: Vec<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// `None` for drafts/unpublished releases — those never enter a snapshot.
    pub published_at: Option<DateTime<Utc>>,
}

/// The four host operations the fetcher depends on.
#[async_trait]
pub trait RepoHost {
    /// Resolve a repository by owner (or hosting location) and name.
    async fn get_repo(&self, owner: &str, name: &str) -> Result<HostRepo, HostError>;

    /// First page of releases for a repository, newest first.
    async fn list_releases(&self, repo: &HostRepo) -> Result<Vec<HostRelease>, HostError>;

    /// Resolve a branch to its tip commit.
    async fn get_branch(&self, repo: &HostRepo, branch: &str) -> Result<HostBranch, HostError>;

    /// Full metadata for a single commit.
    async fn get_commit(&self, repo: &HostRepo, sha: &str) -> Result<HostCommit, HostError>;
}
