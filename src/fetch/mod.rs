// SPDX-License-Identifier: MIT
//! Snapshot fetcher.
//!
//! Walks the watch list one repository reference at a time (sequential on
//! purpose — the host is rate limited) and assembles a [`Snapshot`]. Every
//! failure degrades to an omission: a reference that cannot be fetched is
//! absent from its plugin's fork list, a plugin that blows up entirely is
//! skipped, and the run carries on.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::{PluginConfig, RepoReference, WatchConfig};
use crate::github::{HostError, RepoHost};
use crate::model::{Commit, Fork, Plugin, Release, Snapshot};
use crate::retry::{retry_fixed, RetryPolicy};

/// Fetches snapshots from a repository host.
pub struct Fetcher<H> {
    host: H,
    policy: RetryPolicy,
}

impl<H: RepoHost> Fetcher<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            policy: RetryPolicy::default(),
        }
    }

    /// Override the retry policy. Tests use [`RetryPolicy::instant`].
    pub fn with_policy(host: H, policy: RetryPolicy) -> Self {
        Self { host, policy }
    }

    /// Access the underlying host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Fetch every tracked reference and assemble a snapshot stamped with
    /// the current time.
    pub async fn build_snapshot(&self, config: &WatchConfig) -> Snapshot {
        let mut plugins = Vec::with_capacity(config.plugins.len());
        for plugin in &config.plugins {
            match self.fetch_plugin(plugin).await {
                Ok(p) => plugins.push(p),
                Err(e) => {
                    warn!(plugin = %plugin.name, err = %e, "unable to process plugin — skipping");
                }
            }
        }
        Snapshot::new(plugins, Utc::now())
    }

    /// Fetch all of one plugin's references. Individual reference failures
    /// are logged and omitted; they never fail the plugin.
    async fn fetch_plugin(&self, plugin: &PluginConfig) -> Result<Plugin, HostError> {
        let mut forks = Vec::with_capacity(plugin.repositories.len());
        for reference in &plugin.repositories {
            let result = retry_fixed(&self.policy, HostError::is_terminal, || {
                self.fetch_fork(reference)
            })
            .await;
            match result {
                Ok(fork) => forks.push(fork),
                Err(e) => {
                    warn!(
                        plugin = %plugin.name,
                        reference = %reference,
                        err = %e,
                        "unable to process fork — skipping"
                    );
                }
            }
        }
        info!(plugin = %plugin.name, forks = forks.len(), "plugin processed");
        Ok(Plugin {
            name: plugin.name.clone(),
            original_author: plugin.original_author.clone(),
            forks,
            description: plugin.description.clone(),
            endorsed_author: plugin.endorsed_author.clone(),
        })
    }

    /// One attempt at resolving a reference into a [`Fork`].
    async fn fetch_fork(&self, reference: &RepoReference) -> Result<Fork, HostError> {
        let repo = self
            .host
            .get_repo(reference.location(), &reference.name)
            .await?;

        let releases = self
            .host
            .list_releases(&repo)
            .await?
            .into_iter()
            // Drafts have no publication timestamp and are never reported.
            .filter(|r| r.published_at.is_some())
            .map(|r| Release {
                id: r.tag,
                title: r.title,
                attached_files: r.asset_names,
                description: r.body,
                timestamp: r.created_at,
            })
            .collect();

        let branch_name = reference.branch.as_deref().unwrap_or(&repo.default_branch);
        let branch = self.host.get_branch(&repo, branch_name).await?;
        let commit = self.host.get_commit(&repo, &branch.tip_sha).await?;

        Ok(Fork {
            author: reference.author.clone(),
            source_location: reference.location.clone(),
            name: reference.name.clone(),
            latest_commit: Commit {
                message: commit.message,
                hash: commit.sha,
                // Prefer the platform login; unlinked contributors only have
                // the raw name from the commit metadata.
                author: commit.author_login.unwrap_or(commit.author_name),
                timestamp: commit.committer_date,
            },
            releases,
        })
    }
}
