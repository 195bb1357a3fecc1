// SPDX-License-Identifier: MIT
//! Snapshot model — the value types captured per polling run.
//!
//! A [`Snapshot`] is a full point-in-time capture of every tracked plugin,
//! its forks, their latest commit, and their release history. The fetcher is
//! the only producer; the diff engine and the renderer are read-only
//! consumers. All types compare by full structural equality — the diff
//! engine relies on this to detect changes in any rendered field.

pub mod io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version stamp written into every snapshot this build produces.
///
/// Two snapshots may only be diffed when both declare this exact version;
/// anything else is treated as "nothing to report" (see [`crate::diff`]).
pub const SCHEMA_VERSION: &str = "1";

/// The tip commit of a tracked branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub message: String,
    pub hash: String,
    /// Display author: the committer's platform login when linked, otherwise
    /// the raw author name from the commit metadata.
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

/// One published release of a fork. Identity = `id` (the release tag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Release {
    pub id: String,
    pub title: String,
    pub attached_files: Vec<String>,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// One tracked copy of a plugin's source.
///
/// Cross-snapshot identity is the `(author, name)` pair — never
/// `source_location`, so a fork can move between hosting locations without
/// being treated as a brand-new fork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fork {
    /// Label of the fork author as tracked in the input config.
    pub author: String,
    /// Owner/org actually hosting the code, when it differs from `author`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<String>,
    pub name: String,
    pub latest_commit: Commit,
    /// Unique by `id` within a fork.
    pub releases: Vec<Release>,
}

impl Fork {
    /// Cross-snapshot identity key.
    pub fn key(&self) -> (&str, &str) {
        (self.author.as_str(), self.name.as_str())
    }

    /// Owner/org to use when building repository links.
    pub fn location(&self) -> &str {
        self.source_location.as_deref().unwrap_or(&self.author)
    }

    /// Release with the maximum timestamp, or `None` when there are none.
    ///
    /// Ties keep the first occurrence in insertion order (strict `>` in the
    /// fold), so the result is deterministic for equal timestamps.
    pub fn latest_release(&self) -> Option<&Release> {
        self.releases.iter().fold(None, |best, r| match best {
            Some(b) if r.timestamp > b.timestamp => Some(r),
            None => Some(r),
            keep => keep,
        })
    }
}

/// A tracked plugin and all of its known forks. Identity = `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub name: String,
    pub original_author: String,
    pub forks: Vec<Fork>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endorsed_author: Option<String>,
}

/// Full point-in-time capture of all tracked plugins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub plugins: Vec<Plugin>,
    pub generated_at: DateTime<Utc>,
    pub schema_version: String,
}

impl Snapshot {
    /// Stamp a freshly fetched plugin list with the current schema version.
    pub fn new(plugins: Vec<Plugin>, generated_at: DateTime<Utc>) -> Self {
        Self {
            plugins,
            generated_at,
            schema_version: SCHEMA_VERSION.to_string(),
        }
    }

    /// Iterate every fork across all plugins, paired with its owning plugin.
    pub fn forks(&self) -> impl Iterator<Item = (&Plugin, &Fork)> {
        self.plugins
            .iter()
            .flat_map(|p| p.forks.iter().map(move |f| (p, f)))
    }
}
