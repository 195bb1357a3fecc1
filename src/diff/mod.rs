// SPDX-License-Identifier: MIT
//! Snapshot reconciliation.
//!
//! Compares two snapshots and derives the minimal set of reportable facts:
//! forks that appeared since the previous snapshot, and existing forks with
//! a new commit and/or new releases inside the freshness window. The result
//! is grouped by owning plugin and fully ordered, so rendering is a pure
//! fold over the structure.
//!
//! Fork identity across snapshots is the `(author, name)` pair. The hosting
//! location is deliberately excluded — a fork that moves between orgs is
//! still the same fork.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use tracing::info;

use crate::model::{Commit, Fork, Release, Snapshot, SCHEMA_VERSION};

/// Releases older than this (relative to "now") are suppressed even when
/// unseen — backfilled history should not re-notify.
pub const FRESHNESS_WINDOW_DAYS: i64 = 30;

/// A fork present in the current snapshot but not the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewFork {
    pub fork: Fork,
}

/// An existing fork with at least one reportable fact.
///
/// Either `new_commit` is set, `new_releases` is non-empty, or both; a
/// changed fork with neither is dropped before it gets here.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangedFork {
    pub fork: Fork,
    /// Set when the tip commit differs structurally from the previous one.
    pub new_commit: Option<Commit>,
    /// Releases unseen in the previous snapshot and inside the freshness
    /// window, in the fork's own order.
    pub new_releases: Vec<Release>,
}

impl ChangedFork {
    /// The single "latest new" release: maximum timestamp among the new
    /// releases, first occurrence winning ties.
    pub fn latest_new_release(&self) -> Option<&Release> {
        self.new_releases.iter().fold(None, |best, r| match best {
            Some(b) if r.timestamp > b.timestamp => Some(r),
            None => Some(r),
            keep => keep,
        })
    }
}

/// All reportable facts for one plugin, already ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginDiff {
    pub plugin_name: String,
    pub new_forks: Vec<NewFork>,
    pub changed_forks: Vec<ChangedFork>,
}

/// The full diff between two snapshots, plugins in alphabetical order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diff {
    pub plugins: Vec<PluginDiff>,
}

impl Diff {
    /// True when there is nothing to report — downstream must emit nothing.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Compute the diff between `previous` and `current`.
///
/// `now` anchors the release freshness window; callers outside tests pass
/// `Utc::now()`. A schema version mismatch on either side yields an empty
/// diff — fail-safe, not fail-loud.
pub fn compute(previous: &Snapshot, current: &Snapshot, now: DateTime<Utc>) -> Diff {
    if previous.schema_version != SCHEMA_VERSION || current.schema_version != SCHEMA_VERSION {
        info!(
            previous = %previous.schema_version,
            current = %current.schema_version,
            expected = SCHEMA_VERSION,
            "schema version mismatch — nothing to report"
        );
        return Diff::default();
    }

    let cutoff = now - Duration::days(FRESHNESS_WINDOW_DAYS);

    // Fork identity → owning plugin, taken from the current snapshot: when a
    // fork changes owner between snapshots, the new owner wins for grouping.
    let owner_by_fork: HashMap<(&str, &str), &str> = current
        .forks()
        .map(|(plugin, fork)| (fork.key(), plugin.name.as_str()))
        .collect();

    let previous_by_key: HashMap<(&str, &str), &Fork> =
        previous.forks().map(|(_, fork)| (fork.key(), fork)).collect();

    // plugin name → facts; BTreeMap gives the alphabetical plugin order.
    let mut grouped: BTreeMap<&str, (Vec<NewFork>, Vec<ChangedFork>)> = BTreeMap::new();

    for (_, fork) in current.forks() {
        let Some(&plugin_name) = owner_by_fork.get(&fork.key()) else {
            continue;
        };
        match previous_by_key.get(&fork.key()) {
            None => {
                grouped
                    .entry(plugin_name)
                    .or_default()
                    .0
                    .push(NewFork { fork: fork.clone() });
            }
            // Full structural equality: a byte-identical fork is not a change.
            Some(prev) if *prev != fork => {
                if let Some(changed) = changed_fork(prev, fork, cutoff) {
                    grouped.entry(plugin_name).or_default().1.push(changed);
                }
            }
            Some(_) => {}
        }
    }

    let plugins = grouped
        .into_iter()
        .filter(|(_, (new, changed))| !new.is_empty() || !changed.is_empty())
        .map(|(plugin_name, (mut new_forks, mut changed_forks))| {
            new_forks.sort_by(|a, b| a.fork.key().cmp(&b.fork.key()));
            changed_forks.sort_by(|a, b| a.fork.key().cmp(&b.fork.key()));
            PluginDiff {
                plugin_name: plugin_name.to_string(),
                new_forks,
                changed_forks,
            }
        })
        .collect();

    Diff { plugins }
}

/// Derive the reportable facts for a fork present in both snapshots.
///
/// Returns `None` when the fork differs only in fields that are never
/// rendered (e.g. reordered attachment lists) — those changes are dropped
/// silently.
fn changed_fork(previous: &Fork, current: &Fork, cutoff: DateTime<Utc>) -> Option<ChangedFork> {
    let new_commit = (current.latest_commit != previous.latest_commit)
        .then(|| current.latest_commit.clone());

    let previous_ids: HashSet<&str> = previous.releases.iter().map(|r| r.id.as_str()).collect();
    let new_releases: Vec<Release> = current
        .releases
        .iter()
        .filter(|r| !previous_ids.contains(r.id.as_str()))
        .filter(|r| r.timestamp > cutoff)
        .cloned()
        .collect();

    if new_commit.is_none() && new_releases.is_empty() {
        return None;
    }

    Some(ChangedFork {
        fork: current.clone(),
        new_commit,
        new_releases,
    })
}
