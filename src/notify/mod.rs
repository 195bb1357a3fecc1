// SPDX-License-Identifier: MIT
//! Notification rendering.
//!
//! Turns a [`Diff`](crate::diff::Diff) into an ordered sequence of webhook
//! payloads: a leading notice, the per-fork embed batches (at most
//! [`EMBEDS_PER_MESSAGE`] embeds each — a hard platform ceiling), and a
//! trailing attribution batch. Rendering is pure; posting lives in
//! [`sender`].

pub mod sender;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diff::{ChangedFork, Diff, NewFork};
use crate::github::urls;
use crate::model::Fork;

/// Hard per-message embed ceiling imposed by the target platform.
pub const EMBEDS_PER_MESSAGE: usize = 10;

const NOTICE: &str = "__**Warning! This message was formed automatically and \
                      contains content from third-party sources. Proceed with caution**__";

const FOOTER: &str = "Tracking data assembled by forkwatch from public repository metadata.";

// ─── Wire types ───────────────────────────────────────────────────────────────

/// One outbound webhook message.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Embed {
    pub author: EmbedAuthor,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

// ─── Renderable blocks ────────────────────────────────────────────────────────

/// A commit fact shown on a block.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitFact {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// A release fact shown on a block.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseFact {
    pub title: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

/// One renderable block per reported fork — a plain value struct assembled
/// field by field before any formatting happens.
#[derive(Debug, Clone, PartialEq)]
pub struct ForkBlock {
    pub plugin_name: String,
    pub author: String,
    pub author_url: String,
    /// Rendered as `location/name`, using the hosting location at the time
    /// of the current snapshot.
    pub repo_label: String,
    pub repo_url: String,
    pub is_new: bool,
    pub commit: Option<CommitFact>,
    pub release: Option<ReleaseFact>,
}

impl ForkBlock {
    /// The date shown for the block: the commit date when a commit fact is
    /// present, otherwise the release date — a block is never dateless.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.commit
            .as_ref()
            .map(|c| c.timestamp)
            .or_else(|| self.release.as_ref().map(|r| r.timestamp))
    }
}

// ─── Text helpers ─────────────────────────────────────────────────────────────

/// Truncate a commit message at the first line break and strip characters
/// that would break the target format's inline code/quote delimiters.
fn clean_message(message: &str) -> String {
    let first_line = message
        .split(['\r', '\n'])
        .next()
        .unwrap_or_default();
    first_line.replace(['`', '"'], "")
}

fn clean_title(title: &str) -> String {
    title.replace('`', "")
}

fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%d %B %Y %H:%M").to_string()
}

// ─── Rendering ────────────────────────────────────────────────────────────────

fn base_block(plugin_name: &str, fork: &Fork, is_new: bool) -> ForkBlock {
    ForkBlock {
        plugin_name: plugin_name.to_string(),
        author: fork.author.clone(),
        author_url: urls::author(&fork.author),
        repo_label: format!("{}/{}", fork.location(), fork.name),
        repo_url: urls::repository(fork.location(), &fork.name),
        is_new,
        commit: None,
        release: None,
    }
}

fn new_fork_block(plugin_name: &str, new: &NewFork) -> ForkBlock {
    let fork = &new.fork;
    let mut block = base_block(plugin_name, fork, true);
    block.commit = Some(CommitFact {
        timestamp: fork.latest_commit.timestamp,
        message: clean_message(&fork.latest_commit.message),
    });
    // Absent release: the field is omitted entirely (no placeholder).
    block.release = fork.latest_release().map(|r| ReleaseFact {
        title: clean_title(&r.title),
        url: urls::release(fork.location(), &fork.name, &r.id),
        timestamp: r.timestamp,
    });
    block
}

fn changed_fork_block(plugin_name: &str, changed: &ChangedFork) -> ForkBlock {
    let fork = &changed.fork;
    let mut block = base_block(plugin_name, fork, false);
    block.commit = changed.new_commit.as_ref().map(|c| CommitFact {
        timestamp: c.timestamp,
        message: clean_message(&c.message),
    });
    block.release = changed.latest_new_release().map(|r| ReleaseFact {
        title: clean_title(&r.title),
        url: urls::release(fork.location(), &fork.name, &r.id),
        timestamp: r.timestamp,
    });
    block
}

/// Flatten a diff into its ordered block sequence.
///
/// The diff arrives grouped and sorted; this is a straight traversal with
/// new forks ahead of changed forks within each plugin.
pub fn blocks(diff: &Diff) -> Vec<ForkBlock> {
    let mut out = Vec::new();
    for plugin in &diff.plugins {
        for new in &plugin.new_forks {
            out.push(new_fork_block(&plugin.plugin_name, new));
        }
        for changed in &plugin.changed_forks {
            out.push(changed_fork_block(&plugin.plugin_name, changed));
        }
    }
    out
}

fn embed(block: &ForkBlock) -> Embed {
    let mut fields = vec![
        EmbedField {
            name: "Plugin".into(),
            value: block.plugin_name.clone(),
            inline: true,
        },
        EmbedField {
            name: "Change".into(),
            value: if block.is_new { "New fork" } else { "Update" }.into(),
            inline: true,
        },
        EmbedField {
            name: "Repository".into(),
            value: format!("[{}]({})", block.repo_label, block.repo_url),
            inline: false,
        },
    ];
    if let Some(date) = block.date() {
        fields.push(EmbedField {
            name: "Date".into(),
            value: format_date(date),
            inline: true,
        });
    }
    if let Some(commit) = &block.commit {
        if !commit.message.is_empty() {
            fields.push(EmbedField {
                name: "Latest commit".into(),
                value: format!("`{}`", commit.message),
                inline: false,
            });
        }
    }
    if let Some(release) = &block.release {
        fields.push(EmbedField {
            name: "Latest release".into(),
            value: format!("[{}]({})", release.title, release.url),
            inline: false,
        });
    }
    Embed {
        author: EmbedAuthor {
            name: block.author.clone(),
            url: block.author_url.clone(),
        },
        fields,
    }
}

/// Render a diff into the ordered payload sequence.
///
/// Empty diff ⇒ empty vector — the caller must perform no network activity.
/// Otherwise: one leading notice payload, `ceil(blocks / 10)` content
/// payloads, one trailing attribution payload.
pub fn render(diff: &Diff) -> Vec<WebhookPayload> {
    let blocks = blocks(diff);
    if blocks.is_empty() {
        return Vec::new();
    }

    let mut payloads = vec![WebhookPayload {
        content: Some(NOTICE.to_string()),
        embeds: Vec::new(),
    }];

    for chunk in blocks.chunks(EMBEDS_PER_MESSAGE) {
        payloads.push(WebhookPayload {
            content: None,
            embeds: chunk.iter().map(embed).collect(),
        });
    }

    payloads.push(WebhookPayload {
        content: Some(FOOTER.to_string()),
        embeds: Vec::new(),
    });

    payloads
}
