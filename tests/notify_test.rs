// SPDX-License-Identifier: MIT
//! End-to-end diff → render properties.

use chrono::{DateTime, Duration, TimeZone, Utc};

use forkwatch::diff;
use forkwatch::model::{Commit, Fork, Plugin, Release, Snapshot};
use forkwatch::notify;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap()
}

fn commit(hash: &str) -> Commit {
    Commit {
        message: format!("work on {hash}\nlonger body with `ticks`"),
        hash: hash.to_string(),
        author: "alice".to_string(),
        timestamp: now() - Duration::days(1),
    }
}

fn release(id: &str, age_days: i64) -> Release {
    Release {
        id: id.to_string(),
        title: format!("Release {id}"),
        attached_files: vec![],
        description: String::new(),
        timestamp: now() - Duration::days(age_days),
    }
}

fn fork(author: &str, name: &str, hash: &str, releases: Vec<Release>) -> Fork {
    Fork {
        author: author.to_string(),
        source_location: None,
        name: name.to_string(),
        latest_commit: commit(hash),
        releases,
    }
}

fn snapshot(plugins: Vec<Plugin>) -> Snapshot {
    Snapshot::new(plugins, now())
}

fn plugin(name: &str, forks: Vec<Fork>) -> Plugin {
    Plugin {
        name: name.to_string(),
        original_author: "origin".to_string(),
        forks,
        description: String::new(),
        endorsed_author: None,
    }
}

#[test]
fn identical_snapshots_render_zero_batches() {
    let snap = snapshot(vec![plugin(
        "P",
        vec![fork("alice", "p", "abc", vec![release("v1", 2)])],
    )]);
    let diff = diff::compute(&snap, &snap, now());
    assert!(diff.is_empty());
    assert!(notify::render(&diff).is_empty());
}

#[test]
fn twenty_three_blocks_make_three_content_batches_plus_brackets() {
    // 23 brand-new forks across one plugin.
    let forks: Vec<Fork> = (0..23)
        .map(|i| fork(&format!("author{i:02}"), "p", &format!("hash{i}"), vec![]))
        .collect();
    let old = snapshot(vec![plugin("P", vec![])]);
    let new = snapshot(vec![plugin("P", forks)]);

    let diff = diff::compute(&old, &new, now());
    let payloads = notify::render(&diff);

    // Leading notice + 10/10/3 + trailing attribution.
    assert_eq!(payloads.len(), 5);
    assert!(payloads[0].content.is_some());
    assert!(payloads[0].embeds.is_empty());
    let sizes: Vec<usize> = payloads[1..4].iter().map(|p| p.embeds.len()).collect();
    assert_eq!(sizes, vec![10, 10, 3]);
    assert!(payloads[4].content.is_some());
    assert!(payloads[4].embeds.is_empty());
}

#[test]
fn new_fork_embed_carries_commit_and_release() {
    let old = snapshot(vec![plugin("P", vec![])]);
    let new = snapshot(vec![plugin(
        "P",
        vec![fork("alice", "p", "abc", vec![release("v1", 2)])],
    )]);
    let payloads = notify::render(&diff::compute(&old, &new, now()));
    let embed = &payloads[1].embeds[0];

    assert_eq!(embed.author.name, "alice");
    assert_eq!(embed.author.url, "https://github.com/alice");
    let field_names: Vec<&str> = embed.fields.iter().map(|f| f.name.as_str()).collect();
    assert!(field_names.contains(&"Latest commit"));
    assert!(field_names.contains(&"Latest release"));
    let repo = embed.fields.iter().find(|f| f.name == "Repository").unwrap();
    assert_eq!(repo.value, "[alice/p](https://github.com/alice/p)");
    // The commit body past the first line break never renders, nor do ticks.
    let commit_field = embed.fields.iter().find(|f| f.name == "Latest commit").unwrap();
    assert_eq!(commit_field.value, "`work on abc`");
}

#[test]
fn new_fork_without_releases_omits_the_release_field() {
    let old = snapshot(vec![plugin("P", vec![])]);
    let new = snapshot(vec![plugin("P", vec![fork("alice", "p", "abc", vec![])])]);
    let payloads = notify::render(&diff::compute(&old, &new, now()));
    let embed = &payloads[1].embeds[0];
    assert!(embed.fields.iter().all(|f| f.name != "Latest release"));
}

#[test]
fn release_only_update_dates_the_block_from_the_release() {
    let old = snapshot(vec![plugin("P", vec![fork("alice", "p", "abc", vec![])])]);
    let new = snapshot(vec![plugin(
        "P",
        vec![fork("alice", "p", "abc", vec![release("v2", 3)])],
    )]);
    let diff = diff::compute(&old, &new, now());
    let blocks = notify::blocks(&diff);
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].commit.is_none());
    assert_eq!(blocks[0].date(), Some(now() - Duration::days(3)));

    let payloads = notify::render(&diff);
    let embed = &payloads[1].embeds[0];
    assert!(embed.fields.iter().any(|f| f.name == "Date"));
    assert!(embed.fields.iter().all(|f| f.name != "Latest commit"));
    assert!(embed.fields.iter().any(|f| f.name == "Latest release"));
}

#[test]
fn changed_fork_reports_only_the_latest_qualifying_release() {
    let old = snapshot(vec![plugin(
        "P",
        vec![fork("alice", "p", "abc", vec![release("v1", 40)])],
    )]);
    let new = snapshot(vec![plugin(
        "P",
        vec![fork(
            "alice",
            "p",
            "abc",
            vec![release("v1", 40), release("v2", 10), release("v3", 5)],
        )],
    )]);
    let diff = diff::compute(&old, &new, now());
    let blocks = notify::blocks(&diff);
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].release.as_ref().unwrap().title, "Release v3");
    assert_eq!(
        blocks[0].release.as_ref().unwrap().url,
        "https://github.com/alice/p/releases/v3"
    );
}

#[test]
fn hosting_move_alone_changes_nothing_downstream() {
    let old = snapshot(vec![plugin("P", vec![fork("alice", "p", "abc", vec![])])]);
    let mut moved = fork("alice", "p", "abc", vec![]);
    moved.source_location = Some("new-org".to_string());
    let new = snapshot(vec![plugin("P", vec![moved])]);
    let diff = diff::compute(&old, &new, now());
    assert!(diff.is_empty());
    assert!(notify::render(&diff).is_empty());
}

#[test]
fn schema_mismatch_renders_nothing() {
    let mut old = snapshot(vec![plugin("P", vec![fork("alice", "p", "abc", vec![])])]);
    let new = snapshot(vec![plugin("P", vec![fork("alice", "p", "def", vec![])])]);
    old.schema_version = "experimental".to_string();
    let diff = diff::compute(&old, &new, now());
    assert!(diff.is_empty());
    assert!(notify::render(&diff).is_empty());
}

#[test]
fn blocks_follow_plugin_then_fork_order() {
    let old = snapshot(vec![plugin("Beta", vec![]), plugin("Alpha", vec![])]);
    let new = snapshot(vec![
        plugin("Beta", vec![fork("bob", "b", "1", vec![])]),
        plugin(
            "Alpha",
            vec![fork("zed", "a", "2", vec![]), fork("amy", "a", "3", vec![])],
        ),
    ]);
    let diff = diff::compute(&old, &new, now());
    let blocks = notify::blocks(&diff);
    let order: Vec<(&str, &str)> = blocks
        .iter()
        .map(|b| (b.plugin_name.as_str(), b.author.as_str()))
        .collect();
    assert_eq!(
        order,
        vec![("Alpha", "amy"), ("Alpha", "zed"), ("Beta", "bob")]
    );
}
