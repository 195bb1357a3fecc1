use std::path::PathBuf;

use anyhow::{Context as _, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;

use forkwatch::config::{self, WatchConfig, TOKEN_FILE};
use forkwatch::fetch::Fetcher;
use forkwatch::github::GithubClient;
use forkwatch::model::io::{read_snapshot, write_snapshot};
use forkwatch::{diff, notify};

#[derive(Parser)]
#[command(
    name = "forkwatch",
    about = "Tracks plugin forks on GitHub and posts update digests to a chat webhook",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level filter (trace, debug, info, warn, error)
    #[arg(long, env = "FORKWATCH_LOG", default_value = "info")]
    log: String,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the current state of every tracked fork and write a snapshot.
    ///
    /// Reads the watch list from input.json in the working directory (or
    /// stdin when no such file exists) and writes the snapshot JSON to
    /// stdout. The GitHub token comes from key.txt, falling back to the
    /// GH_TOKEN environment variable.
    ///
    /// Examples:
    ///   forkwatch build > snapshot.json
    ///   forkwatch build < plugins.json > snapshot.json
    Build,
    /// Diff two snapshots and post the changes to a webhook.
    ///
    /// Computes new forks, new commits, and new releases (within the 30-day
    /// freshness window) between the two snapshots, and posts the rendered
    /// batches to the webhook URL. Exits quietly when there is nothing to
    /// report.
    ///
    /// Examples:
    ///   forkwatch post-updates snapshot-new.json snapshot-old.json https://discord.com/api/webhooks/...
    PostUpdates {
        /// Snapshot from the current run
        new_file: PathBuf,
        /// Snapshot from the previous run
        old_file: PathBuf,
        /// Webhook URL to post batches to
        webhook_url: String,
    },
}

// The whole pipeline is one linear task — no parallel fetches, by design.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // stdout carries the snapshot document — diagnostics go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(args.log.as_str())
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match args.command {
        Command::Build => build().await,
        Command::PostUpdates {
            new_file,
            old_file,
            webhook_url,
        } => post_updates(&new_file, &old_file, &webhook_url).await,
    }
}

async fn build() -> Result<()> {
    let input_path = PathBuf::from("input.json");
    let config = if input_path.exists() {
        let file = std::fs::File::open(&input_path)
            .with_context(|| format!("failed to open {}", input_path.display()))?;
        WatchConfig::from_reader(file)
    } else {
        WatchConfig::from_reader(std::io::stdin().lock())
    }
    .context("failed to parse the watch list")?;

    // Fatal before any fetch: there is no unauthenticated mode.
    let token = config::load_token(&PathBuf::from(TOKEN_FILE))?;

    let host = GithubClient::new(token).context("failed to construct the GitHub client")?;
    let snapshot = Fetcher::new(host).build_snapshot(&config).await;

    info!(plugins = snapshot.plugins.len(), "snapshot assembled");
    write_snapshot(std::io::stdout().lock(), &snapshot).context("failed to write snapshot")?;
    Ok(())
}

async fn post_updates(new_file: &PathBuf, old_file: &PathBuf, webhook_url: &str) -> Result<()> {
    let current = read_snapshot(
        std::fs::File::open(new_file)
            .with_context(|| format!("failed to open {}", new_file.display()))?,
    )
    .context("failed to load the current snapshot")?;
    let previous = read_snapshot(
        std::fs::File::open(old_file)
            .with_context(|| format!("failed to open {}", old_file.display()))?,
    )
    .context("failed to load the previous snapshot")?;

    let diff = diff::compute(&previous, &current, Utc::now());
    let payloads = notify::render(&diff);
    if payloads.is_empty() {
        info!("no updates, exiting");
        return Ok(());
    }

    let sender = notify::sender::WebhookSender::new(webhook_url.to_string())?;
    sender.send_all(&payloads).await;
    Ok(())
}
