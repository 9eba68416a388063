// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use pcd::{Config, ErrorKind, Podcast, ReqwestClient};

// Emoji with fallback for terminals without Unicode support
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "[+] ");
static FAILURE: Emoji<'_, '_> = Emoji("❌ ", "[!] ");
static DOWNLOAD: Emoji<'_, '_> = Emoji("📥 ", "[v] ");
static HINT: Emoji<'_, '_> = Emoji("💡 ", "[i] ");

/// Sync podcast feeds into a local cache and download episodes
#[derive(Parser, Debug)]
#[command(name = "pcd")]
#[command(about = "Sync podcast feeds into a local cache and download episodes")]
#[command(version)]
struct Args {
    /// Path to the config file (defaults to $PCD_CONFIG or <config dir>/pcd.yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch feeds and refresh their caches
    Sync {
        /// Podcast id or name (all podcasts when omitted)
        podcast: Option<String>,
    },

    /// List the cached episodes of a podcast
    Ls {
        /// Podcast id or name
        podcast: String,
    },

    /// Download episodes by their index in `pcd ls`
    Download {
        /// Podcast id or name
        podcast: String,

        /// 1-based episode indices
        #[arg(required = true)]
        episodes: Vec<usize>,
    },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "pcd=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => path,
        None => Config::default_path()?,
    };
    Config::load(&path).with_context(|| format!("Failed to load config {}", path.display()))
}

async fn sync(config: &Config, query: Option<&str>) -> Result<()> {
    let client = ReqwestClient::new();

    let selected: Vec<_> = match query {
        Some(query) => vec![config.find(query)?],
        None => config.podcasts.iter().collect(),
    };

    let mut failed = 0;
    for entry in selected {
        let mut podcast = entry.to_podcast();

        match podcast.sync(&client).await {
            Ok(()) => println!(
                "{SUCCESS}{} {} episodes",
                podcast.name.bold().green(),
                podcast.episodes.len().to_string().cyan()
            ),
            Err(e) => {
                failed += 1;
                println!("{FAILURE}{} {}", podcast.name.bold().red(), e.to_string().red());
                if e.is_cache_stale() {
                    println!("   cache at {} was not updated", podcast.path.display());
                }
            }
        }
    }

    if failed > 0 {
        bail!("{} podcast(s) failed to sync", failed);
    }
    Ok(())
}

fn load_podcast(config: &Config, query: &str) -> Result<Podcast> {
    let mut podcast = config.find(query)?.to_podcast();

    if let Err(e) = podcast.load() {
        if e.kind() == ErrorKind::CacheUnavailable {
            eprintln!("{HINT}Run `pcd sync {}` first", podcast.id);
        }
        return Err(e.into());
    }

    Ok(podcast)
}

async fn download(config: &Config, query: &str, indices: &[usize]) -> Result<()> {
    let podcast = load_podcast(config, query)?;
    let client = ReqwestClient::new();

    let style = ProgressStyle::default_bar()
        .template(&format!(
            "  {DOWNLOAD}[{{bar:30.cyan/blue}}] {{bytes}}/{{total_bytes}} {{wide_msg}}"
        ))?
        .progress_chars("█▓░");

    for &index in indices {
        let episode = podcast
            .episode(index)
            .ok_or_else(|| anyhow!("No episode {} in {}", index, podcast.name))?;

        let bar = ProgressBar::new(episode.length);
        bar.set_style(style.clone());
        bar.set_message(episode.title.clone());

        let mut observer = bar.wrap_async_write(tokio::io::sink());
        let result = episode
            .download(&client, &podcast.path, Some(&mut observer))
            .await;

        match result {
            Ok(done) => {
                bar.finish_and_clear();
                println!(
                    "{SUCCESS}{} → {}",
                    episode.title.green(),
                    done.path.display().to_string().cyan()
                );
            }
            Err(e) => {
                bar.abandon_with_message(format!("{FAILURE}{}", e.to_string().red()));
                return Err(e).with_context(|| format!("Failed to download episode {}", index));
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(args.config)?;

    match args.command {
        Command::Sync { podcast } => sync(&config, podcast.as_deref()).await,
        Command::Ls { podcast } => {
            let podcast = load_podcast(&config, &podcast)?;
            print!("{podcast}");
            Ok(())
        }
        Command::Download { podcast, episodes } => download(&config, &podcast, &episodes).await,
    }
}
