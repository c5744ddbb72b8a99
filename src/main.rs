use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use marketdeck::config::{normalize_legacy_flags, Settings};
use marketdeck::market::feed::HttpFeed;
use marketdeck::profile::recovery::{confirm_overwrite, read_single_key, Recovery};
use marketdeck::profile::{Profile, ProfileError};
use marketdeck::tui::runner::run_dashboard;

#[derive(Parser)]
#[command(
    name = "marketdeck",
    about = "Live market and stock quotes in your terminal."
)]
struct Cli {
    /// Profile file (defaults to ~/.marketdeckrc). `-profile` also works.
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Write logs to this file (or set MARKETDECK_LOG)
    #[arg(long)]
    log: Option<PathBuf>,

    /// Quote service base URL (or set MARKETDECK_FEED_URL)
    #[arg(long)]
    feed_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_legacy_flags(std::env::args_os()));
    let settings = Settings::resolve(cli.profile, cli.log, cli.feed_url)?;
    init_logging(settings.log_path.as_deref())?;

    info!(
        profile = %settings.profile_path.display(),
        feed = %settings.feed_url,
        "marketdeck starting"
    );

    let profile = match Profile::load(&settings.profile_path) {
        Ok(profile) => profile,
        Err(err @ ProfileError::Corrupt { .. }) => recover(&settings.profile_path, &err)?,
        Err(err) => return Err(err.into()),
    };

    let feed = HttpFeed::new(settings.feed_url)?;
    let profile = run_dashboard(profile, feed).await?;
    profile.save().context("saving profile")?;

    info!("marketdeck stopped");
    Ok(())
}

/// Ask on the terminal whether to replace a corrupted profile.
/// Declining exits with status 1 and leaves the file untouched.
fn recover(path: &Path, error: &ProfileError) -> Result<Profile> {
    warn!(error = %error, "profile corrupted");
    match confirm_overwrite(&mut io::stderr(), path, error, read_single_key)? {
        Recovery::Reinitialize => Ok(Profile::reinitialize(path)?),
        Recovery::Abort => {
            info!("keeping corrupted profile, exiting");
            std::process::exit(1);
        }
    }
}

/// Logs go to a file when one is configured. The dashboard owns the
/// terminal, so otherwise they are discarded.
fn init_logging(path: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive("marketdeck=info".parse()?);
    match path {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init();
        }
    }
    Ok(())
}
