//! Runtime settings: where the profile lives, where logs go, which feed to poll.
//!
//! Resolution order for each setting: CLI flag → environment → default.
//!
//! - profile: `--profile` → `$HOME/.marketdeckrc`
//! - log file: `--log` → `MARKETDECK_LOG` → none (logs discarded)
//! - feed URL: `--feed-url` → `MARKETDECK_FEED_URL` → Yahoo quote endpoint

use std::ffi::OsString;
use std::path::PathBuf;

use thiserror::Error;

/// File name in the user's home directory where the profile is stored.
pub const DEFAULT_PROFILE: &str = ".marketdeckrc";

/// Default quote endpoint base URL.
pub const DEFAULT_FEED_URL: &str = "https://query1.finance.yahoo.com";

const LOG_ENV: &str = "MARKETDECK_LOG";
const FEED_URL_ENV: &str = "MARKETDECK_FEED_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot determine the current user's home directory")]
    NoHomeDir,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub profile_path: PathBuf,
    pub log_path: Option<PathBuf>,
    pub feed_url: String,
}

impl Settings {
    /// Resolve settings from explicit flags, falling back to env and defaults.
    ///
    /// The home directory is only consulted when no profile path was given.
    pub fn resolve(
        profile: Option<PathBuf>,
        log: Option<PathBuf>,
        feed_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let profile_path = match profile {
            Some(path) => path,
            None => default_profile_path()?,
        };
        let log_path = log.or_else(|| std::env::var_os(LOG_ENV).map(PathBuf::from));
        let feed_url = feed_url
            .or_else(|| std::env::var(FEED_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

        Ok(Self {
            profile_path,
            log_path,
            feed_url: feed_url.trim_end_matches('/').to_string(),
        })
    }
}

/// `$HOME/.marketdeckrc` (or `%USERPROFILE%` on Windows).
pub fn default_profile_path() -> Result<PathBuf, ConfigError> {
    home_dir()
        .map(|home| home.join(DEFAULT_PROFILE))
        .ok_or(ConfigError::NoHomeDir)
}

fn home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    let var = "USERPROFILE";
    #[cfg(not(windows))]
    let var = "HOME";

    std::env::var_os(var)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Rewrite the single-dash `-profile` spelling into `--profile` so clap accepts it.
///
/// Both `-profile <path>` and `-profile=<path>` are recognised; every other
/// argument passes through untouched.
pub fn normalize_legacy_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-profile") => OsString::from("--profile"),
            Some(s) if s.starts_with("-profile=") => OsString::from(format!("-{s}")),
            _ => arg,
        })
        .collect()
}
