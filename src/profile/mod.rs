//! Persisted watch-list and display settings.
//!
//! Stored as YAML at the profile path. Keys use the PascalCase names older
//! JSON profiles were written with (`Tickers`, `Filter`, `SortColumn`,
//! `Ascending`, `Grouped`); since JSON is valid YAML those files load as-is,
//! and unknown keys are ignored.
//!
//! Every mutation is written through immediately. If the write fails the
//! in-memory profile is rolled back so it never disagrees with what the user
//! last saw succeed.

pub mod error;
pub mod recovery;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::market::filter::FilterExpr;
use crate::market::Column;

pub use error::{ProfileError, ProfileResult};

/// Watch-list a fresh profile starts with.
pub const DEFAULT_TICKERS: [&str; 7] = ["AAPL", "C", "GOOG", "IBM", "KO", "ORCL", "V"];

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    #[serde(default)]
    pub tickers: Vec<String>,
    #[serde(default)]
    filter: String,
    /// Index into [`Column::ALL`].
    #[serde(default)]
    sort_column: usize,
    #[serde(default = "default_true")]
    pub ascending: bool,
    #[serde(default)]
    pub grouped: bool,

    #[serde(skip)]
    path: PathBuf,
    #[serde(skip)]
    filter_expr: Option<FilterExpr>,
}

impl Profile {
    /// Load the profile at `path`.
    ///
    /// A missing file yields a fresh default profile (written to `path`).
    /// A file that exists but cannot be read or parsed is [`ProfileError::Corrupt`].
    pub fn load(path: &Path) -> ProfileResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no profile found, creating default");
                return Self::reinitialize(path);
            }
            Err(e) => return Err(corrupt(path, e)),
        };
        if text.trim().is_empty() {
            return Err(corrupt(path, "file is empty"));
        }

        let mut profile: Profile = serde_yaml::from_str(&text).map_err(|e| corrupt(path, e))?;
        profile.path = path.to_path_buf();
        profile.tickers = normalize(&profile.tickers);

        if !profile.filter.is_empty() {
            match FilterExpr::parse(&profile.filter) {
                Ok(expr) => profile.filter_expr = Some(expr),
                Err(e) => {
                    warn!(filter = %profile.filter, "dropping stored filter: {e}");
                    profile.filter.clear();
                }
            }
        }

        info!(path = %path.display(), tickers = profile.tickers.len(), "profile loaded");
        Ok(profile)
    }

    /// Replace whatever is at `path` with the default profile.
    pub fn reinitialize(path: &Path) -> ProfileResult<Self> {
        let profile = Self {
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            filter: String::new(),
            sort_column: Column::Ticker.index(),
            ascending: true,
            grouped: false,
            path: path.to_path_buf(),
            filter_expr: None,
        };
        profile.save()?;
        Ok(profile)
    }

    /// Write the profile back to its path.
    pub fn save(&self) -> ProfileResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The filter text as the user typed it; empty when unset.
    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn filter_expr(&self) -> Option<&FilterExpr> {
        self.filter_expr.as_ref()
    }

    pub fn sort_column(&self) -> Column {
        Column::from_index(self.sort_column)
    }

    /// Add tickers not already listed. Returns how many were added.
    pub fn add_tickers(&mut self, tickers: &[String]) -> ProfileResult<usize> {
        let fresh: Vec<String> = normalize(tickers)
            .into_iter()
            .filter(|t| !self.tickers.contains(t))
            .collect();
        if fresh.is_empty() {
            return Ok(0);
        }
        let added = fresh.len();
        self.update(|p| {
            p.tickers.extend(fresh);
            p.tickers.sort();
        })?;
        Ok(added)
    }

    /// Remove listed tickers. Returns how many were removed.
    pub fn remove_tickers(&mut self, tickers: &[String]) -> ProfileResult<usize> {
        let doomed = normalize(tickers);
        let before = self.tickers.len();
        let kept: Vec<String> = self
            .tickers
            .iter()
            .filter(|t| !doomed.contains(t))
            .cloned()
            .collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }
        self.update(|p| p.tickers = kept)?;
        Ok(removed)
    }

    /// Set (or with empty input, clear) the filter expression.
    ///
    /// An expression that fails to compile leaves the current filter in place.
    pub fn set_filter(&mut self, text: &str) -> ProfileResult<()> {
        let text = text.trim();
        let expr = if text.is_empty() {
            None
        } else {
            Some(FilterExpr::parse(text)?)
        };
        self.update(|p| {
            p.filter = text.to_string();
            p.filter_expr = expr;
        })
    }

    /// Toggle grouping by advancing/declining issues.
    pub fn regroup(&mut self) -> ProfileResult<()> {
        self.update(|p| p.grouped = !p.grouped)
    }

    /// Sort by `column`; choosing the current sort column flips the direction.
    pub fn reorder(&mut self, column: Column) -> ProfileResult<()> {
        self.update(|p| {
            if p.sort_column() == column {
                p.ascending = !p.ascending;
            } else {
                p.sort_column = column.index();
                p.ascending = true;
            }
        })
    }

    /// Apply `change`, persist, and roll back if persisting fails.
    fn update(&mut self, change: impl FnOnce(&mut Self)) -> ProfileResult<()> {
        let before = self.clone();
        change(self);
        if let Err(e) = self.save() {
            *self = before;
            return Err(e);
        }
        Ok(())
    }
}

fn corrupt(path: &Path, err: impl std::fmt::Display) -> ProfileError {
    ProfileError::Corrupt {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

/// Upper-case, trim, drop empties and duplicates; first occurrence wins.
fn normalize(tickers: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tickers.len());
    for t in tickers {
        let t = t.trim().to_uppercase();
        if !t.is_empty() && !out.contains(&t) {
            out.push(t);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn missing_file_creates_default() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile");
        let p = Profile::load(&path).unwrap();
        assert_eq!(p.tickers, strings(&DEFAULT_TICKERS));
        assert!(p.ascending);
        assert!(!p.grouped);
        assert_eq!(p.sort_column(), Column::Ticker);
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile");
        let mut p = Profile::reinitialize(&path).unwrap();
        p.add_tickers(&strings(&["msft"])).unwrap();
        p.set_filter("last > 10").unwrap();
        p.reorder(Column::Volume).unwrap();
        p.regroup().unwrap();

        let back = Profile::load(&path).unwrap();
        assert!(back.tickers.contains(&"MSFT".to_string()));
        assert_eq!(back.filter(), "last > 10");
        assert!(back.filter_expr().is_some());
        assert_eq!(back.sort_column(), Column::Volume);
        assert!(back.grouped);
    }

    #[test]
    fn legacy_json_profile_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile");
        std::fs::write(
            &path,
            r#"{"Tickers": ["ibm", "KO"], "MarketRefresh": 12, "QuotesRefresh": 5,
               "Grouped": true, "Filter": "", "SortColumn": 2, "Ascending": false}"#,
        )
        .unwrap();
        let p = Profile::load(&path).unwrap();
        assert_eq!(p.tickers, strings(&["IBM", "KO"]));
        assert!(p.grouped);
        assert!(!p.ascending);
        assert_eq!(p.sort_column(), Column::Change);
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile");
        std::fs::write(&path, "{ this is: [not valid").unwrap();
        let err = Profile::load(&path).unwrap_err();
        assert!(matches!(err, ProfileError::Corrupt { .. }));
        // Loading never rewrites a corrupted file.
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ this is: [not valid");
    }

    #[test]
    fn empty_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile");
        for text in ["", "  \n\t\n"] {
            fs::write(&path, text).unwrap();
            let err = Profile::load(&path).unwrap_err();
            assert!(matches!(err, ProfileError::Corrupt { .. }));
            assert_eq!(fs::read_to_string(&path).unwrap(), text);
        }
    }

    #[test]
    fn deeply_nested_stored_filter_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile");
        let filter = format!("{}last > 1{}", "(".repeat(10_000), ")".repeat(10_000));
        fs::write(&path, format!("Tickers: [IBM]\nFilter: '{filter}'\n")).unwrap();
        let p = Profile::load(&path).unwrap();
        assert_eq!(p.tickers, vec!["IBM".to_string()]);
        assert_eq!(p.filter(), "");
    }

    #[test]
    fn invalid_stored_filter_dropped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("profile");
        std::fs::write(&path, "Tickers: [IBM]\nFilter: 'last >'\n").unwrap();
        let p = Profile::load(&path).unwrap();
        assert_eq!(p.filter(), "");
        assert!(p.filter_expr().is_none());
    }

    #[test]
    fn add_tickers_dedupes_and_sorts() {
        let dir = TempDir::new().unwrap();
        let mut p = Profile::reinitialize(&dir.path().join("p")).unwrap();
        let added = p.add_tickers(&strings(&["zzz", "aapl", "ZZZ", " "])).unwrap();
        assert_eq!(added, 1);
        assert_eq!(p.tickers.last().map(String::as_str), Some("ZZZ"));
        let mut sorted = p.tickers.clone();
        sorted.sort();
        assert_eq!(p.tickers, sorted);
    }

    #[test]
    fn remove_tickers_counts() {
        let dir = TempDir::new().unwrap();
        let mut p = Profile::reinitialize(&dir.path().join("p")).unwrap();
        assert_eq!(p.remove_tickers(&strings(&["ibm", "nope"])).unwrap(), 1);
        assert!(!p.tickers.contains(&"IBM".to_string()));
        assert_eq!(p.remove_tickers(&strings(&["nope"])).unwrap(), 0);
    }

    #[test]
    fn invalid_filter_keeps_previous() {
        let dir = TempDir::new().unwrap();
        let mut p = Profile::reinitialize(&dir.path().join("p")).unwrap();
        p.set_filter("change > 0").unwrap();
        assert!(matches!(
            p.set_filter("change >>").unwrap_err(),
            ProfileError::Filter(_)
        ));
        assert_eq!(p.filter(), "change > 0");
        p.set_filter("   ").unwrap();
        assert_eq!(p.filter(), "");
        assert!(p.filter_expr().is_none());
    }

    #[test]
    fn reorder_flips_on_same_column() {
        let dir = TempDir::new().unwrap();
        let mut p = Profile::reinitialize(&dir.path().join("p")).unwrap();
        p.reorder(Column::Ticker).unwrap();
        assert!(!p.ascending);
        p.reorder(Column::Last).unwrap();
        assert_eq!(p.sort_column(), Column::Last);
        assert!(p.ascending);
    }

    #[test]
    fn failed_save_rolls_back() {
        let dir = TempDir::new().unwrap();
        let mut p = Profile::reinitialize(&dir.path().join("p")).unwrap();
        // Parent "directory" is a regular file, so every save fails.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();
        p.path = blocker.join("profile");

        assert!(p.regroup().is_err());
        assert!(!p.grouped);
        assert!(p.add_tickers(&strings(&["NEW"])).is_err());
        assert!(!p.tickers.contains(&"NEW".to_string()));
    }
}
