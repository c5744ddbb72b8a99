//! Profile-specific error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::market::filter::FilterError;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("profile {} is corrupted: {reason}", .path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize error: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("invalid filter: {0}")]
    Filter(#[from] FilterError),
}

pub type ProfileResult<T> = Result<T, ProfileError>;
