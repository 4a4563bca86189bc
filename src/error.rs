use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, MirrorError>;

/// Failures that abort a mirror run
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Network failure or non-success status from the GitLab API
    #[error("GitLab API request failed: {0}")]
    Transport(String),

    /// The API answered with something other than what we expect
    #[error("Unexpected GitLab API response: {0}")]
    Protocol(String),

    /// `git` exited non-zero, could not be started, or timed out
    #[error("git {command} failed in {path}: {detail}", path = dir.display())]
    Subprocess {
        command: String,
        dir: PathBuf,
        detail: String,
    },
}

impl From<reqwest::Error> for MirrorError {
    fn from(err: reqwest::Error) -> Self {
        MirrorError::Transport(err.to_string())
    }
}
