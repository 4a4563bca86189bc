//! Project discovery abstraction layer
//!
//! The sync engine only needs two things from a project listing: how many
//! pages there are and what is on each page. [`Directory`] captures that so
//! the engine can be driven by the GitLab client or by a test double.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::config::SortOrder;
use crate::error::{MirrorError, Result};

/// One project entry from a listing page
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoDescriptor {
    /// SSH clone address, e.g. `git@gitlab.example.com:group/project.git`
    #[serde(rename = "ssh_url_to_repo")]
    pub clone_url: String,
}

impl RepoDescriptor {
    pub fn new(clone_url: impl Into<String>) -> Self {
        Self {
            clone_url: clone_url.into(),
        }
    }

    /// Local directory name for this project
    pub fn local_name(&self) -> Result<String> {
        repo_name_from_clone_url(&self.clone_url)
    }

    /// Where this project lives under `base`
    pub fn local_path(&self, base: &Path) -> Result<PathBuf> {
        Ok(base.join(self.local_name()?))
    }
}

/// Derive a local directory name from a clone address.
///
/// Only the `<prefix>/<name>.<ext>` shape is accepted, which is what GitLab
/// reports for projects owned directly by a user or top-level group
/// (`git@host:group/name.git`). This is positional string handling, not URL
/// parsing: nested groups, HTTPS addresses and addresses without an
/// extension are rejected instead of being given a guessed name.
pub fn repo_name_from_clone_url(clone_url: &str) -> Result<String> {
    let segments: Vec<&str> = clone_url.split('/').collect();

    let segment = match segments.as_slice() {
        [_, segment] => *segment,
        [_] => {
            return Err(MirrorError::Protocol(format!(
                "clone address has no path separator: {}",
                clone_url
            )))
        }
        _ => {
            return Err(MirrorError::Protocol(format!(
                "clone address is not of the form <prefix>/<name>.<ext>: {}",
                clone_url
            )))
        }
    };

    let Some((name, _)) = segment.split_once('.') else {
        return Err(MirrorError::Protocol(format!(
            "clone address has no extension: {}",
            clone_url
        )));
    };

    if name.is_empty() {
        return Err(MirrorError::Protocol(format!(
            "clone address yields an empty name: {}",
            clone_url
        )));
    }

    Ok(name.to_string())
}

/// A paginated project listing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Directory: Send + Sync {
    /// Total number of pages at the given page size
    async fn total_pages(&self, per_page: u32) -> Result<u32>;

    /// Projects on one 1-indexed page
    async fn page(&self, per_page: u32, page: u32, sort: SortOrder) -> Result<Vec<RepoDescriptor>>;
}
