//! Sync Engine - walks the project listing and mirrors each project
//!
//! Pages are fetched one at a time in ascending order and every project is
//! cloned or pulled before the next one is looked at. The first error stops
//! the run; nothing is retried.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::discovery::{Directory, RepoDescriptor};
use crate::error::Result;
use crate::git::{GitClient, GitOps};
use crate::gitlab::GitLabClient;
use crate::Config;

/// Outcome for one project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResult {
    /// Project had no local directory and was cloned
    Cloned { name: String, path: PathBuf },
    /// Project was already present and was pulled
    Updated { name: String, path: PathBuf },
}

impl SyncResult {
    pub fn name(&self) -> &str {
        match self {
            SyncResult::Cloned { name, .. } | SyncResult::Updated { name, .. } => name,
        }
    }
}

/// Results from a complete sync operation
#[derive(Debug, Clone)]
pub struct SyncSummary {
    pub pages: u32,
    pub total_repositories: usize,
    pub cloned: usize,
    pub updated: usize,
    pub skipped: usize,
    pub duration: Duration,
    pub results: Vec<SyncResult>,
}

impl SyncSummary {
    fn compile(pages: u32, skipped: usize, results: Vec<SyncResult>, duration: Duration) -> Self {
        let cloned = results
            .iter()
            .filter(|r| matches!(r, SyncResult::Cloned { .. }))
            .count();

        Self {
            pages,
            total_repositories: results.len(),
            cloned,
            updated: results.len() - cloned,
            skipped,
            duration,
            results,
        }
    }
}

/// A project as `list` reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedRepo {
    pub name: String,
    pub clone_url: String,
    pub path: PathBuf,
    pub exists_locally: bool,
}

/// Orchestrates the page-by-page, project-by-project mirror pass
pub struct SyncEngine {
    config: Arc<Config>,
    directory: Box<dyn Directory>,
    git: Box<dyn GitOps>,
}

impl SyncEngine {
    pub fn new(config: Config, directory: Box<dyn Directory>, git: Box<dyn GitOps>) -> Self {
        Self {
            config: Arc::new(config),
            directory,
            git,
        }
    }

    /// Build an engine backed by the GitLab API and the `git` binary
    pub fn from_config(config: Config, token: impl Into<String>) -> Result<Self> {
        let directory = GitLabClient::from_config(&config, token)?;
        let git = GitClient::new(config.git_timeout());
        Ok(Self::new(config, Box::new(directory), Box::new(git)))
    }

    /// Mirror every listed project: clone the missing ones, pull the rest
    pub async fn run_sync(&self) -> Result<SyncSummary> {
        let start_time = Instant::now();
        let total_pages = self.directory.total_pages(self.config.gitlab.per_page).await?;

        info!("Mirroring {} page(s) of projects into {}", total_pages, self.config.base_directory);

        let mut results = Vec::new();
        let mut skipped = 0;

        for page in 1..=total_pages {
            let (repos, page_skipped) = self.fetch_page(page).await?;
            skipped += page_skipped;

            for repo in &repos {
                results.push(self.clone_or_update(repo).await?);
            }
        }

        let summary = SyncSummary::compile(total_pages, skipped, results, start_time.elapsed());

        info!(
            "Sync completed in {:.2}s: {} cloned, {} updated, {} skipped",
            summary.duration.as_secs_f64(),
            summary.cloned,
            summary.updated,
            summary.skipped
        );

        Ok(summary)
    }

    /// Walk the listing without touching git
    pub async fn list(&self) -> Result<Vec<ListedRepo>> {
        let total_pages = self.directory.total_pages(self.config.gitlab.per_page).await?;
        let base = self.config.base_path();
        let mut listed = Vec::new();

        for page in 1..=total_pages {
            let (repos, _) = self.fetch_page(page).await?;

            for repo in repos {
                let name = repo.local_name()?;
                let path = base.join(&name);
                listed.push(ListedRepo {
                    exists_locally: path.is_dir(),
                    name,
                    clone_url: repo.clone_url,
                    path,
                });
            }
        }

        Ok(listed)
    }

    /// Clone `repo` if its directory is missing, otherwise pull it
    pub async fn clone_or_update(&self, repo: &RepoDescriptor) -> Result<SyncResult> {
        let name = repo.local_name()?;
        let path = self.config.base_path().join(&name);

        if !path.is_dir() {
            info!("{} doesn't exist locally, cloning", name);
            self.git.clone_repo(&repo.clone_url, &path).await?;
            Ok(SyncResult::Cloned { name, path })
        } else {
            info!("{} already exists, updating", name);
            self.git.pull(&path).await?;
            Ok(SyncResult::Updated { name, path })
        }
    }

    /// Fetch one page and drop the entries that are never mirrored.
    /// Returns the remaining projects and how many were dropped.
    async fn fetch_page(&self, page: u32) -> Result<(Vec<RepoDescriptor>, usize)> {
        let gitlab = &self.config.gitlab;
        let mut repos = self.directory.page(gitlab.per_page, page, gitlab.sort).await?;

        let skip = skip_count(page, self.config.sync.skip_first_project).min(repos.len());
        if skip > 0 {
            debug!("Skipping {:?} on page {}", &repos[..skip], page);
        }
        repos.drain(..skip);

        Ok((repos, skip))
    }
}

/// Leading entries of `page` that are not mirrored. GitLab lists its own
/// administrative project first, so only the very first entry of page 1 goes.
fn skip_count(page: u32, skip_first_project: bool) -> usize {
    if skip_first_project && page == 1 {
        1
    } else {
        0
    }
}
