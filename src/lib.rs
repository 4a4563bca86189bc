//! gitlab-mirror - keep a local clone of every project on a GitLab server
//!
//! The projects API is walked page by page; each project is cloned into the
//! base directory, or pulled if its directory already exists.
//!
//! ## Modules
//!
//! - [`config`]: Configuration management and parsing
//! - [`gitlab`]: GitLab projects API client
//! - [`discovery`]: Listing abstraction and local name derivation
//! - [`git`]: `git clone` / `git pull` subprocesses
//! - [`sync`]: The mirror pass itself
//! - [`health`]: Preflight checks for the `doctor` command

pub mod config;
pub mod discovery;
pub mod error;
pub mod git;
pub mod gitlab;
pub mod health;
pub mod sync;

pub use config::Config;
pub use discovery::{repo_name_from_clone_url, Directory, RepoDescriptor};
pub use error::{MirrorError, Result};
pub use git::{GitClient, GitOps};
pub use gitlab::GitLabClient;
pub use health::HealthCheck;
pub use sync::{ListedRepo, SyncEngine, SyncResult, SyncSummary};
