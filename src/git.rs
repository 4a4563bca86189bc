use async_trait::async_trait;
use std::path::Path;
use std::process::Output;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tokio::time::timeout;
use tracing::debug;

use crate::error::{MirrorError, Result};

/// The two git operations a mirror run needs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GitOps: Send + Sync {
    /// Clone `clone_url` into the new directory `target`
    async fn clone_repo(&self, clone_url: &str, target: &Path) -> Result<()>;

    /// Pull the current branch of the existing clone at `repo_dir`
    async fn pull(&self, repo_dir: &Path) -> Result<()>;
}

/// Runs the `git` binary with captured output
#[derive(Debug, Clone)]
pub struct GitClient {
    timeout: Duration,
}

impl GitClient {
    /// Create a git client whose subprocesses are killed after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, args: &[&str], dir: &Path) -> Result<Output> {
        let command = args.first().copied().unwrap_or_default().to_string();
        debug!("Running git {} in {}", args.join(" "), dir.display());

        let child = AsyncCommand::new("git")
            .args(args)
            .current_dir(dir)
            .kill_on_drop(true)
            .output();

        let output = match timeout(self.timeout, child).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(MirrorError::Subprocess {
                    command,
                    dir: dir.to_path_buf(),
                    detail: format!("could not run git: {}", e),
                })
            }
            Err(_) => {
                return Err(MirrorError::Subprocess {
                    command,
                    dir: dir.to_path_buf(),
                    detail: format!("timed out after {}s", self.timeout.as_secs()),
                })
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MirrorError::Subprocess {
                command,
                dir: dir.to_path_buf(),
                detail: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(output)
    }
}

#[async_trait]
impl GitOps for GitClient {
    async fn clone_repo(&self, clone_url: &str, target: &Path) -> Result<()> {
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let Some(name) = target.file_name() else {
            return Err(MirrorError::Subprocess {
                command: "clone".to_string(),
                dir: target.to_path_buf(),
                detail: "target has no directory name".to_string(),
            });
        };

        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MirrorError::Subprocess {
                command: "clone".to_string(),
                dir: parent.to_path_buf(),
                detail: format!("could not create parent directory: {}", e),
            })?;

        let name = name.to_string_lossy();
        self.run(&["clone", clone_url, name.as_ref()], parent).await?;
        Ok(())
    }

    async fn pull(&self, repo_dir: &Path) -> Result<()> {
        self.run(&["pull"], repo_dir).await?;
        Ok(())
    }
}
