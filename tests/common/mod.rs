//! Common test utilities and helpers for gitlab-mirror tests
#![allow(dead_code)]

use async_trait::async_trait;
use gitlab_mirror::{GitOps, MirrorError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROJECTS_PATH: &str = "/api/v4/projects";

/// Clone address as GitLab reports it for a top-level group project
pub fn ssh_url(name: &str) -> String {
    format!("git@gitlab.example.com:platform/{}.git", name)
}

/// JSON body for one page of the projects listing
pub fn projects_page(names: &[&str]) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = names
        .iter()
        .enumerate()
        .map(|(i, name)| {
            serde_json::json!({
                "id": i + 1,
                "name": name,
                "path": name,
                "ssh_url_to_repo": ssh_url(name),
            })
        })
        .collect();
    serde_json::Value::Array(entries)
}

/// Serve a projects listing with the given pages
pub async fn mount_listing(server: &MockServer, pages: &[&[&str]]) {
    Mock::given(method("HEAD"))
        .and(path(PROJECTS_PATH))
        .respond_with(
            ResponseTemplate::new(200).insert_header("X-Total-Pages", pages.len().to_string().as_str()),
        )
        .mount(server)
        .await;

    for (i, names) in pages.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(PROJECTS_PATH))
            .and(query_param("page", (i + 1).to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(projects_page(names)))
            .mount(server)
            .await;
    }
}

pub fn projects_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), PROJECTS_PATH)
}

/// A git invocation seen by [`RecordingGit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    Clone { url: String, target: PathBuf },
    Pull { dir: PathBuf },
}

/// Fake git that records calls, creates directories on clone and can be
/// told to fail the pull for one directory name
#[derive(Clone, Default)]
pub struct RecordingGit {
    pub calls: Arc<Mutex<Vec<GitCall>>>,
    pub fail_pull_for: Option<String>,
}

impl RecordingGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_pull(name: &str) -> Self {
        Self {
            fail_pull_for: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<GitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clone_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GitCall::Clone { .. }))
            .count()
    }

    pub fn pull_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, GitCall::Pull { .. }))
            .count()
    }
}

#[async_trait]
impl GitOps for RecordingGit {
    async fn clone_repo(&self, clone_url: &str, target: &Path) -> gitlab_mirror::Result<()> {
        self.calls.lock().unwrap().push(GitCall::Clone {
            url: clone_url.to_string(),
            target: target.to_path_buf(),
        });
        std::fs::create_dir_all(target).expect("Failed to create clone directory");
        Ok(())
    }

    async fn pull(&self, repo_dir: &Path) -> gitlab_mirror::Result<()> {
        self.calls.lock().unwrap().push(GitCall::Pull {
            dir: repo_dir.to_path_buf(),
        });

        let name = repo_dir.file_name().map(|n| n.to_string_lossy().into_owned());
        if name.is_some() && name == self.fail_pull_for {
            return Err(MirrorError::Subprocess {
                command: "pull".to_string(),
                dir: repo_dir.to_path_buf(),
                detail: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}
