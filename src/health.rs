//! System health checks for gitlab-mirror
//!
//! Backs the `doctor` command: verifies git, the access token, the base
//! directory and the GitLab API before a real run is attempted.

use std::path::Path;

use crate::gitlab::GitLabClient;
use crate::Config;

/// Result of system health checks
#[derive(Debug, Clone)]
pub struct HealthCheck {
    /// Git installation status
    pub git: CheckResult,
    /// Access token presence (warning only, the API has the final say)
    pub token: CheckResult,
    /// Base directory status
    pub base_dir: CheckResult,
    /// GitLab projects API status
    pub api: CheckResult,
}

/// Result of an individual health check
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
    pub is_warning: bool,
}

impl CheckResult {
    fn ok_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
            is_warning: false,
        }
    }

    fn error_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Some(details.into()),
            is_warning: false,
        }
    }

    fn warning_with_details(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: Some(details.into()),
            is_warning: true,
        }
    }
}

impl HealthCheck {
    /// Run all health checks. `token` is the credential as read at startup.
    pub async fn run(config: &Config, token: &str) -> Self {
        Self {
            git: Self::check_git(),
            token: Self::check_token(config, token),
            base_dir: Self::check_base_dir(config),
            api: Self::check_api(config, token).await,
        }
    }

    /// Check if all required checks passed (excludes warnings)
    pub fn all_passed(&self) -> bool {
        self.git.passed && self.token.passed && self.base_dir.passed && self.api.passed
    }

    /// Get list of warnings
    pub fn warnings(&self) -> Vec<&CheckResult> {
        [&self.git, &self.token, &self.base_dir, &self.api]
            .into_iter()
            .filter(|r| r.is_warning)
            .collect()
    }

    /// Check git installation
    fn check_git() -> CheckResult {
        match std::process::Command::new("git").arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                CheckResult::ok_with_details("Git installed", version.trim().to_string())
            }
            Ok(output) => CheckResult::error_with_details(
                "Git command failed",
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ),
            Err(_) => CheckResult::error_with_details(
                "Git not found in PATH",
                "Install git: https://git-scm.com/downloads",
            ),
        }
    }

    fn check_token(config: &Config, token: &str) -> CheckResult {
        if token.is_empty() {
            CheckResult::warning_with_details(
                format!("{} is not set", config.gitlab.token_env),
                "Requests will be unauthenticated. Create a read_api token as an admin to see every project.",
            )
        } else {
            CheckResult::ok_with_details(
                format!("{} is set", config.gitlab.token_env),
                format!("{} characters", token.len()),
            )
        }
    }

    /// Check base directory exists
    fn check_base_dir(config: &Config) -> CheckResult {
        let path = Path::new(&config.base_directory);
        if path.is_dir() {
            CheckResult::ok_with_details("Base directory exists", config.base_directory.clone())
        } else {
            CheckResult::error_with_details(
                "Base directory does not exist",
                format!("Run: mkdir -p {}", config.base_directory),
            )
        }
    }

    async fn check_api(config: &Config, token: &str) -> CheckResult {
        let client = match GitLabClient::from_config(config, token) {
            Ok(client) => client,
            Err(e) => return CheckResult::error_with_details("Could not build HTTP client", e.to_string()),
        };

        match client.get_total_pages(config.gitlab.per_page).await {
            Ok(pages) => CheckResult::ok_with_details(
                "GitLab API reachable",
                format!("{} lists {} page(s) of {} projects", client.url(), pages, config.gitlab.per_page),
            ),
            Err(e) => CheckResult::error_with_details("GitLab API check failed", e.to_string()),
        }
    }

    /// Get all checks as a slice for iteration
    pub fn all_checks(&self) -> [(&'static str, &CheckResult); 4] {
        [
            ("Git Installation", &self.git),
            ("Access Token", &self.token),
            ("Base Directory", &self.base_dir),
            ("GitLab API", &self.api),
        ]
    }
}
