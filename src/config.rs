use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure for gitlab-mirror
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    /// Directory that receives one clone per project
    #[serde(default = "default_base_directory")]
    pub base_directory: String,

    /// GitLab API settings
    #[serde(default)]
    pub gitlab: GitLabConfig,

    /// Clone/pull behaviour
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// GitLab API configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GitLabConfig {
    /// Projects endpoint, e.g. https://gitlab.example.com/api/v4/projects
    #[serde(default = "default_gitlab_url")]
    pub url: String,

    /// Environment variable holding the read_api access token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Projects requested per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Sort direction passed to the API
    #[serde(default)]
    pub sort: SortOrder,

    /// Timeout for each API request in seconds
    #[serde(default = "default_request_timeout")]
    pub timeout: u64,
}

/// Synchronization configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SyncConfig {
    /// Drop the first project of the first page. On a stock GitLab install
    /// that slot holds the internal "Monitoring" project.
    #[serde(default = "default_true")]
    pub skip_first_project: bool,

    /// Timeout for git operations in seconds
    #[serde(default = "default_git_timeout")]
    pub timeout: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String, // "info"
}

/// Sort order accepted by the projects API
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

// Default value functions
fn default_base_directory() -> String {
    ".".to_string()
}
fn default_gitlab_url() -> String {
    "https://your-gitlab-domain.com/api/v4/projects".to_string()
}
fn default_token_env() -> String {
    "GITLAB_READ_API_TOKEN".to_string()
}
fn default_per_page() -> u32 {
    100
}
fn default_request_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_git_timeout() -> u64 {
    300
}
fn default_log_level() -> String {
    "info".to_string()
}

// Default implementations
impl Default for GitLabConfig {
    fn default() -> Self {
        Self {
            url: default_gitlab_url(),
            token_env: default_token_env(),
            per_page: default_per_page(),
            sort: SortOrder::default(),
            timeout: default_request_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            skip_first_project: default_true(),
            timeout: default_git_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from the default location or create a default config.
    /// The second value is the path written when a default config was created.
    pub fn load_or_default() -> Result<(Self, Option<PathBuf>)> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Ok((Self::load(&config_path)?, None))
        } else {
            let config = Self::default();

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
            }

            config.save(&config_path)?;
            Ok((config, Some(config_path)))
        }
    }

    /// Load configuration from a specific file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.expand_paths()?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    /// Get the default configuration file path (XDG compliant)
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = config_dir().context("Failed to get user config directory")?;

        Ok(config_dir.join("gitlab-mirror").join("config.yml"))
    }

    /// Expand environment variables in configuration paths
    pub fn expand_paths(&mut self) -> Result<()> {
        self.base_directory = shellexpand::full(&self.base_directory)
            .context("Failed to expand base_directory path")?
            .into_owned();

        Ok(())
    }

    pub fn base_path(&self) -> PathBuf {
        PathBuf::from(&self.base_directory)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.gitlab.timeout)
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.sync.timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_directory: default_base_directory(),
            gitlab: GitLabConfig::default(),
            sync: SyncConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
