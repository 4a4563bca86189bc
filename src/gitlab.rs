use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{Config, SortOrder};
use crate::discovery::{Directory, RepoDescriptor};
use crate::error::{MirrorError, Result};

/// Header GitLab uses to report the page count of a listing
pub const TOTAL_PAGES_HEADER: &str = "X-Total-Pages";

/// Header carrying a personal/project access token
const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// Client for the GitLab projects listing API
pub struct GitLabClient {
    client: Client,
    url: String,
    token: String,
}

impl GitLabClient {
    /// Create a client for `url` (the projects endpoint) authenticating with `token`.
    ///
    /// The token is not validated here; an empty or wrong token shows up as a
    /// 401 from the first request.
    pub fn new(url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("gitlab-mirror/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            token: token.into(),
        })
    }

    /// Create a client from configuration and an already-resolved token
    pub fn from_config(config: &Config, token: impl Into<String>) -> Result<Self> {
        Self::new(&config.gitlab.url, token, config.request_timeout())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Number of pages the projects listing has at `per_page` entries per page
    pub async fn get_total_pages(&self, per_page: u32) -> Result<u32> {
        debug!("Requesting page count from {} (per_page={})", self.url, per_page);

        let response = self
            .client
            .head(&self.url)
            .header(TOKEN_HEADER, &self.token)
            .query(&[("per_page", per_page)])
            .send()
            .await?;
        let response = check_status(response)?;

        let value = response
            .headers()
            .get(TOTAL_PAGES_HEADER)
            .ok_or_else(|| {
                MirrorError::Protocol(format!("{} header missing from response", TOTAL_PAGES_HEADER))
            })?;

        let total = value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<u32>().ok())
            .ok_or_else(|| {
                MirrorError::Protocol(format!(
                    "{} header is not a number: {:?}",
                    TOTAL_PAGES_HEADER, value
                ))
            })?;

        info!("GitLab reports {} page(s) of projects", total);
        Ok(total)
    }

    /// Fetch one page of the projects listing
    pub async fn get_page(
        &self,
        per_page: u32,
        page: u32,
        sort: SortOrder,
    ) -> Result<Vec<RepoDescriptor>> {
        debug!("Fetching projects page {} (per_page={}, sort={})", page, per_page, sort.as_str());

        let response = self
            .client
            .get(&self.url)
            .header(TOKEN_HEADER, &self.token)
            .query(&[
                ("per_page", per_page.to_string()),
                ("page", page.to_string()),
                ("sort", sort.as_str().to_string()),
            ])
            .send()
            .await?;
        let response = check_status(response)?;

        let body = response.text().await?;
        let repos: Vec<RepoDescriptor> = serde_json::from_str(&body).map_err(|e| {
            MirrorError::Protocol(format!("projects page {} is not a list of projects: {}", page, e))
        })?;

        debug!("Page {} lists {} project(s)", page, repos.len());
        Ok(repos)
    }
}

fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(MirrorError::Transport(format!(
            "{} returned {}",
            response.url(),
            status
        )))
    }
}

#[async_trait]
impl Directory for GitLabClient {
    async fn total_pages(&self, per_page: u32) -> Result<u32> {
        self.get_total_pages(per_page).await
    }

    async fn page(&self, per_page: u32, page: u32, sort: SortOrder) -> Result<Vec<RepoDescriptor>> {
        self.get_page(per_page, page, sort).await
    }
}
