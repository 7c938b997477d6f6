use std::future::Future;

use anyhow::{Context, Result};
use reqwest::{Client, Url};
use tracing::debug;

use crate::error::LookupError;
use crate::models::Profile;

/// Anything that can resolve a username into a profile.
pub trait ProfileSource: Send + Sync + 'static {
    fn fetch_profile(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Profile, LookupError>> + Send;
}

/// Client for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: Client,
    base_url: Url,
}

impl GitHubClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid API base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL cannot carry a path: {base_url}");
        }

        Ok(Self {
            http: build_client()?,
            base_url,
        })
    }

    /// The underlying HTTP client, shared with the avatar downloader.
    pub fn http(&self) -> &Client {
        &self.http
    }

    fn user_url(&self, username: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("users").push(username);
        }
        url
    }
}

impl ProfileSource for GitHubClient {
    /// Fetches a GitHub user by username.
    async fn fetch_profile(&self, username: &str) -> Result<Profile, LookupError> {
        let url = self.user_url(username);
        debug!("GET {url}");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(LookupError::Network)?;

        let status = response.status();
        if !status.is_success() {
            debug!("GitHub answered {status} for {username}");
            return Err(LookupError::NotFound);
        }

        response.json::<Profile>().await.map_err(LookupError::Decode)
    }
}

/// Creates a preconfigured HTTP client with required headers.
fn build_client() -> Result<Client> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};

    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static("profile-finder"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github.v3+json"));

    Client::builder()
        .default_headers(headers)
        .build()
        .context("Failed to build HTTP client")
}
