use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, StatusCode};
use url::Url;

use crate::config::Config;
use crate::error::{AppError, Context, Result};

use super::decode::{exact_count_from_body, followers_from_description, meta_description};
use super::{FetchOutcome, FetchResult, FollowerProvider, SessionState, ERROR_SENTINEL_PREFIX};

const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// Scrapes profile pages over HTTP, optionally replaying a saved browser session.
pub struct WebFollowerProvider {
    client: Client,
    session_file: PathBuf,
}

impl WebFollowerProvider {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.fetch_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to construct profile HTTP client")?;

        Ok(Self {
            client,
            session_file: config.session_file.clone(),
        })
    }

    async fn load_page(&self, url: &str, cookie: Option<&str>) -> FetchResult<String> {
        let mut request = self
            .client
            .get(url)
            .header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE);
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Profile request failed for {url}"))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::message(format!(
                "Profile request for {url} was blocked ({status})"
            )));
        }
        if !status.is_success() {
            return Err(AppError::message(format!(
                "Profile request for {url} failed with status {status}"
            )));
        }

        Ok(response.text().await?)
    }

    async fn public_count(&self, url: &str) -> FetchResult<String> {
        let body = self.load_page(url, None).await?;
        let count = meta_description(&body)
            .as_deref()
            .and_then(followers_from_description)
            .unwrap_or_else(|| {
                log::debug!("no follower figure in public metadata for {url}");
                0
            });
        Ok(count.to_string())
    }

    /// `Ok(None)` when there is no usable session to replay.
    async fn session_count(&self, url: &str) -> FetchResult<Option<u64>> {
        let Some(session) = SessionState::load(&self.session_file)? else {
            log::debug!(
                "no session file at {}, using public page",
                self.session_file.display()
            );
            return Ok(None);
        };

        let parsed = Url::parse(url)?;
        let host = parsed
            .host_str()
            .ok_or_else(|| AppError::message(format!("{url} has no host")))?;
        let Some(cookie) = session.cookie_header(host, Utc::now()) else {
            log::debug!("session holds no live cookies for {host}");
            return Ok(None);
        };

        let body = self.load_page(url, Some(&cookie)).await?;
        exact_count_from_body(&body)
            .map(Some)
            .ok_or_else(|| {
                AppError::message(format!("signed-in page for {url} has no follower count"))
            })
    }
}

#[async_trait]
impl FollowerProvider for WebFollowerProvider {
    async fn fetch_approximate(&self, profile_url: &str) -> String {
        match self.public_count(profile_url).await {
            Ok(count) => count,
            Err(err) => {
                log::warn!("public fetch failed for {profile_url}: {err}");
                format!("{ERROR_SENTINEL_PREFIX}{err}")
            }
        }
    }

    async fn fetch_exact(&self, profile_url: &str) -> FetchOutcome {
        match self.session_count(profile_url).await {
            Ok(Some(count)) => FetchOutcome::exact(count.to_string()),
            Ok(None) => FetchOutcome::approximate(self.fetch_approximate(profile_url).await),
            Err(err) => {
                log::warn!("signed-in fetch failed for {profile_url}, using public page: {err}");
                FetchOutcome::approximate(self.fetch_approximate(profile_url).await)
            }
        }
    }
}
