use std::fmt;

use url::Url;

use crate::error::{AppError, Result};

const PROFILE_BASE_URL: &str = "https://www.instagram.com";

/// A tracked profile: the username keyed in history plus the page URL the providers scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRef {
    pub username: String,
    pub url: String,
}

impl ProfileRef {
    /// Accept a full profile URL, a scheme-less `host/user` path, or a bare (optionally `@`-prefixed) username.
    pub fn parse(identifier: &str) -> Result<Self> {
        let trimmed = identifier.trim();
        if trimmed.is_empty() {
            return Err(AppError::message("profile identifier is empty"));
        }

        if trimmed.contains("://") {
            return Self::from_url(trimmed);
        }
        if trimmed.contains('/') {
            return Self::from_url(&format!("https://{trimmed}"));
        }

        let username = trimmed.trim_start_matches('@');
        if !is_valid_username(username) {
            return Err(AppError::message(format!(
                "`{identifier}` is not a valid username"
            )));
        }

        Ok(Self {
            username: username.to_string(),
            url: format!("{PROFILE_BASE_URL}/{username}/"),
        })
    }

    fn from_url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)?;
        let username = url
            .path_segments()
            .and_then(|mut segments| segments.find(|segment| !segment.is_empty()))
            .map(str::to_string)
            .ok_or_else(|| AppError::message(format!("`{raw}` does not name a profile")))?;

        if !is_valid_username(&username) {
            return Err(AppError::message(format!(
                "`{username}` in `{raw}` is not a valid username"
            )));
        }

        Ok(Self {
            username,
            url: raw.to_string(),
        })
    }
}

impl fmt::Display for ProfileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.username)
    }
}

fn is_valid_username(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_'))
}
