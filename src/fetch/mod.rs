use async_trait::async_trait;

use crate::error::Result;

pub mod decode;
pub mod selector;
pub mod session;
pub mod web;

pub use decode::normalize_count;
pub use selector::{FetchSelector, FetchState};
pub use session::SessionState;
pub use web::WebFollowerProvider;

/// Prefix of the sentinel string providers return instead of raising.
pub const ERROR_SENTINEL_PREFIX: &str = "Error: ";

pub type FetchResult<T> = Result<T>;

#[inline]
pub fn ensure_concurrency_limit(limit: usize) -> usize {
    limit.max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Signed-in scrape using the persisted session.
    Exact,
    /// Public page metadata, usually rounded.
    Approximate,
}

impl FetchMode {
    pub fn label(self) -> &'static str {
        match self {
            FetchMode::Exact => "exact",
            FetchMode::Approximate => "approximate",
        }
    }
}

/// Raw provider output together with the path that actually produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub raw: String,
    pub served_by: FetchMode,
}

impl FetchOutcome {
    pub fn exact(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            served_by: FetchMode::Exact,
        }
    }

    pub fn approximate(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            served_by: FetchMode::Approximate,
        }
    }

    pub fn sentinel(reason: impl std::fmt::Display) -> Self {
        Self::approximate(format!("{ERROR_SENTINEL_PREFIX}{reason}"))
    }

    pub fn is_sentinel(&self) -> bool {
        self.raw.starts_with(ERROR_SENTINEL_PREFIX)
    }
}

/// Source of follower counts. Implementations never fail: problems surface as sentinel strings.
#[async_trait]
pub trait FollowerProvider: Send + Sync {
    /// Best-effort count from the public profile page.
    async fn fetch_approximate(&self, profile_url: &str) -> String;

    /// Count from a signed-in session, falling back to [`fetch_approximate`](Self::fetch_approximate)
    /// when no session exists or the signed-in request fails.
    async fn fetch_exact(&self, profile_url: &str) -> FetchOutcome;

    async fn fetch(&self, mode: FetchMode, profile_url: &str) -> FetchOutcome {
        match mode {
            FetchMode::Exact => self.fetch_exact(profile_url).await,
            FetchMode::Approximate => {
                FetchOutcome::approximate(self.fetch_approximate(profile_url).await)
            }
        }
    }
}
