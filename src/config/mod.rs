use std::path::PathBuf;
use std::time::Duration;

pub mod loader;
pub mod validator;

pub use loader::load_config;

/// Default profile tracked when no configuration file overrides it.
pub const DEFAULT_PROFILE_URL: &str = "https://www.instagram.com/code.yatri/";
/// Cooldown between two session-authenticated fetches.
pub const DEFAULT_EXACT_FETCH_INTERVAL_HOURS: u64 = 24;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_WATCH_INTERVAL_MINUTES: u64 = 60;
/// Upper bounds accepted by the validator.
pub const MAX_EXACT_FETCH_INTERVAL_HOURS: u64 = 87_600;
pub const MAX_FETCH_TIMEOUT_SECS: u64 = 3_600;
pub const MAX_WATCH_INTERVAL_MINUTES: u64 = 525_600;
pub const DEFAULT_WATCH_CONCURRENCY: usize = 2;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Runtime settings for the tracker, resolved from builtin defaults plus an optional JSON file.
#[derive(Debug, Clone)]
pub struct Config {
    pub profile_urls: Vec<String>,
    pub history_file: PathBuf,
    pub session_file: PathBuf,
    pub exact_fetch_interval_hours: u64,
    pub fetch_timeout_secs: u64,
    pub watch_interval_minutes: u64,
    pub watch_concurrency: usize,
    pub user_agent: String,
    /// Whether an exact request that fell back to the public page still restarts the cooldown.
    pub advance_on_fallback: bool,
}

impl Config {
    pub fn builtin() -> Self {
        Self {
            profile_urls: vec![DEFAULT_PROFILE_URL.to_string()],
            history_file: PathBuf::from("followers_history.json"),
            session_file: PathBuf::from("instagram_session.json"),
            exact_fetch_interval_hours: DEFAULT_EXACT_FETCH_INTERVAL_HOURS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            watch_interval_minutes: DEFAULT_WATCH_INTERVAL_MINUTES,
            watch_concurrency: DEFAULT_WATCH_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            advance_on_fallback: true,
        }
    }

    /// Clamped to the validator's bound so an unvalidated value cannot overflow.
    pub fn exact_fetch_interval(&self) -> chrono::Duration {
        let hours = self
            .exact_fetch_interval_hours
            .min(MAX_EXACT_FETCH_INTERVAL_HOURS);
        chrono::Duration::hours(hours as i64)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs.min(MAX_FETCH_TIMEOUT_SECS))
    }

    pub fn watch_interval(&self) -> Duration {
        let minutes = self.watch_interval_minutes.min(MAX_WATCH_INTERVAL_MINUTES);
        Duration::from_secs(minutes.saturating_mul(60))
    }

    /// The profile used when a command does not name one explicitly.
    pub fn primary_profile(&self) -> Option<&str> {
        self.profile_urls.first().map(String::as_str)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::builtin()
    }
}
