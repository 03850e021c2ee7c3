use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AppError, Context, Result};

use super::{validator, Config};

/// On-disk shape of the configuration file. Every field is optional and falls back to the builtin value.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig {
    profile_urls: Option<Vec<String>>,
    history_file: Option<PathBuf>,
    session_file: Option<PathBuf>,
    exact_fetch_interval_hours: Option<u64>,
    fetch_timeout_secs: Option<u64>,
    watch_interval_minutes: Option<u64>,
    watch_concurrency: Option<usize>,
    user_agent: Option<String>,
    advance_on_fallback: Option<bool>,
}

impl RawConfig {
    fn into_config(self) -> Config {
        let base = Config::builtin();
        Config {
            profile_urls: self.profile_urls.unwrap_or(base.profile_urls),
            history_file: self.history_file.unwrap_or(base.history_file),
            session_file: self.session_file.unwrap_or(base.session_file),
            exact_fetch_interval_hours: self
                .exact_fetch_interval_hours
                .unwrap_or(base.exact_fetch_interval_hours),
            fetch_timeout_secs: self.fetch_timeout_secs.unwrap_or(base.fetch_timeout_secs),
            watch_interval_minutes: self
                .watch_interval_minutes
                .unwrap_or(base.watch_interval_minutes),
            watch_concurrency: self.watch_concurrency.unwrap_or(base.watch_concurrency),
            user_agent: self.user_agent.unwrap_or(base.user_agent),
            advance_on_fallback: self.advance_on_fallback.unwrap_or(base.advance_on_fallback),
        }
    }
}

/// Resolve the configuration: an explicit path must exist, otherwise builtin defaults are used.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::builtin(),
    };
    validator::validate_config(&config)?;
    Ok(config)
}

impl Config {
    /// Read a JSON configuration file, trying the path as given, next to the executable, then the working dir.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let search_paths = vec![
            path.to_path_buf(),
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|p| p.join(path)))
                .unwrap_or_else(|| path.to_path_buf()),
            std::env::current_dir()
                .map(|cwd| cwd.join(path))
                .unwrap_or_else(|_| path.to_path_buf()),
        ];

        let mut last_error = None;

        for search_path in search_paths {
            match fs::read_to_string(&search_path) {
                Ok(content) => {
                    log::debug!("loading configuration from {}", search_path.display());
                    let config = parse_config(&content).with_context(|| {
                        format!("Failed to parse config JSON at {}", search_path.display())
                    })?;
                    return Ok(config);
                }
                Err(e) => {
                    last_error = Some(format!("Failed to read {}: {}", search_path.display(), e));
                }
            }
        }

        Err(AppError::message(format!(
            "Could not find config file. Last error: {}",
            last_error.unwrap_or_else(|| "No search paths".to_string())
        )))
    }
}

fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = serde_json::from_str(content)?;
    Ok(raw.into_config())
}
