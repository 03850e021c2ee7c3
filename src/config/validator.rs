use crate::error::{AppError, Result};
use crate::utils::ProfileRef;

use super::{
    Config, MAX_EXACT_FETCH_INTERVAL_HOURS, MAX_FETCH_TIMEOUT_SECS, MAX_WATCH_INTERVAL_MINUTES,
};

/// Validate the resolved configuration and surface every problem at once.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    validate_profiles(config, &mut issues);
    validate_intervals(config, &mut issues);

    if config.history_file.as_os_str().is_empty() {
        issues.push("historyFile must not be empty".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::Config(format!(
            "\n  - {}",
            issues.join("\n  - ")
        )))
    }
}

fn validate_profiles(config: &Config, issues: &mut Vec<String>) {
    if config.profile_urls.is_empty() {
        issues.push("profileUrls must list at least one profile".to_string());
    }

    for url in &config.profile_urls {
        if let Err(err) = ProfileRef::parse(url) {
            issues.push(format!("profile `{url}` is not usable: {err}"));
        }
    }
}

fn validate_intervals(config: &Config, issues: &mut Vec<String>) {
    check_range(
        "exactFetchIntervalHours",
        config.exact_fetch_interval_hours,
        MAX_EXACT_FETCH_INTERVAL_HOURS,
        issues,
    );
    check_range(
        "fetchTimeoutSecs",
        config.fetch_timeout_secs,
        MAX_FETCH_TIMEOUT_SECS,
        issues,
    );
    check_range(
        "watchIntervalMinutes",
        config.watch_interval_minutes,
        MAX_WATCH_INTERVAL_MINUTES,
        issues,
    );
    if config.watch_concurrency == 0 {
        issues.push("watchConcurrency must be greater than zero".to_string());
    }
}

fn check_range(name: &str, value: u64, max: u64, issues: &mut Vec<String>) {
    if value == 0 {
        issues.push(format!("{name} must be greater than zero"));
    } else if value > max {
        issues.push(format!("{name} must be at most {max}, got {value}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_config_is_valid() {
        validate_config(&Config::builtin()).expect("builtin config should be valid");
    }

    #[test]
    fn rejects_empty_profile_list_and_zero_timeout() {
        let mut config = Config::builtin();
        config.profile_urls.clear();
        config.fetch_timeout_secs = 0;

        let err = validate_config(&config).expect_err("validation should fail");
        let message = err.to_string();
        assert!(message.contains("at least one profile"), "unexpected: {message}");
        assert!(message.contains("fetchTimeoutSecs"), "unexpected: {message}");
    }

    #[test]
    fn rejects_unparseable_profile() {
        let mut config = Config::builtin();
        config.profile_urls = vec!["https://www.instagram.com/".to_string()];

        let err = validate_config(&config).expect_err("validation should fail");
        assert!(
            err.to_string().contains("not usable"),
            "unexpected error message: {err}"
        );
    }

    #[test]
    fn rejects_intervals_beyond_upper_bounds() {
        let mut config = Config::builtin();
        config.exact_fetch_interval_hours = 3_000_000_000_000_000;
        config.watch_interval_minutes = u64::MAX;
        config.fetch_timeout_secs = MAX_FETCH_TIMEOUT_SECS;

        let err = validate_config(&config).expect_err("validation should fail");
        let message = err.to_string();
        assert!(message.contains("exactFetchIntervalHours must be at most"), "unexpected: {message}");
        assert!(message.contains("watchIntervalMinutes must be at most"), "unexpected: {message}");
        assert!(!message.contains("fetchTimeoutSecs"), "unexpected: {message}");
    }
}
