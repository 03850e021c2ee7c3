use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};

use crate::config::Config;
use crate::error::Result;
use crate::fetch::{
    normalize_count, FetchMode, FetchOutcome, FetchSelector, FetchState, FollowerProvider,
    WebFollowerProvider,
};
use crate::records::{History, HistoryStore, JsonHistoryStore};
use crate::utils::{today, ProfileRef};

/// Result of one pass through the fetch pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowerReading {
    pub profile: String,
    pub date: NaiveDate,
    pub count: u64,
    /// Mode the selector chose.
    pub mode: FetchMode,
    /// Path that actually produced the count.
    pub served_by: FetchMode,
}

/// Selector + provider + store pipeline behind the follower endpoints.
pub struct FollowerService {
    selector: FetchSelector,
    provider: Arc<dyn FollowerProvider>,
    store: Arc<dyn HistoryStore>,
    fetch_timeout: Duration,
    advance_on_fallback: bool,
}

impl FollowerService {
    pub fn new(
        config: &Config,
        provider: Arc<dyn FollowerProvider>,
        store: Arc<dyn HistoryStore>,
        state: Arc<FetchState>,
    ) -> Self {
        Self {
            selector: FetchSelector::new(config.exact_fetch_interval(), state),
            provider,
            store,
            fetch_timeout: config.fetch_timeout(),
            advance_on_fallback: config.advance_on_fallback,
        }
    }

    /// Wire the HTTP provider and the JSON history file described by `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let provider = Arc::new(WebFollowerProvider::new(config)?);
        let store = Arc::new(JsonHistoryStore::new(config.history_file.clone()));
        Ok(Self::new(config, provider, store, Arc::new(FetchState::new())))
    }

    pub fn selector(&self) -> &FetchSelector {
        &self.selector
    }

    /// Fetch today's follower count for `identifier`, record it, and return it.
    pub async fn get_follower_count(&self, identifier: &str) -> Result<u64> {
        let reading = self.fetch_and_record(identifier, Utc::now(), today()).await?;
        Ok(reading.count)
    }

    /// The raw persisted history, empty when nothing has been recorded yet.
    pub fn get_follower_history(&self) -> History {
        self.store.read_history()
    }

    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    /// Pipeline with an explicit clock. Only storage failures and unusable identifiers are errors.
    pub async fn fetch_and_record(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
        date: NaiveDate,
    ) -> Result<FollowerReading> {
        let profile = ProfileRef::parse(identifier)?;
        let mode = self.selector.select(now);
        log::info!("fetching followers for {profile} ({} mode)", mode.label());

        let outcome = match tokio::time::timeout(
            self.fetch_timeout,
            self.provider.fetch(mode, &profile.url),
        )
        .await
        {
            Ok(outcome) => {
                self.selector
                    .complete(mode, outcome.served_by, now, self.advance_on_fallback);
                outcome
            }
            Err(_) => {
                log::warn!(
                    "fetch for {profile} timed out after {}s",
                    self.fetch_timeout.as_secs_f32()
                );
                FetchOutcome::sentinel("timed out")
            }
        };

        if outcome.is_sentinel() {
            log::warn!("no follower count for {profile}: {}", outcome.raw);
        }

        let count = normalize_count(&outcome.raw);
        self.store.record_sample(&profile.username, date, count)?;
        log::info!("{profile} has {count} followers on {date}");

        Ok(FollowerReading {
            profile: profile.username,
            date,
            count,
            mode,
            served_by: outcome.served_by,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Provider returning canned values and recording which paths were asked for.
    pub(crate) struct StubProvider {
        approximate: String,
        exact: FetchOutcome,
        delay: Option<Duration>,
        pub calls: Mutex<Vec<FetchMode>>,
    }

    impl StubProvider {
        pub(crate) fn new(approximate: &str, exact: FetchOutcome) -> Self {
            Self {
                approximate: approximate.to_string(),
                exact,
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn slow(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl FollowerProvider for StubProvider {
        async fn fetch_approximate(&self, _profile_url: &str) -> String {
            self.calls.lock().unwrap().push(FetchMode::Approximate);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.approximate.clone()
        }

        async fn fetch_exact(&self, _profile_url: &str) -> FetchOutcome {
            self.calls.lock().unwrap().push(FetchMode::Exact);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.exact.clone()
        }
    }

    pub(crate) fn service_with(
        provider: StubProvider,
        dir: &tempfile::TempDir,
        config: &Config,
    ) -> (FollowerService, Arc<StubProvider>) {
        let provider = Arc::new(provider);
        let store = Arc::new(JsonHistoryStore::new(dir.path().join("history.json")));
        let service = FollowerService::new(
            config,
            provider.clone(),
            store,
            Arc::new(FetchState::new()),
        );
        (service, provider)
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[tokio::test]
    async fn first_fetch_is_exact_then_approximate_within_cooldown() {
        let dir = tempfile::tempdir().unwrap();
        let (service, provider) = service_with(
            StubProvider::new("1,200", FetchOutcome::exact("1234")),
            &dir,
            &Config::builtin(),
        );

        let first = service
            .fetch_and_record("code.yatri", at(0), day(1))
            .await
            .unwrap();
        assert_eq!(first.mode, FetchMode::Exact);
        assert_eq!(first.count, 1234);
        assert_eq!(service.selector().state().last_exact_fetch(), Some(at(0)));

        let second = service
            .fetch_and_record("code.yatri", at(1), day(1))
            .await
            .unwrap();
        assert_eq!(second.mode, FetchMode::Approximate);
        assert_eq!(second.count, 1200);

        assert_eq!(
            *provider.calls.lock().unwrap(),
            vec![FetchMode::Exact, FetchMode::Approximate]
        );

        let history = service.get_follower_history();
        assert_eq!(history["code.yatri"][&day(1)], 1200);
    }

    #[tokio::test]
    async fn exact_mode_returns_after_cooldown() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _provider) = service_with(
            StubProvider::new("10", FetchOutcome::exact("11")),
            &dir,
            &Config::builtin(),
        );

        service.fetch_and_record("alice", at(0), day(1)).await.unwrap();
        let next_day = service
            .fetch_and_record("alice", at(0) + chrono::Duration::hours(24), day(2))
            .await
            .unwrap();

        assert_eq!(next_day.mode, FetchMode::Exact);
        assert_eq!(
            service.get_follower_history()["alice"],
            crate::records::ProfileHistory::from([(day(1), 11), (day(2), 11)])
        );
    }

    #[tokio::test]
    async fn sentinel_is_recorded_as_zero() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _provider) = service_with(
            StubProvider::new("Error: timeout", FetchOutcome::sentinel("timeout")),
            &dir,
            &Config::builtin(),
        );

        let reading = service
            .fetch_and_record("https://www.instagram.com/alice/", at(0), day(1))
            .await
            .unwrap();

        assert_eq!(reading.count, 0);
        assert_eq!(reading.served_by, FetchMode::Approximate);
        assert_eq!(service.store().get("alice", day(1)), Some(0));
    }

    #[tokio::test]
    async fn fallback_does_not_restart_cooldown_when_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::builtin();
        config.advance_on_fallback = false;
        let (service, _provider) = service_with(
            StubProvider::new("90", FetchOutcome::approximate("90")),
            &dir,
            &config,
        );

        let reading = service.fetch_and_record("alice", at(0), day(1)).await.unwrap();
        assert_eq!(reading.mode, FetchMode::Exact);
        assert_eq!(reading.served_by, FetchMode::Approximate);
        assert_eq!(service.selector().state().last_exact_fetch(), None);
    }

    #[tokio::test]
    async fn slow_provider_times_out_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::builtin();
        config.fetch_timeout_secs = 1;
        let (service, _provider) = service_with(
            StubProvider::new("5", FetchOutcome::exact("5")).slow(Duration::from_secs(30)),
            &dir,
            &config,
        );

        let reading = service.fetch_and_record("alice", at(0), day(1)).await.unwrap();
        assert_eq!(reading.count, 0);
        assert_eq!(service.selector().state().last_exact_fetch(), None);
    }

    #[tokio::test]
    async fn invalid_identifier_is_rejected_before_fetching() {
        let dir = tempfile::tempdir().unwrap();
        let (service, provider) = service_with(
            StubProvider::new("5", FetchOutcome::exact("5")),
            &dir,
            &Config::builtin(),
        );

        assert!(service
            .fetch_and_record("https://www.instagram.com/", at(0), day(1))
            .await
            .is_err());
        assert!(provider.calls.lock().unwrap().is_empty());
        assert!(service.get_follower_history().is_empty());
    }
}
