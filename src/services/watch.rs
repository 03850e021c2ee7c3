use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::fetch::ensure_concurrency_limit;

use super::FollowerService;

/// Fetch every profile once, at most `concurrency` at a time. Results keep the input order.
pub async fn poll_profiles(
    service: &FollowerService,
    profiles: &[String],
    concurrency: usize,
) -> Vec<(String, Result<u64>)> {
    stream::iter(profiles.iter().cloned())
        .map(|profile| async move {
            let result = service.get_follower_count(&profile).await;
            (profile, result)
        })
        .buffered(ensure_concurrency_limit(concurrency))
        .collect()
        .await
}

/// Poll the profiles on a fixed interval until `shutdown` resolves. Returns the number of completed rounds.
pub async fn watch_profiles<F>(
    service: Arc<FollowerService>,
    profiles: Vec<String>,
    interval: Duration,
    concurrency: usize,
    shutdown: F,
) -> usize
where
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut rounds = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("watch stopped after {rounds} round(s)");
                return rounds;
            }
            _ = ticker.tick() => {
                for (profile, result) in poll_profiles(&service, &profiles, concurrency).await {
                    match result {
                        Ok(count) => log::info!("{profile}: {count} followers"),
                        Err(err) => log::error!("failed to record followers for {profile}: {err}"),
                    }
                }
                rounds += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::fetch::FetchOutcome;
    use crate::services::follower::tests::{service_with, StubProvider};

    #[tokio::test]
    async fn polls_each_profile_and_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let (service, _provider) = service_with(
            StubProvider::new("2,500", FetchOutcome::exact("2,501")),
            &dir,
            &Config::builtin(),
        );

        let profiles = vec![
            "alice".to_string(),
            "bob".to_string(),
            "not a profile".to_string(),
        ];
        let results = poll_profiles(&service, &profiles, 2).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, "alice");
        assert!(results[2].1.is_err());

        let history = service.get_follower_history();
        assert_eq!(history.len(), 2);
        assert!(history.contains_key("alice"));
        assert!(history.contains_key("bob"));
    }

    #[tokio::test(start_paused = true)]
    async fn watch_runs_until_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let (service, provider) = service_with(
            StubProvider::new("7", FetchOutcome::exact("7")),
            &dir,
            &Config::builtin(),
        );

        // Ticks land at 0, 20, 40 and 60 ms on the paused clock; shutdown fires at 70 ms.
        let rounds = watch_profiles(
            Arc::new(service),
            vec!["alice".to_string()],
            Duration::from_millis(20),
            1,
            tokio::time::sleep(Duration::from_millis(70)),
        )
        .await;

        assert_eq!(rounds, 4);
        assert_eq!(provider.calls.lock().unwrap().len(), 4);
    }
}
