use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};

use super::FetchMode;

/// Process-wide record of when the last exact fetch happened.
#[derive(Debug, Default)]
pub struct FetchState {
    last_exact_fetch: Mutex<Option<DateTime<Utc>>>,
}

impl FetchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_exact_fetch(at: DateTime<Utc>) -> Self {
        Self {
            last_exact_fetch: Mutex::new(Some(at)),
        }
    }

    /// `None` until the first exact fetch completes.
    pub fn last_exact_fetch(&self) -> Option<DateTime<Utc>> {
        *self
            .last_exact_fetch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Advance the timestamp to `at`. Older values are ignored so the timestamp never moves back.
    pub fn mark_exact(&self, at: DateTime<Utc>) {
        let mut guard = self
            .last_exact_fetch
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if guard.map_or(true, |previous| at > previous) {
            *guard = Some(at);
        }
    }
}

/// Chooses between the exact and approximate fetch paths based on a cooldown.
#[derive(Debug, Clone)]
pub struct FetchSelector {
    interval: Duration,
    state: Arc<FetchState>,
}

impl FetchSelector {
    pub fn new(interval: Duration, state: Arc<FetchState>) -> Self {
        Self { interval, state }
    }

    pub fn state(&self) -> &Arc<FetchState> {
        &self.state
    }

    pub fn select(&self, now: DateTime<Utc>) -> FetchMode {
        match self.state.last_exact_fetch() {
            None => FetchMode::Exact,
            Some(last) if now - last >= self.interval => FetchMode::Exact,
            Some(_) => FetchMode::Approximate,
        }
    }

    /// Record the end of a fetch chosen at `now`.
    ///
    /// Only exact-mode fetches restart the cooldown. When the exact path fell back to the public
    /// page, `advance_on_fallback` decides whether the cooldown restarts anyway.
    pub fn complete(
        &self,
        chosen: FetchMode,
        served_by: FetchMode,
        now: DateTime<Utc>,
        advance_on_fallback: bool,
    ) {
        if chosen != FetchMode::Exact {
            return;
        }

        if served_by == FetchMode::Approximate {
            log::warn!(
                "exact fetch fell back to the public page; cooldown {}",
                if advance_on_fallback {
                    "restarts anyway"
                } else {
                    "left untouched"
                }
            );
            if !advance_on_fallback {
                return;
            }
        }

        self.state.mark_exact(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap()
    }

    fn selector(state: FetchState) -> FetchSelector {
        FetchSelector::new(Duration::hours(24), Arc::new(state))
    }

    #[test]
    fn first_request_is_exact() {
        assert_eq!(selector(FetchState::new()).select(at(0)), FetchMode::Exact);
    }

    #[test]
    fn within_cooldown_is_approximate() {
        let selector = selector(FetchState::with_last_exact_fetch(at(10)));
        assert_eq!(selector.select(at(11)), FetchMode::Approximate);
    }

    #[test]
    fn cooldown_boundary_is_exact() {
        let selector = selector(FetchState::with_last_exact_fetch(at(0)));
        assert_eq!(selector.select(at(0) + Duration::hours(24)), FetchMode::Exact);
        assert_eq!(
            selector.select(at(0) + Duration::hours(24) - Duration::seconds(1)),
            FetchMode::Approximate
        );
    }

    #[test]
    fn exact_completion_moves_timestamp_forward_only() {
        let selector = selector(FetchState::new());
        selector.complete(FetchMode::Exact, FetchMode::Exact, at(12), true);
        assert_eq!(selector.state().last_exact_fetch(), Some(at(12)));

        selector.complete(FetchMode::Exact, FetchMode::Exact, at(3), true);
        assert_eq!(selector.state().last_exact_fetch(), Some(at(12)));
    }

    #[test]
    fn approximate_completion_leaves_state_alone() {
        let selector = selector(FetchState::new());
        selector.complete(FetchMode::Approximate, FetchMode::Approximate, at(5), true);
        assert_eq!(selector.state().last_exact_fetch(), None);
    }

    #[test]
    fn fallback_respects_advance_switch() {
        let kept = selector(FetchState::new());
        kept.complete(FetchMode::Exact, FetchMode::Approximate, at(8), true);
        assert_eq!(kept.state().last_exact_fetch(), Some(at(8)));

        let skipped = selector(FetchState::new());
        skipped.complete(FetchMode::Exact, FetchMode::Approximate, at(8), false);
        assert_eq!(skipped.state().last_exact_fetch(), None);
    }
}
