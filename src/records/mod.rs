use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::Result;

pub mod export;
pub mod history_store;
pub mod stats;

pub use export::{export_csv, write_csv};
pub use history_store::{HistoryDocument, JsonHistoryStore};
pub use stats::{growth_summary, GrowthSummary};

/// Daily follower counts for one profile, ordered by date.
pub type ProfileHistory = BTreeMap<NaiveDate, u64>;

/// Every tracked profile keyed by username.
pub type History = BTreeMap<String, ProfileHistory>;

/// Durable per-profile, per-day follower samples. At most one count is kept per (profile, date).
pub trait HistoryStore: Send + Sync {
    /// Full persisted history. Missing or unreadable storage yields an empty map; samples that
    /// are not whole non-negative counts are left out.
    fn read_history(&self) -> History;

    /// Store `count` for `profile` on `date`, replacing any earlier value for that day.
    fn record_sample(&self, profile: &str, date: NaiveDate, count: u64) -> Result<()>;

    fn get(&self, profile: &str, date: NaiveDate) -> Option<u64> {
        self.read_history()
            .get(profile)
            .and_then(|days| days.get(&date).copied())
    }

    fn set(&self, profile: &str, date: NaiveDate, count: u64) -> Result<()> {
        self.record_sample(profile, date, count)
    }

    fn profile_history(&self, profile: &str) -> ProfileHistory {
        self.read_history().remove(profile).unwrap_or_default()
    }
}
