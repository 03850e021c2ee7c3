use chrono::{Duration, NaiveDate};

use super::ProfileHistory;

/// Change in followers between the latest sample and the one `days` earlier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrowthSummary {
    pub latest_date: NaiveDate,
    pub latest: u64,
    pub baseline_date: NaiveDate,
    pub baseline: u64,
    pub delta: i64,
}

impl GrowthSummary {
    pub fn describe(&self) -> String {
        let days = (self.latest_date - self.baseline_date).num_days();
        format!("{:+} over {} day(s)", self.delta, days)
    }
}

/// Compare the newest sample with the latest sample on or before `days` earlier.
///
/// When the history does not reach back that far the oldest sample is used as baseline.
pub fn growth_summary(history: &ProfileHistory, days: u32) -> Option<GrowthSummary> {
    let (&latest_date, &latest) = history.iter().next_back()?;
    let cutoff = Duration::try_days(i64::from(days))
        .and_then(|window| latest_date.checked_sub_signed(window));

    let (&baseline_date, &baseline) = cutoff
        .and_then(|cutoff| history.range(..=cutoff).next_back())
        .or_else(|| history.iter().next())?;

    Some(GrowthSummary {
        latest_date,
        latest,
        baseline_date,
        baseline,
        delta: latest as i64 - baseline as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn weekly_growth_uses_sample_on_or_before_cutoff() {
        let history = ProfileHistory::from([
            (day(1), 1000),
            (day(3), 1050),
            (day(9), 1100),
            (day(10), 1284),
        ]);

        let summary = growth_summary(&history, 7).unwrap();
        assert_eq!(summary.baseline_date, day(3));
        assert_eq!(summary.latest, 1284);
        assert_eq!(summary.delta, 234);
        assert_eq!(summary.describe(), "+234 over 7 day(s)");
    }

    #[test]
    fn short_history_falls_back_to_oldest_sample() {
        let history = ProfileHistory::from([(day(9), 500), (day(10), 480)]);

        let summary = growth_summary(&history, 30).unwrap();
        assert_eq!(summary.baseline_date, day(9));
        assert_eq!(summary.delta, -20);
    }

    #[test]
    fn window_beyond_calendar_range_uses_oldest_sample() {
        let history = ProfileHistory::from([(day(1), 900), (day(3), 950), (day(10), 1000)]);

        let summary = growth_summary(&history, u32::MAX).unwrap();
        assert_eq!(summary.baseline_date, day(1));
        assert_eq!(summary.delta, 100);
    }

    #[test]
    fn empty_history_has_no_summary() {
        assert_eq!(growth_summary(&ProfileHistory::new(), 7), None);
    }
}
