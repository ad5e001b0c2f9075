//! Streak and statistics derived from entry dates.
//!
//! Nothing here is persisted; callers recompute from the entry list whenever
//! they need fresh numbers. Date strings that do not parse as `yyyy-MM-dd`
//! are skipped.

use crate::dates;
use crate::gratitude_entry::GratitudeEntry;
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

fn distinct_dates<I, S>(dates: I) -> BTreeSet<NaiveDate>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    dates
        .into_iter()
        .filter_map(|d| dates::parse_entry_date(d.as_ref()))
        .collect()
}

/// Number of consecutive days, ending with `today`, that have an entry.
///
/// Returns 0 when there is no entry for `today`, even if yesterday had one.
pub fn calculate_streak<I, S>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let days = distinct_dates(dates);

    let mut streak = 0;
    let mut cursor = Some(today);
    while let Some(day) = cursor {
        if !days.contains(&day) {
            break;
        }
        streak += 1;
        cursor = day.pred_opt();
    }
    streak
}

/// Longest run of consecutive days anywhere in the history.
pub fn longest_streak<I, S>(dates: I) -> u32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut longest = 0;
    let mut current = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in distinct_dates(dates) {
        current = match previous.and_then(|p| p.succ_opt()) {
            Some(expected) if expected == day => current + 1,
            _ => 1,
        };
        longest = longest.max(current);
        previous = Some(day);
    }
    longest
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalStats {
    pub total_entries: usize,
    pub active_days: usize,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Entries per day, oldest day first.
    pub daily_counts: Vec<(NaiveDate, usize)>,
}

impl JournalStats {
    pub fn from_entries(entries: &[GratitudeEntry], today: NaiveDate) -> Self {
        let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
        for date in entries.iter().filter_map(GratitudeEntry::parsed_date) {
            *counts.entry(date).or_default() += 1;
        }

        let dates = || entries.iter().map(|e| e.date.as_str());
        JournalStats {
            total_entries: entries.len(),
            active_days: counts.len(),
            current_streak: calculate_streak(dates(), today),
            longest_streak: longest_streak(dates()),
            daily_counts: counts.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn days_ago(n: i64) -> String {
        dates::format_entry_date(today() - Duration::days(n))
    }

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(calculate_streak(Vec::<String>::new(), today()), 0);
    }

    #[test]
    fn three_consecutive_days_ending_today() {
        let dates = vec![days_ago(0), days_ago(1), days_ago(2)];
        assert_eq!(calculate_streak(&dates, today()), 3);
    }

    #[test]
    fn gap_at_yesterday_stops_the_count() {
        let dates = vec![days_ago(0), days_ago(2)];
        assert_eq!(calculate_streak(&dates, today()), 1);
    }

    #[test]
    fn yesterday_only_gets_no_credit() {
        let dates = vec![days_ago(1), days_ago(2), days_ago(3)];
        assert_eq!(calculate_streak(&dates, today()), 0);
    }

    #[test]
    fn same_day_duplicates_count_once() {
        let dates = vec![days_ago(0), days_ago(0), days_ago(0), days_ago(1)];
        assert_eq!(calculate_streak(&dates, today()), 2);
    }

    #[test]
    fn unparseable_dates_are_skipped() {
        let dates = vec![
            days_ago(0),
            "yesterday".to_string(),
            String::new(),
            "2024-13-40".to_string(),
            days_ago(1),
        ];
        assert_eq!(calculate_streak(&dates, today()), 2);
    }

    #[test]
    fn future_dates_do_not_count() {
        let dates = vec![days_ago(-1), days_ago(0), days_ago(1)];
        assert_eq!(calculate_streak(&dates, today()), 2);
    }

    #[test]
    fn longest_streak_finds_run_in_the_past() {
        let dates = vec![
            days_ago(0),
            days_ago(10),
            days_ago(11),
            days_ago(12),
            days_ago(13),
            days_ago(20),
        ];
        assert_eq!(longest_streak(&dates), 4);
        assert_eq!(longest_streak(Vec::<String>::new()), 0);
        assert_eq!(longest_streak(["junk"]), 0);
    }

    #[test]
    fn stats_aggregate_counts_and_streaks() {
        let entries = vec![
            GratitudeEntry::new(1, "a".into(), days_ago(0)),
            GratitudeEntry::new(2, "b".into(), days_ago(0)),
            GratitudeEntry::new(3, "c".into(), days_ago(1)),
            GratitudeEntry::new(4, "d".into(), "garbage".into()),
        ];
        let stats = JournalStats::from_entries(&entries, today());

        assert_eq!(stats.total_entries, 4);
        assert_eq!(stats.active_days, 2);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
        assert_eq!(
            stats.daily_counts,
            vec![
                (today() - Duration::days(1), 1),
                (today(), 2),
            ]
        );
    }

    proptest! {
        #[test]
        fn streak_is_zero_without_an_entry_today(
            offsets in prop::collection::vec(1i64..400, 0..30),
            future in any::<bool>(),
        ) {
            let sign = if future { -1 } else { 1 };
            let dates: Vec<String> = offsets.iter().map(|n| days_ago(n * sign)).collect();
            prop_assert_eq!(calculate_streak(&dates, today()), 0);
        }

        #[test]
        fn run_ending_today_counts_each_day_once(
            len in 1i64..60,
            repeats in prop::collection::vec(0i64..60, 0..20),
            garbage in prop::collection::vec("[a-z/ ]{0,12}", 0..5),
        ) {
            let mut dates: Vec<String> = (0..len).map(days_ago).collect();
            dates.extend(repeats.iter().filter(|n| **n < len).map(|n| days_ago(*n)));
            dates.extend(garbage);
            dates.reverse();

            prop_assert_eq!(calculate_streak(&dates, today()), len as u32);
        }
    }
}
