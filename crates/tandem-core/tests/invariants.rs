//! Property tests for the derived-value invariants:
//! `longest_streak >= current_streak` and `xp < xp_to_next_level`.

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use tandem_core::{
    CoupleScoreEngine, DayBoundary, LevelingConfig, MemoryStore, ScoreCategory, StreakTracker,
    StreakType, StreakUpdate,
};

proptest! {
    #[test]
    fn longest_streak_dominates_current(gaps in prop::collection::vec(0i64..=3, 1..40)) {
        let store = MemoryStore::new();
        let tracker = StreakTracker::new(&store, DayBoundary::default());
        let mut day = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        tracker
            .record_activity("alice", StreakType::DailyCheckin, day)
            .unwrap();
        let mut longest_seen = 1u32;

        for gap in gaps {
            day += Duration::days(gap);
            let update = tracker
                .record_activity("alice", StreakType::DailyCheckin, day)
                .unwrap();
            let streak = update.streak();

            prop_assert!(streak.longest_streak >= streak.current_streak);
            // Longest never shrinks.
            prop_assert!(streak.longest_streak >= longest_seen);
            longest_seen = streak.longest_streak;
        }
    }

    #[test]
    fn same_day_records_never_double_count(repeats in 2usize..6) {
        let store = MemoryStore::new();
        let tracker = StreakTracker::new(&store, DayBoundary::default());
        let day = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();

        tracker
            .record_activity("alice", StreakType::TaskCompletion, day)
            .unwrap();
        for _ in 0..repeats {
            let update = tracker
                .record_activity("alice", StreakType::TaskCompletion, day)
                .unwrap();
            prop_assert!(
                matches!(update, StreakUpdate::AlreadyRecorded { .. }),
                "expected StreakUpdate::AlreadyRecorded, got {:?}",
                update
            );
            prop_assert_eq!(update.streak().current_streak, 1);
        }
    }

    #[test]
    fn xp_stays_below_threshold(awards in prop::collection::vec(1u32..=500, 1..30)) {
        let store = MemoryStore::new();
        let engine = CoupleScoreEngine::new(
            &store,
            DayBoundary::default(),
            LevelingConfig::default(),
        );
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        engine.pair("alice", "bob", now).unwrap();

        let mut total = 0u64;
        for points in awards {
            let update = engine
                .add_points("alice", ScoreCategory::Engagement, points, now)
                .unwrap();
            total += u64::from(points);

            prop_assert!(update.score.xp < update.score.xp_to_next_level);
            prop_assert!(update.score.level >= 1);
            prop_assert_eq!(update.score.total_score, total);
        }
    }
}
