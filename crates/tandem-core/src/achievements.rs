//! Achievement catalog and unlock evaluation.
//!
//! The catalog is static; a per-user copy is seeded into storage on first
//! access so unlock flags can be stamped. `is_unlocked` is the only
//! mutable field and transitions false to true exactly once. Evaluation
//! is lazy: the engine re-scans after every relevant mutation instead of
//! subscribing to events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::checkin::{CheckInLedger, CountWindow};
use crate::config::DayBoundary;
use crate::error::Result;
use crate::score::CoupleScore;
use crate::storage::{load_json, save_json, user_key, Store};
use crate::streak::StreakTracker;

/// Unlock rule for one achievement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Requirement {
    /// Any streak with `current_streak >= days`.
    Streak { days: u32 },
    /// At least `entries` check-ins inside `window`.
    Count { entries: u32, window: CountWindow },
    /// Couple score `total_score >= total`.
    Score { total: u64 },
}

/// How rare an achievement is, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Which part of the engine the achievement grades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementCategory {
    Checkins,
    Streaks,
    Score,
}

/// A one-time unlockable milestone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub requirement: Requirement,
    /// Prestige points shown with the unlock; display metadata only.
    pub points: u32,
    pub rarity: Rarity,
    pub is_unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

fn entry(
    id: &str,
    name: &str,
    description: &str,
    category: AchievementCategory,
    requirement: Requirement,
    points: u32,
    rarity: Rarity,
) -> Achievement {
    Achievement {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        requirement,
        points,
        rarity,
        is_unlocked: false,
        unlocked_at: None,
    }
}

/// The static achievement catalog, all locked.
pub fn catalog() -> Vec<Achievement> {
    use AchievementCategory as Cat;
    vec![
        entry(
            "first-step",
            "First Step",
            "Record your first check-in",
            Cat::Checkins,
            Requirement::Count { entries: 1, window: CountWindow::AllTime },
            10,
            Rarity::Common,
        ),
        entry(
            "steady-week",
            "Steady Week",
            "Check in five times within a week",
            Cat::Checkins,
            Requirement::Count { entries: 5, window: CountWindow::Weekly },
            15,
            Rarity::Common,
        ),
        entry(
            "month-of-us",
            "Month of Us",
            "Twenty check-ins in a single month",
            Cat::Checkins,
            Requirement::Count { entries: 20, window: CountWindow::Monthly },
            40,
            Rarity::Rare,
        ),
        entry(
            "hundred-moments",
            "Hundred Moments",
            "One hundred check-ins, all time",
            Cat::Checkins,
            Requirement::Count { entries: 100, window: CountWindow::AllTime },
            100,
            Rarity::Epic,
        ),
        entry(
            "getting-started",
            "Getting Started",
            "Keep any streak alive for 3 days",
            Cat::Streaks,
            Requirement::Streak { days: 3 },
            10,
            Rarity::Common,
        ),
        entry(
            "week-warrior",
            "Week Warrior",
            "Keep any streak alive for 7 days",
            Cat::Streaks,
            Requirement::Streak { days: 7 },
            25,
            Rarity::Rare,
        ),
        entry(
            "habit-keeper",
            "Habit Keeper",
            "Keep any streak alive for 30 days",
            Cat::Streaks,
            Requirement::Streak { days: 30 },
            75,
            Rarity::Epic,
        ),
        entry(
            "century-club",
            "Century Club",
            "Keep any streak alive for 100 days",
            Cat::Streaks,
            Requirement::Streak { days: 100 },
            200,
            Rarity::Legendary,
        ),
        entry(
            "rising-together",
            "Rising Together",
            "Reach a couple score of 250",
            Cat::Score,
            Requirement::Score { total: 250 },
            20,
            Rarity::Common,
        ),
        entry(
            "power-couple",
            "Power Couple",
            "Reach a couple score of 1000",
            Cat::Score,
            Requirement::Score { total: 1000 },
            50,
            Rarity::Rare,
        ),
        entry(
            "soul-bond",
            "Soul Bond",
            "Reach a couple score of 5000",
            Cat::Score,
            Requirement::Score { total: 5000 },
            150,
            Rarity::Legendary,
        ),
    ]
}

/// Scans the catalog and flips satisfied unlock flags.
pub struct AchievementEvaluator<'a> {
    store: &'a dyn Store,
    day: DayBoundary,
}

impl<'a> AchievementEvaluator<'a> {
    pub fn new(store: &'a dyn Store, day: DayBoundary) -> Self {
        Self { store, day }
    }

    fn key(user_id: &str) -> String {
        user_key("achievements", user_id)
    }

    /// The user's catalog copy, seeded on first access.
    pub fn all(&self, user_id: &str) -> Result<Vec<Achievement>> {
        match load_json(self.store, &Self::key(user_id))? {
            Some(entries) => Ok(entries),
            None => {
                let entries = catalog();
                save_json(self.store, &Self::key(user_id), &entries)?;
                Ok(entries)
            }
        }
    }

    /// Re-scan the catalog and unlock every newly satisfied entry.
    ///
    /// Unlocks are monotonic: already-unlocked entries are skipped and
    /// never revert, regardless of later state changes.
    pub fn evaluate(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<Achievement>> {
        let mut entries = self.all(user_id)?;

        let ledger = CheckInLedger::new(self.store, self.day);
        let tracker = StreakTracker::new(self.store, self.day);
        let streaks = tracker.all(user_id)?;
        let score: Option<CoupleScore> =
            load_json(self.store, &user_key("couple_score", user_id))?;

        let mut unlocked = Vec::new();
        for achievement in entries.iter_mut() {
            if achievement.is_unlocked {
                continue;
            }
            let satisfied = match achievement.requirement {
                Requirement::Streak { days } => {
                    streaks.iter().any(|s| s.current_streak >= days)
                }
                Requirement::Count { entries, window } => {
                    ledger.count_in_window(user_id, window, now)? >= entries as usize
                }
                Requirement::Score { total } => {
                    score.as_ref().is_some_and(|s| s.total_score >= total)
                }
            };
            if satisfied {
                achievement.is_unlocked = true;
                achievement.unlocked_at = Some(now);
                unlocked.push(achievement.clone());
            }
        }

        if !unlocked.is_empty() {
            save_json(self.store, &Self::key(user_id), &entries)?;
        }
        Ok(unlocked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkin::{Mood, NewCheckIn};
    use crate::config::LevelingConfig;
    use crate::score::{CoupleScoreEngine, ScoreCategory};
    use crate::storage::MemoryStore;
    use crate::streak::StreakType;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn ids(unlocked: &[Achievement]) -> Vec<&str> {
        unlocked.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let entries = catalog();
        let mut seen = std::collections::HashSet::new();
        for a in &entries {
            assert!(seen.insert(a.id.clone()), "duplicate id {}", a.id);
            assert!(!a.is_unlocked);
            assert!(a.unlocked_at.is_none());
        }
    }

    #[test]
    fn test_first_checkin_unlocks_first_step() {
        let store = MemoryStore::new();
        let day = DayBoundary::default();
        CheckInLedger::new(&store, day)
            .submit("alice", NewCheckIn::new(Mood::Happy, 7), at(2026, 3, 10))
            .unwrap();

        let unlocked = AchievementEvaluator::new(&store, day)
            .evaluate("alice", at(2026, 3, 10))
            .unwrap();
        assert_eq!(ids(&unlocked), vec!["first-step"]);
    }

    #[test]
    fn test_streak_requirement() {
        let store = MemoryStore::new();
        let day = DayBoundary::default();
        let tracker = StreakTracker::new(&store, day);
        for d in 1..=7 {
            tracker
                .record_activity("alice", StreakType::DailyCheckin, at(2026, 3, d))
                .unwrap();
        }

        let unlocked = AchievementEvaluator::new(&store, day)
            .evaluate("alice", at(2026, 3, 7))
            .unwrap();
        let ids = ids(&unlocked);
        assert!(ids.contains(&"getting-started"));
        assert!(ids.contains(&"week-warrior"));
        assert!(!ids.contains(&"habit-keeper"));
    }

    #[test]
    fn test_score_requirement() {
        let store = MemoryStore::new();
        let day = DayBoundary::default();
        let scores = CoupleScoreEngine::new(&store, day, LevelingConfig::default());
        scores.pair("alice", "bob", at(2026, 3, 10)).unwrap();
        scores
            .add_points("alice", ScoreCategory::Engagement, 300, at(2026, 3, 10))
            .unwrap();

        let unlocked = AchievementEvaluator::new(&store, day)
            .evaluate("alice", at(2026, 3, 10))
            .unwrap();
        assert_eq!(ids(&unlocked), vec!["rising-together"]);
    }

    #[test]
    fn test_unlock_is_monotonic() {
        let store = MemoryStore::new();
        let day = DayBoundary::default();
        let tracker = StreakTracker::new(&store, day);
        for d in 1..=3 {
            tracker
                .record_activity("alice", StreakType::DailyCheckin, at(2026, 3, d))
                .unwrap();
        }

        let evaluator = AchievementEvaluator::new(&store, day);
        let first = evaluator.evaluate("alice", at(2026, 3, 3)).unwrap();
        assert_eq!(ids(&first), vec!["getting-started"]);

        // Streak broken; the unlock must survive re-evaluation.
        tracker
            .record_activity("alice", StreakType::DailyCheckin, at(2026, 3, 20))
            .unwrap();
        let again = evaluator.evaluate("alice", at(2026, 3, 20)).unwrap();
        assert!(again.is_empty());

        let stored = evaluator.all("alice").unwrap();
        let getting_started = stored.iter().find(|a| a.id == "getting-started").unwrap();
        assert!(getting_started.is_unlocked);
        assert!(getting_started.unlocked_at.is_some());
    }

    #[test]
    fn test_no_score_record_means_score_requirements_unsatisfied() {
        let store = MemoryStore::new();
        let day = DayBoundary::default();
        let unlocked = AchievementEvaluator::new(&store, day)
            .evaluate("alice", at(2026, 3, 10))
            .unwrap();
        assert!(unlocked.is_empty());
    }
}
