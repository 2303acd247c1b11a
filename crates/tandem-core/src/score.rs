//! Shared couple score with an XP/level progression curve.
//!
//! One record exists per ordered (user, partner) pair, keyed by the
//! initiating user. Points feed a category breakdown, running totals, and
//! the XP pool; level-ups loop until `xp < xp_to_next_level` so a single
//! large award can cross several thresholds at once.
//!
//! Weekly/monthly counters roll over lazily: the record carries the period
//! anchors they cover, and the first award in a later period restarts the
//! counter. No scheduled job is involved.

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{DayBoundary, LevelingConfig};
use crate::error::{Result, ValidationError};
use crate::storage::{load_json, save_json, user_key, Store};

/// Score categories a point award can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreCategory {
    Communication,
    Planning,
    Sharing,
    Engagement,
    Consistency,
}

/// Per-category point totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryScores {
    pub communication: u64,
    pub planning: u64,
    pub sharing: u64,
    pub engagement: u64,
    pub consistency: u64,
}

impl CategoryScores {
    pub fn get(&self, category: ScoreCategory) -> u64 {
        match category {
            ScoreCategory::Communication => self.communication,
            ScoreCategory::Planning => self.planning,
            ScoreCategory::Sharing => self.sharing,
            ScoreCategory::Engagement => self.engagement,
            ScoreCategory::Consistency => self.consistency,
        }
    }

    fn add(&mut self, category: ScoreCategory, points: u64) {
        match category {
            ScoreCategory::Communication => self.communication += points,
            ScoreCategory::Planning => self.planning += points,
            ScoreCategory::Sharing => self.sharing += points,
            ScoreCategory::Engagement => self.engagement += points,
            ScoreCategory::Consistency => self.consistency += points,
        }
    }
}

/// The couple's shared gamification record.
///
/// Invariant: `xp < xp_to_next_level` after every award.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoupleScore {
    pub id: String,
    pub user_id: String,
    pub partner_id: String,
    pub total_score: u64,
    pub weekly_score: u64,
    pub monthly_score: u64,
    pub categories: CategoryScores,
    pub level: u32,
    pub xp: u64,
    pub xp_to_next_level: u64,
    pub badges: Vec<String>,
    /// Monday of the ISO week `weekly_score` covers.
    pub week_anchor: NaiveDate,
    /// First day of the month `monthly_score` covers.
    pub month_anchor: NaiveDate,
}

/// Outcome of a point award.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreUpdate {
    pub score: CoupleScore,
    pub points_awarded: u64,
    /// Levels reached by this award, in order (empty if none).
    pub levels_reached: Vec<u32>,
}

/// Accumulates category-weighted points into the leveling curve.
pub struct CoupleScoreEngine<'a> {
    store: &'a dyn Store,
    day: DayBoundary,
    leveling: LevelingConfig,
}

impl<'a> CoupleScoreEngine<'a> {
    pub fn new(store: &'a dyn Store, day: DayBoundary, leveling: LevelingConfig) -> Self {
        Self {
            store,
            day,
            leveling,
        }
    }

    fn key(user_id: &str) -> String {
        user_key("couple_score", user_id)
    }

    /// The user's couple score, if a pairing has been established.
    pub fn get(&self, user_id: &str) -> Result<Option<CoupleScore>> {
        load_json(self.store, &Self::key(user_id))
    }

    /// Establish a pairing. Pairing the same user again returns the
    /// existing record unchanged; progress is never reset.
    pub fn pair(
        &self,
        user_id: &str,
        partner_id: &str,
        now: DateTime<Utc>,
    ) -> Result<CoupleScore> {
        if let Some(existing) = self.get(user_id)? {
            return Ok(existing);
        }
        let today = self.day.day_of(now);
        let score = CoupleScore {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            partner_id: partner_id.to_string(),
            total_score: 0,
            weekly_score: 0,
            monthly_score: 0,
            categories: CategoryScores::default(),
            level: 1,
            xp: 0,
            xp_to_next_level: self.leveling.base_xp,
            badges: Vec::new(),
            week_anchor: week_anchor(today),
            month_anchor: month_anchor(today),
        };
        save_json(self.store, &Self::key(user_id), &score)?;
        Ok(score)
    }

    /// Add points to a category and the XP pool, leveling up as many times
    /// as the pool allows.
    pub fn add_points(
        &self,
        user_id: &str,
        category: ScoreCategory,
        points: u32,
        now: DateTime<Utc>,
    ) -> Result<ScoreUpdate> {
        if points == 0 {
            return Err(ValidationError::ZeroPoints.into());
        }
        let mut score = self.get(user_id)?.ok_or_else(|| ValidationError::NotPaired {
            user_id: user_id.to_string(),
        })?;

        let today = self.day.day_of(now);
        roll_periods(&mut score, today);

        let points = u64::from(points);
        score.categories.add(category, points);
        score.total_score += points;
        score.weekly_score += points;
        score.monthly_score += points;
        score.xp += points;

        let mut levels_reached = Vec::new();
        while score.xp >= score.xp_to_next_level {
            score.xp -= score.xp_to_next_level;
            score.level += 1;
            // The threshold stays at 1 or above; every pass consumes XP.
            score.xp_to_next_level =
                ((score.xp_to_next_level as f64 * self.leveling.growth).floor() as u64).max(1);
            levels_reached.push(score.level);
        }

        save_json(self.store, &Self::key(user_id), &score)?;
        Ok(ScoreUpdate {
            score,
            points_awarded: points,
            levels_reached,
        })
    }
}

/// Monday of the ISO week containing `date`.
fn week_anchor(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// First day of the month containing `date`.
fn month_anchor(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Restart period counters whose anchor no longer covers `today`.
fn roll_periods(score: &mut CoupleScore, today: NaiveDate) {
    let week = week_anchor(today);
    if score.week_anchor != week {
        score.week_anchor = week;
        score.weekly_score = 0;
    }
    let month = month_anchor(today);
    if score.month_anchor != month {
        score.month_anchor = month;
        score.monthly_score = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn engine(store: &MemoryStore) -> CoupleScoreEngine<'_> {
        CoupleScoreEngine::new(store, DayBoundary::default(), LevelingConfig::default())
    }

    #[test]
    fn test_pair_creates_fresh_record() {
        let store = MemoryStore::new();
        let score = engine(&store).pair("alice", "bob", at(2026, 3, 10)).unwrap();

        assert_eq!(score.level, 1);
        assert_eq!(score.xp, 0);
        assert_eq!(score.xp_to_next_level, 100);
        assert_eq!(score.partner_id, "bob");
    }

    #[test]
    fn test_pair_is_idempotent() {
        let store = MemoryStore::new();
        let e = engine(&store);
        let first = e.pair("alice", "bob", at(2026, 3, 10)).unwrap();
        e.add_points("alice", ScoreCategory::Sharing, 40, at(2026, 3, 10))
            .unwrap();

        let again = e.pair("alice", "bob", at(2026, 3, 11)).unwrap();
        assert_eq!(again.id, first.id);
        assert_eq!(again.total_score, 40);
    }

    #[test]
    fn test_add_points_without_pairing_fails() {
        let store = MemoryStore::new();
        let err = engine(&store)
            .add_points("alice", ScoreCategory::Planning, 10, at(2026, 3, 10))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::NotPaired { .. })
        ));
    }

    #[test]
    fn test_points_feed_all_counters() {
        let store = MemoryStore::new();
        let e = engine(&store);
        e.pair("alice", "bob", at(2026, 3, 10)).unwrap();
        let update = e
            .add_points("alice", ScoreCategory::Communication, 30, at(2026, 3, 10))
            .unwrap();

        let s = &update.score;
        assert_eq!(s.categories.communication, 30);
        assert_eq!(s.total_score, 30);
        assert_eq!(s.weekly_score, 30);
        assert_eq!(s.monthly_score, 30);
        assert_eq!(s.xp, 30);
        assert!(update.levels_reached.is_empty());
    }

    #[test]
    fn test_exact_threshold_levels_up_to_zero_xp() {
        let store = MemoryStore::new();
        let e = engine(&store);
        e.pair("alice", "bob", at(2026, 3, 10)).unwrap();
        let update = e
            .add_points("alice", ScoreCategory::Engagement, 100, at(2026, 3, 10))
            .unwrap();

        assert_eq!(update.levels_reached, vec![2]);
        assert_eq!(update.score.level, 2);
        assert_eq!(update.score.xp, 0);
        assert_eq!(update.score.xp_to_next_level, 120);
    }

    #[test]
    fn test_single_level_jump_scenario() {
        // xp=90, xp_to_next=100; +30 -> level up, xp=20, next=120.
        let store = MemoryStore::new();
        let e = engine(&store);
        e.pair("alice", "bob", at(2026, 3, 10)).unwrap();
        e.add_points("alice", ScoreCategory::Engagement, 90, at(2026, 3, 10))
            .unwrap();

        let update = e
            .add_points("alice", ScoreCategory::Engagement, 30, at(2026, 3, 10))
            .unwrap();
        assert_eq!(update.score.level, 2);
        assert_eq!(update.score.xp, 20);
        assert_eq!(update.score.xp_to_next_level, 120);
    }

    #[test]
    fn test_multi_level_jump_loops() {
        // xp=90, +250: 340 total XP spent as 100 (level 2) + 120 (level 3),
        // leaving 120 toward the 144 needed for level 4.
        let store = MemoryStore::new();
        let e = engine(&store);
        e.pair("alice", "bob", at(2026, 3, 10)).unwrap();
        e.add_points("alice", ScoreCategory::Engagement, 90, at(2026, 3, 10))
            .unwrap();

        let update = e
            .add_points("alice", ScoreCategory::Engagement, 250, at(2026, 3, 10))
            .unwrap();
        assert_eq!(update.levels_reached, vec![2, 3]);
        assert_eq!(update.score.level, 3);
        assert_eq!(update.score.xp, 120);
        assert_eq!(update.score.xp_to_next_level, 144);
        assert!(update.score.xp < update.score.xp_to_next_level);
    }

    #[test]
    fn test_flat_growth_curve_still_terminates() {
        // A growth of 0.0 would floor the threshold to 0; the clamp keeps
        // it at 1 so the level loop cannot spin forever.
        let store = MemoryStore::new();
        let e = CoupleScoreEngine::new(
            &store,
            DayBoundary::default(),
            LevelingConfig {
                base_xp: 100,
                growth: 0.0,
            },
        );
        e.pair("alice", "bob", at(2026, 3, 10)).unwrap();

        let update = e
            .add_points("alice", ScoreCategory::Engagement, 100, at(2026, 3, 10))
            .unwrap();
        assert_eq!(update.score.level, 2);
        assert!(update.score.xp_to_next_level >= 1);

        // Every further point levels once; the pool still drains.
        let update = e
            .add_points("alice", ScoreCategory::Engagement, 3, at(2026, 3, 10))
            .unwrap();
        assert_eq!(update.levels_reached.len(), 3);
        assert_eq!(update.score.xp, 0);
    }

    #[test]
    fn test_weekly_rollover() {
        let store = MemoryStore::new();
        let e = engine(&store);
        // 2026-03-10 is a Tuesday; 2026-03-16 is the following Monday.
        e.pair("alice", "bob", at(2026, 3, 10)).unwrap();
        e.add_points("alice", ScoreCategory::Planning, 50, at(2026, 3, 10))
            .unwrap();

        let update = e
            .add_points("alice", ScoreCategory::Planning, 20, at(2026, 3, 16))
            .unwrap();
        assert_eq!(update.score.weekly_score, 20);
        assert_eq!(update.score.monthly_score, 70);
        assert_eq!(update.score.total_score, 70);
    }

    #[test]
    fn test_monthly_rollover() {
        let store = MemoryStore::new();
        let e = engine(&store);
        e.pair("alice", "bob", at(2026, 3, 25)).unwrap();
        e.add_points("alice", ScoreCategory::Consistency, 80, at(2026, 3, 25))
            .unwrap();

        let update = e
            .add_points("alice", ScoreCategory::Consistency, 15, at(2026, 4, 2))
            .unwrap();
        assert_eq!(update.score.monthly_score, 15);
        assert_eq!(update.score.total_score, 95);
    }

    #[test]
    fn test_zero_points_rejected() {
        let store = MemoryStore::new();
        let e = engine(&store);
        e.pair("alice", "bob", at(2026, 3, 10)).unwrap();
        let err = e
            .add_points("alice", ScoreCategory::Sharing, 0, at(2026, 3, 10))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::ZeroPoints)
        ));
    }
}
