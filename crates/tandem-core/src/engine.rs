//! Engagement engine composition.
//!
//! Wires the check-in ledger, streak tracker, couple score engine, and
//! achievement evaluator into the submit-check-in control flow, and
//! forwards every emitted event to the injected notification sink.
//!
//! Dependencies are constructor-injected rather than module-level
//! singletons so tests can substitute [`MemoryStore`](crate::storage::MemoryStore)
//! and [`MemorySink`](crate::notify::MemorySink).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::achievements::{Achievement, AchievementEvaluator};
use crate::checkin::{CheckIn, CheckInLedger, NewCheckIn};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::notify::{Notification, NotificationSink};
use crate::score::{CoupleScore, CoupleScoreEngine, ScoreCategory, ScoreUpdate};
use crate::storage::Store;
use crate::streak::{Streak, StreakTracker, StreakType, StreakUpdate};

/// Everything that happened in response to one check-in submission.
#[derive(Debug, Clone, Serialize)]
pub struct CheckInOutcome {
    pub check_in: CheckIn,
    pub streak: StreakUpdate,
    /// Absent when the user has no partner pairing yet.
    pub score: Option<ScoreUpdate>,
    pub unlocked: Vec<Achievement>,
}

/// Result of recording a non-check-in activity.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityOutcome {
    pub streak: StreakUpdate,
    pub unlocked: Vec<Achievement>,
}

/// Result of a direct point award.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutcome {
    pub update: ScoreUpdate,
    pub unlocked: Vec<Achievement>,
}

/// The engagement engine: check-ins, streaks, couple score, achievements.
pub struct EngagementEngine<'a> {
    store: &'a dyn Store,
    sink: &'a dyn NotificationSink,
    config: EngineConfig,
}

impl<'a> EngagementEngine<'a> {
    pub fn new(store: &'a dyn Store, sink: &'a dyn NotificationSink, config: EngineConfig) -> Self {
        Self {
            store,
            sink,
            config,
        }
    }

    fn ledger(&self) -> CheckInLedger<'a> {
        CheckInLedger::new(self.store, self.config.day_boundary)
    }

    fn tracker(&self) -> StreakTracker<'a> {
        StreakTracker::new(self.store, self.config.day_boundary)
    }

    fn scores(&self) -> CoupleScoreEngine<'a> {
        CoupleScoreEngine::new(
            self.store,
            self.config.day_boundary,
            self.config.leveling.clone(),
        )
    }

    fn evaluator(&self) -> AchievementEvaluator<'a> {
        AchievementEvaluator::new(self.store, self.config.day_boundary)
    }

    /// Submit today's check-in and run the full engagement flow:
    /// ledger, streak, couple score, achievement scan, notifications.
    pub fn submit_check_in(&self, user_id: &str, entry: NewCheckIn) -> Result<CheckInOutcome> {
        self.submit_check_in_at(user_id, entry, Utc::now())
    }

    /// [`submit_check_in`](Self::submit_check_in) with an explicit clock.
    pub fn submit_check_in_at(
        &self,
        user_id: &str,
        entry: NewCheckIn,
        now: DateTime<Utc>,
    ) -> Result<CheckInOutcome> {
        let check_in = self.ledger().submit(user_id, entry, now)?;

        let streak = self
            .tracker()
            .record_activity(user_id, StreakType::DailyCheckin, now)?;
        self.dispatch_streak(user_id, &streak);

        let score = if self.scores().get(user_id)?.is_some() {
            let update = self.scores().add_points(
                user_id,
                self.config.points.checkin_category,
                self.config.points.checkin,
                now,
            )?;
            self.dispatch_levels(user_id, &update);
            Some(update)
        } else {
            // Check-ins work before a pairing exists; only the shared
            // score is skipped.
            None
        };

        let unlocked = self.evaluator().evaluate(user_id, now)?;
        self.dispatch_unlocks(user_id, &unlocked);

        Ok(CheckInOutcome {
            check_in,
            streak,
            score,
            unlocked,
        })
    }

    /// Record a qualifying activity for a non-check-in streak type.
    pub fn record_activity(&self, user_id: &str, kind: StreakType) -> Result<ActivityOutcome> {
        self.record_activity_at(user_id, kind, Utc::now())
    }

    pub fn record_activity_at(
        &self,
        user_id: &str,
        kind: StreakType,
        now: DateTime<Utc>,
    ) -> Result<ActivityOutcome> {
        let streak = self.tracker().record_activity(user_id, kind, now)?;
        self.dispatch_streak(user_id, &streak);

        let unlocked = self.evaluator().evaluate(user_id, now)?;
        self.dispatch_unlocks(user_id, &unlocked);

        Ok(ActivityOutcome { streak, unlocked })
    }

    /// Award points directly to a score category.
    pub fn add_points(
        &self,
        user_id: &str,
        category: ScoreCategory,
        points: u32,
    ) -> Result<ScoreOutcome> {
        self.add_points_at(user_id, category, points, Utc::now())
    }

    pub fn add_points_at(
        &self,
        user_id: &str,
        category: ScoreCategory,
        points: u32,
        now: DateTime<Utc>,
    ) -> Result<ScoreOutcome> {
        let update = self.scores().add_points(user_id, category, points, now)?;
        self.dispatch_levels(user_id, &update);

        let unlocked = self.evaluator().evaluate(user_id, now)?;
        self.dispatch_unlocks(user_id, &unlocked);

        Ok(ScoreOutcome { update, unlocked })
    }

    /// Establish a partner pairing (idempotent).
    pub fn pair(&self, user_id: &str, partner_id: &str) -> Result<CoupleScore> {
        self.scores().pair(user_id, partner_id, Utc::now())
    }

    /// Re-scan the achievement catalog without mutating anything else.
    pub fn evaluate_achievements(&self, user_id: &str) -> Result<Vec<Achievement>> {
        let unlocked = self.evaluator().evaluate(user_id, Utc::now())?;
        self.dispatch_unlocks(user_id, &unlocked);
        Ok(unlocked)
    }

    // Read side.

    pub fn checked_in_today(&self, user_id: &str) -> Result<bool> {
        self.ledger().checked_in_today(user_id, Utc::now())
    }

    pub fn check_ins(&self, user_id: &str) -> Result<Vec<CheckIn>> {
        self.ledger().all(user_id)
    }

    pub fn streaks(&self, user_id: &str) -> Result<Vec<Streak>> {
        self.tracker().all(user_id)
    }

    pub fn couple_score(&self, user_id: &str) -> Result<Option<CoupleScore>> {
        self.scores().get(user_id)
    }

    pub fn achievements(&self, user_id: &str) -> Result<Vec<Achievement>> {
        self.evaluator().all(user_id)
    }

    fn dispatch_streak(&self, user_id: &str, update: &StreakUpdate) {
        match update {
            StreakUpdate::Extended { streak, milestones } => {
                for &days in milestones {
                    self.sink
                        .notify(user_id, &Notification::milestone(streak.kind, days));
                }
            }
            StreakUpdate::Reset {
                streak,
                previous,
                broken: true,
            } => {
                self.sink
                    .notify(user_id, &Notification::streak_broken(streak.kind, *previous));
            }
            _ => {}
        }
    }

    fn dispatch_levels(&self, user_id: &str, update: &ScoreUpdate) {
        for &level in &update.levels_reached {
            self.sink.notify(user_id, &Notification::level_up(level));
        }
    }

    fn dispatch_unlocks(&self, user_id: &str, unlocked: &[Achievement]) {
        for achievement in unlocked {
            self.sink
                .notify(user_id, &Notification::achievement(achievement));
        }
    }
}
