//! Consecutive-day streak tracking.
//!
//! One streak record exists per (user, activity type), created lazily on
//! first activity. The update rule is a day-gap state machine:
//! - gap 0: no-op, guards against double counting within a day
//! - gap 1: extend the run, claim any newly reached milestones
//! - gap > 1: the run resets to 1; the longest run is retained

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DayBoundary;
use crate::error::Result;
use crate::storage::{load_json, save_json, user_key, Store};

/// Streak lengths celebrated once per streak lifetime.
pub const MILESTONES: [u32; 6] = [3, 7, 14, 30, 60, 100];

/// Activity types that maintain a streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreakType {
    DailyCheckin,
    TaskCompletion,
    NoteSharing,
    EventPlanning,
    FinanceTracking,
}

impl StreakType {
    /// Target day-count shown to the user for this activity.
    pub fn goal(&self) -> u32 {
        match self {
            StreakType::DailyCheckin => 30,
            StreakType::TaskCompletion => 14,
            StreakType::NoteSharing => 7,
            StreakType::EventPlanning => 4,
            StreakType::FinanceTracking => 7,
        }
    }

    pub fn all() -> [StreakType; 5] {
        [
            StreakType::DailyCheckin,
            StreakType::TaskCompletion,
            StreakType::NoteSharing,
            StreakType::EventPlanning,
            StreakType::FinanceTracking,
        ]
    }

    /// Human-readable label for notifications.
    pub fn label(&self) -> &'static str {
        match self {
            StreakType::DailyCheckin => "daily check-in",
            StreakType::TaskCompletion => "task completion",
            StreakType::NoteSharing => "note sharing",
            StreakType::EventPlanning => "event planning",
            StreakType::FinanceTracking => "finance tracking",
        }
    }
}

/// A running consecutive-day counter for one activity type.
///
/// Invariant: `longest_streak >= current_streak` after every update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Streak {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StreakType,
    pub user_id: String,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: NaiveDate,
    /// First day of the current run.
    pub start_date: NaiveDate,
    pub goal: u32,
    /// Highest milestone already celebrated, 0 if none.
    pub milestone: u32,
    /// Milestones claimed over the streak's lifetime.
    pub achievements: Vec<u32>,
}

impl Streak {
    fn start(user_id: &str, kind: StreakType, today: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            user_id: user_id.to_string(),
            current_streak: 1,
            longest_streak: 1,
            last_activity_date: today,
            start_date: today,
            goal: kind.goal(),
            milestone: 0,
            achievements: Vec::new(),
        }
    }
}

/// Outcome of recording an activity.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "kebab-case")]
pub enum StreakUpdate {
    /// First activity of this type ever recorded for the user.
    Started { streak: Streak },
    /// Activity already recorded today; nothing changed.
    AlreadyRecorded { streak: Streak },
    /// The run continued; any newly reached milestones are listed.
    Extended { streak: Streak, milestones: Vec<u32> },
    /// A gap of more than one day reset the run.
    Reset {
        streak: Streak,
        /// Length of the run that ended.
        previous: u32,
        /// Whether the ended run was long enough to announce as broken.
        broken: bool,
    },
}

impl StreakUpdate {
    pub fn streak(&self) -> &Streak {
        match self {
            StreakUpdate::Started { streak }
            | StreakUpdate::AlreadyRecorded { streak }
            | StreakUpdate::Extended { streak, .. }
            | StreakUpdate::Reset { streak, .. } => streak,
        }
    }
}

/// Maintains per-activity streak records.
pub struct StreakTracker<'a> {
    store: &'a dyn Store,
    day: DayBoundary,
}

impl<'a> StreakTracker<'a> {
    pub fn new(store: &'a dyn Store, day: DayBoundary) -> Self {
        Self { store, day }
    }

    fn key(user_id: &str) -> String {
        user_key("streaks", user_id)
    }

    /// All streak records for the user.
    pub fn all(&self, user_id: &str) -> Result<Vec<Streak>> {
        Ok(load_json(self.store, &Self::key(user_id))?.unwrap_or_default())
    }

    /// The user's streak for one activity type, if it exists yet.
    pub fn get(&self, user_id: &str, kind: StreakType) -> Result<Option<Streak>> {
        Ok(self.all(user_id)?.into_iter().find(|s| s.kind == kind))
    }

    /// Record a qualifying activity for `now`'s local day.
    pub fn record_activity(
        &self,
        user_id: &str,
        kind: StreakType,
        now: DateTime<Utc>,
    ) -> Result<StreakUpdate> {
        let today = self.day.day_of(now);
        let mut streaks = self.all(user_id)?;

        let Some(idx) = streaks.iter().position(|s| s.kind == kind) else {
            let streak = Streak::start(user_id, kind, today);
            streaks.push(streak.clone());
            save_json(self.store, &Self::key(user_id), &streaks)?;
            return Ok(StreakUpdate::Started { streak });
        };
        let streak = &mut streaks[idx];

        let days_since_last = (today - streak.last_activity_date).num_days();
        let update = if days_since_last <= 0 {
            // Same day (or a clock that moved backwards): never double count.
            StreakUpdate::AlreadyRecorded {
                streak: streak.clone(),
            }
        } else if days_since_last == 1 {
            streak.current_streak += 1;
            streak.longest_streak = streak.longest_streak.max(streak.current_streak);
            streak.last_activity_date = today;
            let milestones = claim_milestones(streak);
            StreakUpdate::Extended {
                streak: streak.clone(),
                milestones,
            }
        } else {
            let previous = streak.current_streak;
            streak.current_streak = 1;
            streak.last_activity_date = today;
            streak.start_date = today;
            StreakUpdate::Reset {
                streak: streak.clone(),
                previous,
                broken: previous >= 2,
            }
        };

        if !matches!(update, StreakUpdate::AlreadyRecorded { .. }) {
            save_json(self.store, &Self::key(user_id), &streaks)?;
        }
        Ok(update)
    }
}

/// Claim every milestone the current run has reached but not yet
/// celebrated. Returns the newly claimed values, ascending.
fn claim_milestones(streak: &mut Streak) -> Vec<u32> {
    let mut claimed = Vec::new();
    for &m in MILESTONES.iter() {
        if streak.current_streak >= m && !streak.achievements.contains(&m) {
            streak.achievements.push(m);
            streak.milestone = streak.milestone.max(m);
            claimed.push(m);
        }
    }
    claimed
}
