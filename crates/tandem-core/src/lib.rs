//! # Tandem Core Library
//!
//! Core engagement engine for Tandem, a couples activity tracker. It
//! implements a CLI-first philosophy where all operations are available
//! via a standalone CLI binary, with any GUI being a thin layer over the
//! same core library.
//!
//! ## Architecture
//!
//! - **Check-In Ledger**: one mood/energy entry per user per calendar day
//! - **Streak Tracker**: consecutive-day counters per activity type, with
//!   milestone celebration at 3/7/14/30/60/100 days
//! - **Couple Score Engine**: category-weighted points into an XP/level
//!   curve shared by a paired couple
//! - **Achievement Evaluator**: static unlock catalog, scanned lazily
//!   after every relevant mutation
//! - **Storage**: SQLite-backed key-value blobs plus TOML configuration
//! - **Notifications**: pluggable sink (console, webhook, in-memory)
//!
//! ## Key Components
//!
//! - [`EngagementEngine`]: composed engine running the full check-in flow
//! - [`KvStore`]: JSON-blob persistence
//! - [`EngineConfig`]: day-boundary, points, and leveling configuration

pub mod achievements;
pub mod checkin;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod score;
pub mod storage;
pub mod streak;

pub use achievements::{catalog, Achievement, AchievementCategory, AchievementEvaluator, Rarity, Requirement};
pub use checkin::{CheckIn, CheckInLedger, CountWindow, Mood, NewCheckIn};
pub use config::{DayBoundary, EngineConfig, LevelingConfig, PointsConfig};
pub use engine::{ActivityOutcome, CheckInOutcome, EngagementEngine, ScoreOutcome};
pub use error::{ConfigError, EngineError, StorageError, ValidationError};
pub use notify::{ConsoleSink, MemorySink, Notification, NotificationCategory, NotificationSink, Priority, WebhookSink};
pub use score::{CategoryScores, CoupleScore, CoupleScoreEngine, ScoreCategory, ScoreUpdate};
pub use storage::{KvStore, MemoryStore, Store};
pub use streak::{Streak, StreakTracker, StreakType, StreakUpdate, MILESTONES};
