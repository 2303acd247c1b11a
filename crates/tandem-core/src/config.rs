//! TOML-based engine configuration.
//!
//! Stores:
//! - The day-boundary policy (fixed UTC offset defining "today")
//! - Point awards per activity and the score category they feed
//! - The XP leveling curve
//!
//! Configuration is stored at `~/.config/tandem/config.toml`.

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::score::ScoreCategory;
use crate::storage::data_dir;

/// Day-boundary policy: which calendar day an instant falls on.
///
/// "Calendar day" decisions (duplicate check-ins, streak gaps, count
/// windows, period anchors) all go through this policy instead of relying
/// on ambient `Date` defaults. The offset is the user's fixed UTC offset
/// in hours; DST shifts require the user to update it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBoundary {
    /// Offset from UTC in hours, in [-12, 14].
    #[serde(default)]
    pub utc_offset_hours: i32,
}

impl Default for DayBoundary {
    fn default() -> Self {
        Self { utc_offset_hours: 0 }
    }
}

impl DayBoundary {
    /// Policy with an explicit UTC offset.
    pub fn with_offset(utc_offset_hours: i32) -> Self {
        Self { utc_offset_hours }
    }

    /// Reject offsets outside the real-world UTC offset range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ConfigError::InvalidValue {
                field: "day_boundary.utc_offset_hours".into(),
                message: format!(
                    "must be between -12 and 14, got {}",
                    self.utc_offset_hours
                ),
            });
        }
        Ok(())
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("zero offset is valid"))
    }

    /// The local calendar day the instant falls on.
    pub fn day_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset()).date_naive()
    }

    /// Local midnight at the start of `date`, as a UTC instant.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        let midnight = date.and_hms_opt(0, 0, 0).expect("midnight is valid");
        match self.offset().from_local_datetime(&midnight) {
            chrono::LocalResult::Single(dt) => dt.with_timezone(&Utc),
            // Fixed offsets never produce ambiguous local times.
            _ => Utc.from_utc_datetime(&midnight),
        }
    }
}

/// Point awards per activity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointsConfig {
    /// Points granted for a daily check-in.
    #[serde(default = "default_checkin_points")]
    pub checkin: u32,
    /// Score category a check-in feeds.
    #[serde(default = "default_checkin_category")]
    pub checkin_category: ScoreCategory,
}

/// XP leveling curve: each level costs `floor(previous * growth)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelingConfig {
    /// XP required to reach level 2.
    #[serde(default = "default_base_xp")]
    pub base_xp: u64,
    /// Per-level cost multiplier.
    #[serde(default = "default_growth")]
    pub growth: f64,
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/tandem/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub day_boundary: DayBoundary,
    #[serde(default)]
    pub points: PointsConfig,
    #[serde(default)]
    pub leveling: LevelingConfig,
}

// Default functions
fn default_checkin_points() -> u32 {
    10
}
fn default_checkin_category() -> ScoreCategory {
    ScoreCategory::Engagement
}
fn default_base_xp() -> u64 {
    100
}
fn default_growth() -> f64 {
    1.2
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            checkin: default_checkin_points(),
            checkin_category: default_checkin_category(),
        }
    }
}

impl Default for LevelingConfig {
    fn default() -> Self {
        Self {
            base_xp: default_base_xp(),
            growth: default_growth(),
        }
    }
}

impl LevelingConfig {
    /// Reject curves under which the level threshold can reach zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_xp == 0 {
            return Err(ConfigError::InvalidValue {
                field: "leveling.base_xp".into(),
                message: "must be at least 1".into(),
            });
        }
        if !self.growth.is_finite() || self.growth < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "leveling.growth".into(),
                message: format!("must be a finite value >= 1.0, got {}", self.growth),
            });
        }
        Ok(())
    }
}

impl EngineConfig {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Check every tunable against its allowed range.
    ///
    /// Runs on every [`load`](Self::load) so a hand-edited `config.toml`
    /// surfaces an error instead of changing behavior silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.day_boundary.validate()?;
        self.leveling.validate()?;
        Ok(())
    }

    /// Load the configuration, falling back to defaults if the file does
    /// not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config: Self =
            toml::from_str(&raw).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Persist the configuration.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}
