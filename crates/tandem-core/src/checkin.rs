//! Daily check-in ledger.
//!
//! Records one mood/energy entry per user per calendar day. Submitting a
//! second entry on the same local day is rejected; the only permitted
//! mutation afterwards is editing the optional note.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::DayBoundary;
use crate::error::{EngineError, Result, ValidationError};
use crate::storage::{load_json, save_json, user_key, Store};

/// Mood reported with a check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mood {
    Excited,
    Happy,
    Content,
    Neutral,
    Sad,
    Stressed,
    Tired,
}

/// Counting window for activity-count queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CountWindow {
    /// Since local midnight.
    Daily,
    /// Trailing 7 days, including today.
    Weekly,
    /// Calendar month to date.
    Monthly,
    /// Unwindowed.
    AllTime,
}

/// A persisted daily check-in. At most one exists per (user, date).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: String,
    pub user_id: String,
    /// Local calendar day the check-in counts for.
    pub date: NaiveDate,
    pub mood: Mood,
    /// Energy rating, 1-10.
    pub energy: u8,
    pub note: Option<String>,
    /// Whether the entry is visible to the partner.
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
}

/// A check-in submission before validation.
#[derive(Debug, Clone)]
pub struct NewCheckIn {
    pub mood: Mood,
    pub energy: u8,
    pub note: Option<String>,
    pub is_shared: bool,
}

impl NewCheckIn {
    pub fn new(mood: Mood, energy: u8) -> Self {
        Self {
            mood,
            energy,
            note: None,
            is_shared: true,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn shared(mut self, is_shared: bool) -> Self {
        self.is_shared = is_shared;
        self
    }
}

/// Ledger of daily check-ins for one storage backend.
pub struct CheckInLedger<'a> {
    store: &'a dyn Store,
    day: DayBoundary,
}

impl<'a> CheckInLedger<'a> {
    pub fn new(store: &'a dyn Store, day: DayBoundary) -> Self {
        Self { store, day }
    }

    fn key(user_id: &str) -> String {
        user_key("checkins", user_id)
    }

    /// All check-ins recorded for the user, oldest first.
    pub fn all(&self, user_id: &str) -> Result<Vec<CheckIn>> {
        Ok(load_json(self.store, &Self::key(user_id))?.unwrap_or_default())
    }

    /// Submit today's check-in.
    ///
    /// Fails with [`EngineError::DuplicateCheckIn`] if the user already has
    /// an entry for the current local day, leaving stored state untouched.
    pub fn submit(&self, user_id: &str, entry: NewCheckIn, now: DateTime<Utc>) -> Result<CheckIn> {
        if !(1..=10).contains(&entry.energy) {
            return Err(ValidationError::EnergyOutOfRange { value: entry.energy }.into());
        }

        let date = self.day.day_of(now);
        let mut entries = self.all(user_id)?;
        if entries.iter().any(|c| c.date == date) {
            return Err(EngineError::DuplicateCheckIn {
                user_id: user_id.to_string(),
                date,
            });
        }

        let check_in = CheckIn {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date,
            mood: entry.mood,
            energy: entry.energy,
            note: entry.note,
            is_shared: entry.is_shared,
            created_at: now,
        };
        entries.push(check_in.clone());
        save_json(self.store, &Self::key(user_id), &entries)?;
        Ok(check_in)
    }

    /// The user's check-in for `date`, if any.
    pub fn get_for_date(&self, user_id: &str, date: NaiveDate) -> Result<Option<CheckIn>> {
        Ok(self.all(user_id)?.into_iter().find(|c| c.date == date))
    }

    /// Whether the user has already checked in on the current local day.
    pub fn checked_in_today(&self, user_id: &str, now: DateTime<Utc>) -> Result<bool> {
        Ok(self.get_for_date(user_id, self.day.day_of(now))?.is_some())
    }

    /// Replace the note on an existing check-in. The note edit is the only
    /// mutation the ledger permits.
    pub fn update_note(
        &self,
        user_id: &str,
        date: NaiveDate,
        note: Option<String>,
    ) -> Result<CheckIn> {
        let mut entries = self.all(user_id)?;
        let entry = entries
            .iter_mut()
            .find(|c| c.date == date)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "date".to_string(),
                message: format!("no check-in recorded for {date}"),
            })?;
        entry.note = note;
        let updated = entry.clone();
        save_json(self.store, &Self::key(user_id), &entries)?;
        Ok(updated)
    }

    /// Number of check-ins falling inside `window`, evaluated at `now`.
    pub fn count_in_window(
        &self,
        user_id: &str,
        window: CountWindow,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let today = self.day.day_of(now);
        let entries = self.all(user_id)?;
        let count = entries
            .iter()
            .filter(|c| match window {
                CountWindow::Daily => c.date == today,
                CountWindow::Weekly => c.date > today - Duration::days(7) && c.date <= today,
                CountWindow::Monthly => {
                    c.date.year() == today.year() && c.date.month() == today.month()
                }
                CountWindow::AllTime => true,
            })
            .count();
        Ok(count)
    }
}
