//! Notification dispatch seam.
//!
//! The engine emits milestone, level-up, achievement, and streak-broken
//! events through a [`NotificationSink`]. Delivery is fire-and-forget:
//! sinks never propagate failures back into the mutation that produced
//! the event.

use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use crate::achievements::Achievement;
use crate::streak::StreakType;

/// What kind of event a notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationCategory {
    Milestone,
    LevelUp,
    Achievement,
    StreakBroken,
    Reminder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// A user-facing notification payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub category: NotificationCategory,
    pub priority: Priority,
}

impl Notification {
    pub fn milestone(kind: StreakType, days: u32) -> Self {
        Self {
            title: format!("{days}-day streak!"),
            message: format!("Your {} streak reached {days} days. Keep it going!", kind.label()),
            category: NotificationCategory::Milestone,
            priority: Priority::Normal,
        }
    }

    pub fn level_up(level: u32) -> Self {
        Self {
            title: format!("Level {level}!"),
            message: format!("Your couple score reached level {level}."),
            category: NotificationCategory::LevelUp,
            priority: Priority::Normal,
        }
    }

    pub fn achievement(achievement: &Achievement) -> Self {
        Self {
            title: format!("Achievement unlocked: {}", achievement.name),
            message: achievement.description.clone(),
            category: NotificationCategory::Achievement,
            priority: Priority::High,
        }
    }

    pub fn streak_broken(kind: StreakType, previous: u32) -> Self {
        Self {
            title: "Streak ended".to_string(),
            message: format!(
                "Your {}-day {} streak ended. A new one starts today.",
                previous,
                kind.label()
            ),
            category: NotificationCategory::StreakBroken,
            priority: Priority::Low,
        }
    }
}

/// Delivery channel for notifications. Fire-and-forget; implementations
/// must not fail the calling mutation.
pub trait NotificationSink {
    fn notify(&self, user_id: &str, notification: &Notification);
}

/// Records notifications in memory; the test double.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<(String, Notification)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications sent so far, in order.
    pub fn sent(&self) -> Vec<(String, Notification)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Notifications sent to one user.
    pub fn sent_to(&self, user_id: &str) -> Vec<Notification> {
        self.sent()
            .into_iter()
            .filter(|(u, _)| u == user_id)
            .map(|(_, n)| n)
            .collect()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, user_id: &str, notification: &Notification) {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push((user_id.to_string(), notification.clone()));
        }
    }
}

/// Prints notifications to stderr; used by the CLI.
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, user_id: &str, notification: &Notification) {
        eprintln!(
            "[{user_id}] {}: {}",
            notification.title, notification.message
        );
    }
}

/// POSTs notification JSON to a webhook URL.
///
/// The payload is `{"user_id", "title", "message", "category", "priority"}`.
/// Non-2xx responses and transport errors are reported to stderr and
/// otherwise swallowed.
pub struct WebhookSink {
    url: String,
    client: reqwest::blocking::Client,
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    user_id: &'a str,
    #[serde(flatten)]
    notification: &'a Notification,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl NotificationSink for WebhookSink {
    fn notify(&self, user_id: &str, notification: &Notification) {
        let payload = WebhookPayload {
            user_id,
            notification,
        };
        match self.client.post(&self.url).json(&payload).send() {
            Ok(response) if !response.status().is_success() => {
                eprintln!(
                    "webhook delivery failed: {} returned {}",
                    self.url,
                    response.status()
                );
            }
            Err(e) => eprintln!("webhook delivery failed: {e}"),
            Ok(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_records_per_user() {
        let sink = MemorySink::new();
        sink.notify("alice", &Notification::level_up(2));
        sink.notify("bob", &Notification::level_up(3));
        sink.notify("alice", &Notification::milestone(StreakType::DailyCheckin, 7));

        let alice = sink.sent_to("alice");
        assert_eq!(alice.len(), 2);
        assert_eq!(alice[0].category, NotificationCategory::LevelUp);
        assert_eq!(alice[1].category, NotificationCategory::Milestone);
        assert_eq!(sink.sent_to("bob").len(), 1);
    }

    #[test]
    fn test_milestone_wording() {
        let n = Notification::milestone(StreakType::FinanceTracking, 14);
        assert_eq!(n.title, "14-day streak!");
        assert!(n.message.contains("finance tracking"));
    }

    #[test]
    fn test_webhook_sink_posts_payload() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/hook")
            .match_header("content-type", "application/json")
            .with_status(200)
            .create();

        let sink = WebhookSink::new(format!("{}/hook", server.url()));
        sink.notify("alice", &Notification::level_up(5));

        mock.assert();
    }

    #[test]
    fn test_webhook_sink_swallows_failures() {
        let mut server = mockito::Server::new();
        server.mock("POST", "/hook").with_status(500).create();

        let sink = WebhookSink::new(format!("{}/hook", server.url()));
        // Must not panic or propagate.
        sink.notify("alice", &Notification::level_up(5));
    }

    #[test]
    fn test_payload_serialization() {
        let n = Notification {
            title: "t".into(),
            message: "m".into(),
            category: NotificationCategory::StreakBroken,
            priority: Priority::Low,
        };
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["category"], "streak-broken");
        assert_eq!(json["priority"], "low");
    }
}
