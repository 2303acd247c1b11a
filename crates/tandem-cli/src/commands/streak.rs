//! Streak tracking commands for CLI.

use clap::Subcommand;
use tandem_core::{ConsoleSink, EngagementEngine, EngineConfig, KvStore, StreakType};

#[derive(Subcommand)]
pub enum StreakAction {
    /// Record a qualifying activity for today
    Record {
        /// User ID
        #[arg(long)]
        user: String,
        /// Activity type: daily-checkin, task-completion, note-sharing,
        /// event-planning, finance-tracking
        #[arg(long = "type")]
        kind: String,
    },
    /// Show all streaks
    Show {
        /// User ID
        #[arg(long)]
        user: String,
    },
}

fn parse_type(s: &str) -> Result<StreakType, Box<dyn std::error::Error>> {
    let kind = match s {
        "daily-checkin" => StreakType::DailyCheckin,
        "task-completion" => StreakType::TaskCompletion,
        "note-sharing" => StreakType::NoteSharing,
        "event-planning" => StreakType::EventPlanning,
        "finance-tracking" => StreakType::FinanceTracking,
        other => return Err(format!("unknown streak type '{other}'").into()),
    };
    Ok(kind)
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    let sink = ConsoleSink;
    let engine = EngagementEngine::new(&store, &sink, EngineConfig::load()?);

    match action {
        StreakAction::Record { user, kind } => {
            let kind = parse_type(&kind)?;
            let outcome = engine.record_activity(&user, kind)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        StreakAction::Show { user } => {
            let streaks = engine.streaks(&user)?;
            println!("{}", serde_json::to_string_pretty(&streaks)?);
        }
    }
    Ok(())
}
