//! Daily check-in commands for CLI.

use clap::Subcommand;
use serde_json::json;
use tandem_core::{ConsoleSink, EngagementEngine, EngineConfig, KvStore, Mood, NewCheckIn};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Submit today's check-in
    Submit {
        /// User ID
        #[arg(long)]
        user: String,
        /// Mood: excited, happy, content, neutral, sad, stressed, tired
        #[arg(long)]
        mood: String,
        /// Energy rating, 1-10
        #[arg(long)]
        energy: u8,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
        /// Keep the entry private from the partner
        #[arg(long)]
        private: bool,
    },
    /// Show today's check-in status and history
    Status {
        /// User ID
        #[arg(long)]
        user: String,
    },
}

fn parse_mood(s: &str) -> Result<Mood, Box<dyn std::error::Error>> {
    let mood = match s {
        "excited" => Mood::Excited,
        "happy" => Mood::Happy,
        "content" => Mood::Content,
        "neutral" => Mood::Neutral,
        "sad" => Mood::Sad,
        "stressed" => Mood::Stressed,
        "tired" => Mood::Tired,
        other => return Err(format!("unknown mood '{other}'").into()),
    };
    Ok(mood)
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    let sink = ConsoleSink;
    let engine = EngagementEngine::new(&store, &sink, EngineConfig::load()?);

    match action {
        CheckinAction::Submit {
            user,
            mood,
            energy,
            note,
            private,
        } => {
            let mut entry = NewCheckIn::new(parse_mood(&mood)?, energy).shared(!private);
            if let Some(note) = note {
                entry = entry.with_note(note);
            }
            let outcome = engine.submit_check_in(&user, entry)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        CheckinAction::Status { user } => {
            let entries = engine.check_ins(&user)?;
            let status = json!({
                "checked_in_today": engine.checked_in_today(&user)?,
                "total": entries.len(),
                "check_ins": entries,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
    }
    Ok(())
}
