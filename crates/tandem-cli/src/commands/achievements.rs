//! Achievement commands for CLI.

use clap::Subcommand;
use tandem_core::{ConsoleSink, EngagementEngine, EngineConfig, KvStore};

#[derive(Subcommand)]
pub enum AchievementsAction {
    /// List the full catalog with unlock state
    List {
        /// User ID
        #[arg(long)]
        user: String,
        /// Only show unlocked achievements
        #[arg(long)]
        unlocked: bool,
    },
    /// Re-scan unlock conditions now
    Evaluate {
        /// User ID
        #[arg(long)]
        user: String,
    },
}

pub fn run(action: AchievementsAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    let sink = ConsoleSink;
    let engine = EngagementEngine::new(&store, &sink, EngineConfig::load()?);

    match action {
        AchievementsAction::List { user, unlocked } => {
            let mut entries = engine.achievements(&user)?;
            if unlocked {
                entries.retain(|a| a.is_unlocked);
            }
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        AchievementsAction::Evaluate { user } => {
            let newly = engine.evaluate_achievements(&user)?;
            println!("{}", serde_json::to_string_pretty(&newly)?);
        }
    }
    Ok(())
}
