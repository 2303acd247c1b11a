//! Couple score commands for CLI.

use clap::Subcommand;
use tandem_core::{ConsoleSink, EngagementEngine, EngineConfig, KvStore, ScoreCategory};

#[derive(Subcommand)]
pub enum ScoreAction {
    /// Establish a partner pairing
    Pair {
        /// User ID
        #[arg(long)]
        user: String,
        /// Partner's user ID
        #[arg(long)]
        partner: String,
    },
    /// Award points to a category
    Add {
        /// User ID
        #[arg(long)]
        user: String,
        /// Category: communication, planning, sharing, engagement, consistency
        #[arg(long)]
        category: String,
        /// Points to award
        #[arg(long)]
        points: u32,
    },
    /// Show the couple score
    Show {
        /// User ID
        #[arg(long)]
        user: String,
    },
}

fn parse_category(s: &str) -> Result<ScoreCategory, Box<dyn std::error::Error>> {
    let category = match s {
        "communication" => ScoreCategory::Communication,
        "planning" => ScoreCategory::Planning,
        "sharing" => ScoreCategory::Sharing,
        "engagement" => ScoreCategory::Engagement,
        "consistency" => ScoreCategory::Consistency,
        other => return Err(format!("unknown category '{other}'").into()),
    };
    Ok(category)
}

pub fn run(action: ScoreAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    let sink = ConsoleSink;
    let engine = EngagementEngine::new(&store, &sink, EngineConfig::load()?);

    match action {
        ScoreAction::Pair { user, partner } => {
            let score = engine.pair(&user, &partner)?;
            println!("{}", serde_json::to_string_pretty(&score)?);
        }
        ScoreAction::Add {
            user,
            category,
            points,
        } => {
            let category = parse_category(&category)?;
            let outcome = engine.add_points(&user, category, points)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ScoreAction::Show { user } => match engine.couple_score(&user)? {
            Some(score) => println!("{}", serde_json::to_string_pretty(&score)?),
            None => println!("{{}}"),
        },
    }
    Ok(())
}
