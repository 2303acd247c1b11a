//! Configuration commands for CLI.

use clap::Subcommand;
use tandem_core::EngineConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Set the day-boundary UTC offset in hours
    SetOffset {
        /// Offset from UTC in hours, e.g. -5 or 9
        #[arg(long, allow_hyphen_values = true)]
        hours: i32,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = EngineConfig::load()?;
            println!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::SetOffset { hours } => {
            if !(-12..=14).contains(&hours) {
                return Err(format!("offset {hours} is outside -12..=14").into());
            }
            let mut config = EngineConfig::load()?;
            config.day_boundary.utc_offset_hours = hours;
            config.save()?;
            println!("day boundary set to UTC{hours:+}");
        }
    }
    Ok(())
}
