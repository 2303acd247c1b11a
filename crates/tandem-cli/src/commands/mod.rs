pub mod achievements;
pub mod checkin;
pub mod config;
pub mod score;
pub mod streak;
