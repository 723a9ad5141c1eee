pub mod health_handler;
pub mod leaderboard_handler;
