pub mod leaderboard;
pub mod root;
