pub mod leaderboard_dto;
