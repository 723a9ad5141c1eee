use crate::{handler::leaderboard_handler, state::leaderboard_state::LeaderboardState};
use axum::{routing::get, Router};

pub const LEADERBOARD_PATH: &str = "/leaderboard";

pub fn routes() -> Router<LeaderboardState> {
    Router::new().route(
        LEADERBOARD_PATH,
        get(leaderboard_handler::get_leaderboard).post(leaderboard_handler::get_leaderboard),
    )
}
