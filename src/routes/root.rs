use crate::handler::health_handler;
use crate::routes::leaderboard;
use crate::state::leaderboard_state::LeaderboardState;
use axum::routing::{get, IntoMakeService};
use axum::Router;
use tower_http::trace::TraceLayer;

pub fn app(leaderboard_state: LeaderboardState) -> Router {
    let merged_router = Router::new()
        .merge(leaderboard::routes().with_state(leaderboard_state))
        .merge(Router::new().route("/health", get(health_handler::health)));

    Router::new()
        .nest("/api", merged_router)
        .layer(TraceLayer::new_for_http())
}

pub fn routes(leaderboard_state: LeaderboardState) -> IntoMakeService<Router> {
    app(leaderboard_state).into_make_service()
}
