use crate::analytics::client::AnalyticsClient;
use crate::service::leaderboard_service::{DynInteractionRepository, LeaderboardService};
use std::sync::Arc;

pub type DynAnalyticsClient = Arc<dyn AnalyticsClient + Send + Sync>;

#[derive(Clone)]
pub struct LeaderboardState {
    pub leaderboard_service: Arc<LeaderboardService>,
    /// 上报客户端由外部注入
    pub analytics: DynAnalyticsClient,
}

impl LeaderboardState {
    pub fn new(interaction_repo: DynInteractionRepository, analytics: DynAnalyticsClient) -> Self {
        Self {
            leaderboard_service: Arc::new(LeaderboardService::new(interaction_repo)),
            analytics,
        }
    }
}
