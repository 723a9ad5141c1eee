use crate::dto::leaderboard_dto::LeaderboardEntry;
use crate::error::api_error::ApiError;
use crate::error::query_error::QueryExecutionError;
use crate::repository::interaction_repository::InteractionRepositoryTrait;
use std::sync::Arc;
use std::time::Instant;

pub type DynInteractionRepository = Arc<dyn InteractionRepositoryTrait + Send + Sync>;

#[derive(Clone)]
pub struct LeaderboardService {
    interaction_repo: DynInteractionRepository,
}

impl LeaderboardService {
    pub fn new(interaction_repo: DynInteractionRepository) -> Self {
        Self { interaction_repo }
    }

    /// 全局排行榜，次数倒序
    pub async fn get_leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ApiError> {
        let started = Instant::now();
        let rows = match self.interaction_repo.aggregate_leaderboard().await {
            Ok(rows) => rows,
            Err(err) => {
                tracing::error!("aggregate leaderboard error :{}", err.to_string());
                return Err(err.into());
            }
        };

        let entries = rows
            .into_iter()
            .map(LeaderboardEntry::try_from)
            .collect::<Result<Vec<_>, QueryExecutionError>>()
            .map_err(|err| {
                tracing::error!("leaderboard row mapping error :{}", err.to_string());
                err
            })?;

        tracing::debug!(
            "get_leaderboard - entries:{} elapsed_ms:{}",
            entries.len(),
            started.elapsed().as_millis()
        );
        Ok(entries)
    }
}
