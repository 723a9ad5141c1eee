//! 聚合查询返回的原始行
//!
use chrono::{DateTime, Utc};

use crate::dto::leaderboard_dto::LeaderboardEntry;
use crate::error::query_error::QueryExecutionError;

/// 字段全部可空，缺失值在转换时显式校验
#[derive(Clone, Debug, Default, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub user_ga_id: Option<String>,
    pub count: Option<i64>,
    pub last_timestamp: Option<DateTime<Utc>>,
}

impl TryFrom<LeaderboardRow> for LeaderboardEntry {
    type Error = QueryExecutionError;

    fn try_from(row: LeaderboardRow) -> Result<Self, Self::Error> {
        let user_ga_id = row
            .user_ga_id
            .ok_or_else(|| QueryExecutionError::MalformedRow("missing userGaId".to_string()))?;
        let count = row.count.ok_or_else(|| {
            QueryExecutionError::MalformedRow(format!("missing count for {}", user_ga_id))
        })?;
        if count < 1 {
            return Err(QueryExecutionError::MalformedRow(format!(
                "count {} for {} is below 1",
                count, user_ga_id
            )));
        }
        let last_timestamp = row.last_timestamp.ok_or_else(|| {
            QueryExecutionError::MalformedRow(format!("missing lastTimestamp for {}", user_ga_id))
        })?;

        Ok(LeaderboardEntry {
            user_ga_id,
            count: count as u64,
            last_timestamp,
        })
    }
}
