//! 测试用的内存存储，分组规则与 SQL 一致
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::query_error::QueryExecutionError;
use crate::model::leaderboard::LeaderboardRow;

use super::interaction_repository::InteractionRepositoryTrait;

#[derive(Clone, Debug)]
pub struct InteractionRecord {
    pub user_ga_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryInteractionRepository {
    pub records: Vec<InteractionRecord>,
}

impl MemoryInteractionRepository {
    pub fn new(records: Vec<InteractionRecord>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl InteractionRepositoryTrait for MemoryInteractionRepository {
    async fn aggregate_leaderboard(&self) -> Result<Vec<LeaderboardRow>, QueryExecutionError> {
        let mut groups: HashMap<&str, (i64, DateTime<Utc>)> = HashMap::new();
        for record in &self.records {
            let Some(user) = record.user_ga_id.as_deref() else {
                continue;
            };
            groups
                .entry(user)
                .and_modify(|(count, last)| {
                    *count += 1;
                    if record.timestamp > *last {
                        *last = record.timestamp;
                    }
                })
                .or_insert((1, record.timestamp));
        }

        let mut rows: Vec<LeaderboardRow> = groups
            .into_iter()
            .map(|(user, (count, last))| LeaderboardRow {
                user_ga_id: Some(user.to_string()),
                count: Some(count),
                last_timestamp: Some(last),
            })
            .collect();
        rows.sort_by(|a, b| b.count.cmp(&a.count));
        Ok(rows)
    }
}
