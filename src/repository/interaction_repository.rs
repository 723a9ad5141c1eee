use crate::config::parameter::LeaderboardQueryConfig;
use crate::db::database::{Database, DatabaseTrait};
use crate::error::query_error::QueryExecutionError;
use crate::model::leaderboard::LeaderboardRow;
use async_trait::async_trait;
use std::sync::Arc;

/// 全量聚合，不分页：按用户统计交互次数和最后交互时间，次数倒序
const LEADERBOARD_SQL: &str = r#"
SELECT
    user_ga_id,
    COUNT(*) AS count,
    MAX("timestamp") AS last_timestamp
FROM interaction
WHERE user_ga_id IS NOT NULL
GROUP BY user_ga_id
ORDER BY count DESC
"#;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InteractionRepositoryTrait {
    /// 聚合排行榜，只读
    async fn aggregate_leaderboard(&self) -> Result<Vec<LeaderboardRow>, QueryExecutionError>;
}

#[derive(Clone)]
pub struct InteractionRepository {
    pub(crate) db_conn: Arc<Database>,
    query_config: LeaderboardQueryConfig,
}

impl InteractionRepository {
    pub fn new(db_conn: &Arc<Database>, query_config: &LeaderboardQueryConfig) -> Self {
        Self {
            db_conn: Arc::clone(db_conn),
            query_config: query_config.clone(),
        }
    }

    /// 启动时试跑一遍会话参数，提前暴露权限问题
    pub async fn check_session_settings(&self) -> Result<(), QueryExecutionError> {
        let mut tx = self.db_conn.get_pool().begin().await?;
        for statement in session_settings(&self.query_config) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }
        tx.rollback().await?;
        Ok(())
    }
}

/// temp_file_limit 是 superuser 级参数，普通账号需要单独授权
pub fn session_settings_hint(err: &QueryExecutionError) -> Option<&'static str> {
    match err {
        QueryExecutionError::PermissionDenied(_) => {
            Some("GRANT SET ON PARAMETER temp_file_limit TO <service role> (PostgreSQL 15+), or connect as superuser")
        }
        _ => None,
    }
}

/// 事务内的会话参数
/// temp_file_limit = 0 时排序/分组一旦需要落盘就直接报错
fn session_settings(config: &LeaderboardQueryConfig) -> [String; 4] {
    [
        "SET TRANSACTION READ ONLY".to_string(),
        "SET LOCAL temp_file_limit = 0".to_string(),
        format!("SET LOCAL work_mem = '{}kB'", config.work_mem_kb),
        format!(
            "SET LOCAL statement_timeout = {}",
            config.query_timeout.as_millis()
        ),
    ]
}

#[async_trait]
impl InteractionRepositoryTrait for InteractionRepository {
    async fn aggregate_leaderboard(&self) -> Result<Vec<LeaderboardRow>, QueryExecutionError> {
        let mut tx = self.db_conn.get_pool().begin().await?;

        for statement in session_settings(&self.query_config) {
            sqlx::query(&statement).execute(&mut *tx).await?;
        }

        let rows = sqlx::query_as::<_, LeaderboardRow>(LEADERBOARD_SQL)
            .fetch_all(&mut *tx)
            .await?;

        // 只读查询，直接回滚
        tx.rollback().await?;
        tracing::debug!("aggregate_leaderboard - rows:{}", rows.len());
        Ok(rows)
    }
}
