use crate::error::error_code;
use crate::response::api_response::ApiErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// 排行榜聚合查询失败，不重试也不返回部分结果
#[derive(Error, Debug)]
pub enum QueryExecutionError {
    #[error("interaction store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("leaderboard query timed out: {0}")]
    Timeout(String),
    #[error("leaderboard aggregation exceeded its memory limit: {0}")]
    MemoryLimitExceeded(String),
    /// 一般是服务账号没有 temp_file_limit 的 SET 权限
    #[error("insufficient privilege for leaderboard query: {0}")]
    PermissionDenied(String),
    #[error("malformed leaderboard row: {0}")]
    MalformedRow(String),
    #[error("leaderboard query failed: {0}")]
    Failed(String),
}

impl QueryExecutionError {
    fn get_code(&self) -> u32 {
        match self {
            QueryExecutionError::StoreUnavailable(_) => error_code::STORE_UNAVAILABLE,
            QueryExecutionError::Timeout(_) => error_code::QUERY_TIMEOUT,
            QueryExecutionError::MemoryLimitExceeded(_) => error_code::MEMORY_LIMIT_EXCEEDED,
            QueryExecutionError::MalformedRow(_) => error_code::MALFORMED_ROW,
            QueryExecutionError::PermissionDenied(_) => error_code::PERMISSION_DENIED,
            QueryExecutionError::Failed(_) => error_code::QUERY_EXECUTION_FAILED,
        }
    }

    /// 按 SQLSTATE 归类数据库返回的错误
    pub fn from_sqlstate(code: Option<&str>, message: &str) -> Self {
        let message = message.to_string();
        match code {
            // query_canceled, statement_timeout 触发
            Some("57014") => QueryExecutionError::Timeout(message),
            // configuration_limit_exceeded (temp_file_limit) / out_of_memory
            Some("53400") | Some("53200") => QueryExecutionError::MemoryLimitExceeded(message),
            // admin_shutdown / crash_shutdown / cannot_connect_now
            Some("57P01") | Some("57P02") | Some("57P03") => {
                QueryExecutionError::StoreUnavailable(message)
            }
            // insufficient_privilege
            Some("42501") => QueryExecutionError::PermissionDenied(message),
            Some(code) if code.starts_with("08") => QueryExecutionError::StoreUnavailable(message),
            _ => QueryExecutionError::Failed(message),
        }
    }
}

impl From<sqlx::Error> for QueryExecutionError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                QueryExecutionError::from_sqlstate(db_err.code().as_deref(), db_err.message())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                QueryExecutionError::StoreUnavailable(err.to_string())
            }
            sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
                QueryExecutionError::StoreUnavailable(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
                QueryExecutionError::MalformedRow(err.to_string())
            }
            _ => QueryExecutionError::Failed(err.to_string()),
        }
    }
}

impl IntoResponse for QueryExecutionError {
    fn into_response(self) -> Response {
        let status_code = match self {
            QueryExecutionError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            QueryExecutionError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            QueryExecutionError::MemoryLimitExceeded(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QueryExecutionError::MalformedRow(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QueryExecutionError::PermissionDenied(_) => StatusCode::INTERNAL_SERVER_ERROR,
            QueryExecutionError::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        ApiErrorResponse::send(
            status_code.as_u16(),
            self.get_code(),
            Some(self.to_string()),
        )
    }
}
