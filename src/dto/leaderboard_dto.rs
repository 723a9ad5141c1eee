//! 排行榜接口用到的数据结构
//!
//!

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// 请求体，`gaId` 只用于上报，不参与查询
///
/// 任意 JSON 值都接受，不是字符串就当作未传
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LeaderboardRequest {
    #[serde(rename = "gaId", default)]
    pub ga_id: Option<serde_json::Value>,
}

impl LeaderboardRequest {
    pub fn ga_id(&self) -> Option<String> {
        let raw = self.ga_id.as_ref()?.as_str()?;
        visitor_ga_id(raw)
    }
}

/// 上报用的访客标识，校验不过直接丢弃，不拒绝请求
#[derive(Clone, Debug, Validate)]
pub struct VisitorGaId {
    #[validate(length(
        min = 1,
        max = 256,
        message = "gaId must be between 1 and 256 characters"
    ))]
    pub value: String,
}

pub fn visitor_ga_id(raw: &str) -> Option<String> {
    let ga_id = VisitorGaId {
        value: raw.to_string(),
    };
    match ga_id.validate() {
        Ok(()) => Some(ga_id.value),
        Err(err) => {
            tracing::debug!("visitor gaId ignored: {}", err.to_string().replace('\n', ", "));
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_ga_id: String,
    pub count: u64,
    pub last_timestamp: DateTime<Utc>,
}
