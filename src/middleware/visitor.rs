use crate::dto::leaderboard_dto::{visitor_ga_id, LeaderboardRequest};
use crate::error::request_error::RequestError;
use async_trait::async_trait;
use axum::extract::{FromRequest, Request};
use axum::http::{header::CONTENT_TYPE, HeaderMap};
use axum_extra::extract::cookie::CookieJar;
use bytes::Bytes;

pub const GA_COOKIE: &str = "_ga";

/// 访客标识：优先取请求体 `gaId`，否则取 `_ga` cookie
///
/// 只用于上报，排行榜本身是全局的，不按访客过滤；
/// 标识不合法只会被丢弃，只有 JSON 本身解析失败才返回 400
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Visitor {
    pub ga_id: Option<String>,
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

fn ga_id_from_body(bytes: &Bytes) -> Result<Option<String>, RequestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    let payload: LeaderboardRequest = serde_json::from_slice(bytes)?;
    Ok(payload.ga_id())
}

#[async_trait]
impl<S> FromRequest<S> for Visitor
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let cookie_ga_id = CookieJar::from_headers(req.headers())
            .get(GA_COOKIE)
            .and_then(|cookie| visitor_ga_id(cookie.value()));
        let json_body = is_json(req.headers());

        let bytes = Bytes::from_request(req, state).await?;
        let body_ga_id = if json_body {
            ga_id_from_body(&bytes)?
        } else {
            None
        };

        // 空字符串等同于未传
        let ga_id = body_ga_id.or(cookie_ga_id);
        Ok(Visitor { ga_id })
    }
}
