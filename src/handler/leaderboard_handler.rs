use crate::analytics::client::AnalyticsEvent;
use crate::dto::leaderboard_dto::LeaderboardEntry;
use crate::error::api_error::ApiError;
use crate::middleware::visitor::Visitor;
use crate::routes::leaderboard::LEADERBOARD_PATH;
use crate::state::leaderboard_state::LeaderboardState;
use axum::{extract::State, Json};
use axum_macros::debug_handler;

pub const ANALYTICS_CATEGORY: &str = "api";

// 排行榜
// 访客标识不参与查询，排行榜是全局的；只在上报时作为 cid
#[debug_handler]
pub async fn get_leaderboard(
    State(state): State<LeaderboardState>,
    visitor: Visitor,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let entries = state.leaderboard_service.get_leaderboard().await?;
    let response = Json(entries);

    // 查询成功才上报
    state.analytics.send_event(
        AnalyticsEvent::new(ANALYTICS_CATEGORY, LEADERBOARD_PATH)
            .with_client_id(visitor.ga_id.as_deref()),
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use crate::analytics::client::{AnalyticsEvent, MeasurementProtocolClient, MockAnalyticsClient};
    use crate::config::parameter::AnalyticsConfig;
    use crate::error::query_error::QueryExecutionError;
    use crate::repository::interaction_repository::MockInteractionRepositoryTrait;
    use crate::repository::memory_repository::{InteractionRecord, MemoryInteractionRepository};
    use crate::routes::root::app;
    use crate::service::leaderboard_service::DynInteractionRepository;
    use crate::state::leaderboard_state::LeaderboardState;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::post,
        Router,
    };
    use chrono::{TimeZone, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn record(user: Option<&str>, secs: i64) -> InteractionRecord {
        InteractionRecord {
            user_ga_id: user.map(str::to_string),
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    fn example_records() -> Vec<InteractionRecord> {
        vec![
            record(Some("A"), 1),
            record(Some("A"), 5),
            record(Some("B"), 3),
            record(None, 9),
        ]
    }

    fn quiet_analytics() -> MockAnalyticsClient {
        let mut analytics = MockAnalyticsClient::new();
        analytics.expect_send_event().return_const(());
        analytics
    }

    fn test_app(repo: DynInteractionRepository, analytics: MockAnalyticsClient) -> Router {
        app(LeaderboardState::new(repo, Arc::new(analytics)))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn example_body() -> Value {
        json!([
            { "userGaId": "A", "count": 2, "lastTimestamp": "1970-01-01T00:00:05Z" },
            { "userGaId": "B", "count": 1, "lastTimestamp": "1970-01-01T00:00:03Z" }
        ])
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/leaderboard")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    /// 本地起一个总是返回 500 的采集端，收到的表单通过 channel 回传
    async fn failing_collector() -> (String, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let collector = Router::new().route(
            "/collect",
            post(move |form: String| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(form);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, collector).await.unwrap();
        });
        (format!("http://{}/collect", addr), rx)
    }

    fn app_with_real_analytics(endpoint: String) -> Router {
        let analytics = MeasurementProtocolClient::new(&AnalyticsConfig {
            tracking_id: Some("UA-1-1".to_string()),
            endpoint,
            timeout: Duration::from_secs(2),
        })
        .unwrap();
        app(LeaderboardState::new(
            Arc::new(MemoryInteractionRepository::new(example_records())),
            Arc::new(analytics),
        ))
    }

    fn get_request() -> Request<Body> {
        Request::builder()
            .uri("/api/leaderboard")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn returns_ranked_entries_as_json_array() {
        let app = test_app(
            Arc::new(MemoryInteractionRepository::new(example_records())),
            quiet_analytics(),
        );

        let response = app.oneshot(get_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, example_body());
    }

    #[tokio::test]
    async fn empty_store_returns_empty_array() {
        let app = test_app(
            Arc::new(MemoryInteractionRepository::default()),
            quiet_analytics(),
        );

        let response = app.oneshot(get_request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn visitor_identifier_never_changes_results() {
        let app = test_app(
            Arc::new(MemoryInteractionRepository::new(example_records())),
            quiet_analytics(),
        );

        let with_body = Request::builder()
            .method("POST")
            .uri("/api/leaderboard")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"gaId":"A"}"#))
            .unwrap();
        let with_cookie = Request::builder()
            .uri("/api/leaderboard")
            .header(header::COOKIE, "_ga=GA1.2.777.888")
            .body(Body::empty())
            .unwrap();

        let first = app.clone().oneshot(with_body).await.unwrap();
        let second = app.oneshot(with_cookie).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body_json(first).await, body_json(second).await);
    }

    #[tokio::test]
    async fn unusable_identifiers_still_get_the_same_leaderboard() {
        let app = test_app(
            Arc::new(MemoryInteractionRepository::new(example_records())),
            quiet_analytics(),
        );
        let baseline = app.clone().oneshot(get_request()).await.unwrap();
        assert_eq!(baseline.status(), StatusCode::OK);
        let baseline = body_json(baseline).await;

        let bodies = [
            format!(r#"{{"gaId":"{}"}}"#, "x".repeat(300)),
            r#"{"gaId":12345}"#.to_string(),
            r#"{"gaId":["GA1.2.3.4"]}"#.to_string(),
            r#"{"gaId":null}"#.to_string(),
        ];
        for body in bodies {
            let response = app.clone().oneshot(post_json(&body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{body}");
            assert_eq!(body_json(response).await, baseline, "{body}");
        }
    }

    #[tokio::test]
    async fn analytics_server_error_is_swallowed() {
        let (endpoint, mut collected) = failing_collector().await;
        let app = app_with_real_analytics(endpoint);

        let request = Request::builder()
            .uri("/api/leaderboard")
            .header(header::COOKIE, "_ga=GA1.2.777.888")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, example_body());

        // 等后台上报真正打到采集端
        let form = tokio::time::timeout(Duration::from_secs(5), collected.recv())
            .await
            .expect("analytics event was not sent")
            .unwrap();
        assert!(form.contains("ec=api"), "{form}");
        assert!(form.contains("ea=%2Fleaderboard"), "{form}");
        assert!(form.contains("cid=777.888"), "{form}");
        // 让上报任务处理完 500 响应
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    #[tokio::test]
    async fn analytics_unreachable_is_swallowed() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}/collect", listener.local_addr().unwrap());
        drop(listener);
        let app = app_with_real_analytics(endpoint);

        let first = app.clone().oneshot(get_request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(body_json(first).await, example_body());

        // 连接被拒绝后的任务跑完，再请求一次确认服务不受影响
        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = app.oneshot(get_request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);
        assert_eq!(body_json(second).await, example_body());
    }

    #[tokio::test]
    async fn success_emits_one_api_event_with_visitor_client_id() {
        let mut analytics = MockAnalyticsClient::new();
        analytics
            .expect_send_event()
            .withf(|event: &AnalyticsEvent| {
                event.category == "api"
                    && event.action == "/leaderboard"
                    && event.client_id.as_deref() == Some("777.888")
            })
            .times(1)
            .return_const(());
        let app = test_app(
            Arc::new(MemoryInteractionRepository::new(example_records())),
            analytics,
        );

        let request = Request::builder()
            .uri("/api/leaderboard")
            .header(header::COOKIE, "_ga=GA1.2.777.888")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn query_failure_is_server_error_without_event() {
        let mut repo = MockInteractionRepositoryTrait::new();
        repo.expect_aggregate_leaderboard().times(1).returning(|| {
            Err(QueryExecutionError::MemoryLimitExceeded(
                "temporary file size exceeds temp_file_limit (0kB)".to_string(),
            ))
        });
        let mut analytics = MockAnalyticsClient::new();
        analytics.expect_send_event().times(0);

        let app = test_app(Arc::new(repo), analytics);
        let response = app.oneshot(get_request()).await.unwrap();

        assert!(response.status().is_server_error());
        let body = body_json(response).await;
        assert_eq!(body["code"], json!(13004));
    }

    #[tokio::test]
    async fn store_unavailable_is_503() {
        let mut repo = MockInteractionRepositoryTrait::new();
        repo.expect_aggregate_leaderboard()
            .returning(|| Err(QueryExecutionError::StoreUnavailable("pool timed out".into())));
        let mut analytics = MockAnalyticsClient::new();
        analytics.expect_send_event().times(0);

        let response = test_app(Arc::new(repo), analytics)
            .oneshot(get_request())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request_and_skips_query() {
        let mut repo = MockInteractionRepositoryTrait::new();
        repo.expect_aggregate_leaderboard().times(0);
        let mut analytics = MockAnalyticsClient::new();
        analytics.expect_send_event().times(0);

        let request = Request::builder()
            .method("POST")
            .uri("/api/leaderboard")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{gaId"))
            .unwrap();
        let response = test_app(Arc::new(repo), analytics)
            .oneshot(request)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_check() {
        let app = test_app(
            Arc::new(MemoryInteractionRepository::default()),
            MockAnalyticsClient::new(),
        );
        let request = Request::builder()
            .uri("/api/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "code": 0, "msg": "success" }));
    }
}
