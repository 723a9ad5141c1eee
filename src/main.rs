use crate::analytics::client::MeasurementProtocolClient;
use crate::config::parameter;
use crate::db::database::{self, DatabaseTrait};
use crate::repository::interaction_repository::{session_settings_hint, InteractionRepository};
use crate::state::leaderboard_state::LeaderboardState;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use std::sync::Arc;

mod analytics;
mod config;
mod db;
mod dto;
mod error;
mod handler;
mod middleware;
mod model;
mod repository;
mod response;
mod routes;
mod service;
mod state;

// 内存分配器
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[cfg(target_env = "msvc")]
use mimalloc::MiMalloc;

#[cfg(target_env = "msvc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    // 参数初始化
    parameter::init();
    let config = parameter::config();

    // 日志
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("logger")
        .filename_suffix("log")
        .max_log_files(60)
        .build(&config.log_dir)
        .unwrap_or_else(|e| panic!("file log init failed: {}", e));
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let file_log_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_timer(time::LocalTime::rfc_3339());

    let console_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_timer(time::LocalTime::rfc_3339());
    tracing_subscriber::registry()
        .with(file_log_subscriber)
        .with(console_subscriber)
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let connection = database::Database::init(&config.database)
        .await
        .unwrap_or_else(|e| panic!("Database error: {}", e.to_string()));
    let db_conn = Arc::new(connection);

    let analytics = MeasurementProtocolClient::new(&config.analytics)
        .unwrap_or_else(|e| panic!("analytics client init failed: {}", e.to_string()));
    if config.analytics.tracking_id.is_none() {
        tracing::warn!("GA_TRACKING_ID is not set, analytics events will be dropped");
    }

    let repository = InteractionRepository::new(&db_conn, &config.leaderboard);
    // 权限不够时每次排行榜请求都会失败，这里只报错不退出
    if let Err(err) = repository.check_session_settings().await {
        match session_settings_hint(&err) {
            Some(hint) => tracing::error!("leaderboard session settings rejected: {} | {}", err, hint),
            None => tracing::error!("leaderboard session settings check failed: {}", err),
        }
    }

    let leaderboard_state = LeaderboardState::new(
        Arc::new(repository),
        Arc::new(analytics),
    );

    let host = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&host)
        .await
        .unwrap_or_else(|e| panic!("bind {} failed: {}", host, e));

    tracing::info!(
        "listening on {} | query_timeout_ms: {} | work_mem_kb: {}",
        host,
        config.leaderboard.query_timeout.as_millis(),
        config.leaderboard.work_mem_kb
    );

    axum::serve(listener, routes::root::routes(leaderboard_state))
        .await
        .unwrap_or_else(|e| panic!("Server error: {}", e.to_string()));
}
