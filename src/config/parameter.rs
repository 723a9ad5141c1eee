use std::str::FromStr;
use std::time::Duration;

use once_cell::sync::OnceCell;

static APP_CONFIG: OnceCell<AppConfig> = OnceCell::new();

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_GA_ENDPOINT: &str = "https://www.google-analytics.com/collect";

/// 排行榜聚合查询配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardQueryConfig {
    /// 对应 postgres statement_timeout
    pub query_timeout: Duration,
    /// 聚合可用的内存上限(kB)，超出即失败，不落盘
    pub work_mem_kb: u32,
}

impl Default for LeaderboardQueryConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_millis(30_000),
            work_mem_kb: 65_536,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// 未配置时不上报
    pub tracking_id: Option<String>,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            tracking_id: None,
            endpoint: DEFAULT_GA_ENDPOINT.to_string(),
            timeout: Duration::from_millis(3_000),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub log_dir: String,
    pub database: DatabaseConfig,
    pub leaderboard: LeaderboardQueryConfig,
    pub analytics: AnalyticsConfig,
}

impl AppConfig {
    /// `lookup` 返回环境变量的值，测试时可以替换成 map
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|v| !v.is_empty())
            .ok_or_else(|| "config -- env var `DATABASE_URL` is not exist".to_string())?;

        let query_defaults = LeaderboardQueryConfig::default();
        let analytics_defaults = AnalyticsConfig::default();

        Ok(Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT)?,
            log_dir: lookup("LOG_DIR").unwrap_or_else(|| "log".to_string()),
            database: DatabaseConfig {
                url,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10)?,
                acquire_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "DB_ACQUIRE_TIMEOUT_MS",
                    5_000,
                )?),
                run_migrations: parse_or(&lookup, "RUN_MIGRATIONS", false)?,
            },
            leaderboard: LeaderboardQueryConfig {
                query_timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "LEADERBOARD_QUERY_TIMEOUT_MS",
                    query_defaults.query_timeout.as_millis() as u64,
                )?),
                work_mem_kb: parse_or(
                    &lookup,
                    "LEADERBOARD_WORK_MEM_KB",
                    query_defaults.work_mem_kb,
                )?,
            },
            analytics: AnalyticsConfig {
                tracking_id: lookup("GA_TRACKING_ID").filter(|v| !v.is_empty()),
                endpoint: lookup("GA_ENDPOINT").unwrap_or(analytics_defaults.endpoint),
                timeout: Duration::from_millis(parse_or(
                    &lookup,
                    "ANALYTICS_TIMEOUT_MS",
                    analytics_defaults.timeout.as_millis() as u64,
                )?),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| format!("config -- env var `{}` is invalid: {}", name, e)),
        _ => Ok(default),
    }
}

pub fn init() {
    // .env 文件可选，容器里直接用环境变量
    dotenv::dotenv().ok();
    // 给日志库设置环境变量
    if std::env::var_os("RUST_LOG").is_none() {
        std::env::set_var("RUST_LOG", "info")
    }

    let config = AppConfig::from_lookup(|name| std::env::var(name).ok())
        .unwrap_or_else(|e| panic!("{}", e));
    assert!(APP_CONFIG.set(config).is_ok());
}

pub fn config() -> &'static AppConfig {
    APP_CONFIG
        .get()
        .expect("parameter::init must be called before reading config")
}
