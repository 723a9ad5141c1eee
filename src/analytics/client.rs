//! Measurement Protocol 事件上报
//!
//! 上报只管发出去，失败只记日志，不影响接口返回
use crate::config::parameter::AnalyticsConfig;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyticsEvent {
    /// ec
    pub category: String,
    /// ea
    pub action: String,
    pub client_id: Option<String>,
}

impl AnalyticsEvent {
    pub fn new(category: &str, action: &str) -> Self {
        Self {
            category: category.to_string(),
            action: action.to_string(),
            client_id: None,
        }
    }

    pub fn with_client_id(mut self, ga_id: Option<&str>) -> Self {
        self.client_id = ga_id.map(client_id_from_ga_id);
        self
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait AnalyticsClient {
    fn send_event(&self, event: AnalyticsEvent);
}

/// `_ga` cookie 形如 `GA1.2.<random>.<timestamp>`，cid 取最后两段
pub fn client_id_from_ga_id(ga_id: &str) -> String {
    let parts: Vec<&str> = ga_id.split('.').collect();
    if parts.len() >= 4 && parts[0].starts_with("GA") {
        return parts[parts.len() - 2..].join(".");
    }
    ga_id.to_string()
}

#[derive(Clone)]
pub struct MeasurementProtocolClient {
    http_client: reqwest::Client,
    config: AnalyticsConfig,
}

impl MeasurementProtocolClient {
    pub fn new(config: &AnalyticsConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    fn event_params(tracking_id: &str, event: &AnalyticsEvent) -> Vec<(&'static str, String)> {
        let cid = event
            .client_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        vec![
            ("v", "1".to_string()),
            ("tid", tracking_id.to_string()),
            ("cid", cid),
            ("t", "event".to_string()),
            ("ec", event.category.clone()),
            ("ea", event.action.clone()),
        ]
    }
}

impl AnalyticsClient for MeasurementProtocolClient {
    fn send_event(&self, event: AnalyticsEvent) {
        let Some(tracking_id) = self.config.tracking_id.as_deref() else {
            tracing::debug!("analytics disabled, drop event {}:{}", event.category, event.action);
            return;
        };
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(err) => {
                tracing::warn!("analytics event dropped, no runtime: {}", err);
                return;
            }
        };

        let params = Self::event_params(tracking_id, &event);
        let request = self.http_client.post(&self.config.endpoint).form(&params);
        handle.spawn(async move {
            match request.send().await.and_then(|res| res.error_for_status()) {
                Ok(res) => tracing::debug!(
                    "analytics event {}:{} sent, status:{}",
                    event.category,
                    event.action,
                    res.status()
                ),
                Err(err) => tracing::warn!(
                    "analytics event {}:{} failed, error:{}",
                    event.category,
                    event.action,
                    err.to_string()
                ),
            }
        });
    }
}
