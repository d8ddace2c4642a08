use super::util::with_retry;
use crate::core::config::ServerConfig;
use crate::core::error::{AttemptError, FetchFailure};
use crate::core::report::RawPayload;
use crate::core::source::{ReportSource, ServiceStatus};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tracing::{debug, instrument};

/// Fetches the risk report from the backend's HTTP API.
pub struct HttpReportSource {
    base_url: String,
    metrics_path: String,
    status_path: String,
    client: reqwest::Client,
    last_stamp: AtomicI64,
}

impl HttpReportSource {
    pub fn new(config: &ServerConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("riskboard/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(HttpReportSource {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            metrics_path: config.metrics_path.clone(),
            status_path: config.status_path.clone(),
            client,
            last_stamp: AtomicI64::new(0),
        })
    }

    pub fn metrics_url(&self) -> String {
        format!("{}{}", self.base_url, self.metrics_path)
    }

    /// Current time in milliseconds, bumped when needed so that no two calls
    /// on this source ever return the same stamp.
    fn cache_buster(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        now.max(previous + 1)
    }

    fn request_url(&self, force: bool) -> String {
        if force {
            format!("{}?t={}", self.metrics_url(), self.cache_buster())
        } else {
            self.metrics_url()
        }
    }

    async fn attempt(&self, url: &str) -> Result<RawPayload, AttemptError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AttemptError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptError::Status { status, body });
        }

        let text = response.text().await.map_err(AttemptError::Network)?;
        serde_json::from_str(&text).map_err(|e| AttemptError::Body(e.to_string()))
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    #[instrument(name = "RiskReportFetch", skip(self))]
    async fn acquire(
        &self,
        retries: u32,
        delay_ms: u64,
        force: bool,
    ) -> Result<RawPayload, FetchFailure> {
        let url = self.request_url(force);
        debug!("Requesting risk report from {}", url);
        with_retry(|_| self.attempt(&url), retries, delay_ms).await
    }

    async fn status(&self) -> Result<ServiceStatus> {
        let url = format!("{}{}", self.base_url, self.status_path);
        debug!("Requesting service status from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} URL: {}", e, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} URL: {}", response.status(), url));
        }

        response
            .json::<ServiceStatus>()
            .await
            .with_context(|| format!("Failed to parse status response from {url}"))
    }

    fn describe(&self) -> String {
        self.metrics_url()
    }
}
