//! Abstraction over where risk reports come from.

use crate::core::error::FetchFailure;
use crate::core::report::RawPayload;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// Health of the backend as reported by its status endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceStatus {
    pub state: String,
    #[serde(default)]
    pub message: String,
}

impl ServiceStatus {
    pub fn is_ready(&self) -> bool {
        self.state.eq_ignore_ascii_case("ready")
    }
}

#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Fetches the raw report, making at most `retries` attempts (at least
    /// one) and sleeping `delay_ms` between them. `force` bypasses
    /// intermediary caches.
    async fn acquire(
        &self,
        retries: u32,
        delay_ms: u64,
        force: bool,
    ) -> Result<RawPayload, FetchFailure>;

    /// Single-shot probe of the backend's status endpoint.
    async fn status(&self) -> Result<ServiceStatus>;

    /// Human readable location of the report, used in troubleshooting output.
    fn describe(&self) -> String;
}
