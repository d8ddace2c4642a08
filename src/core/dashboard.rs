//! Refresh lifecycle of the dashboard.
//!
//! ```text
//! Idle ──refresh──▶ Loading ──ok──▶ Ready
//!                     ▲     └─err─▶ Failed
//!                     └──refresh── Ready | Failed
//! ```
//!
//! Every refresh opens a new generation. Only the outcome of the newest
//! generation is applied, so a slow cycle that was superseded by a manual
//! refresh can never overwrite fresher data.

use crate::core::error::ReportError;
use crate::core::normalize::normalize;
use crate::core::report::Report;
use crate::core::source::ReportSource;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// How hard a fetch cycle tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub retries: u32,
    pub delay_ms: u64,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        FetchPolicy {
            retries: 5,
            delay_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Idle,
    Loading,
    Ready(Arc<Report>),
    Failed(ReportError),
}

/// What happened to an outcome handed to [`Dashboard::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug)]
pub struct Dashboard {
    state: DashboardState,
    generation: u64,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Dashboard {
            state: DashboardState::Idle,
            generation: 0,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The report currently on display, if the last cycle succeeded.
    pub fn report(&self) -> Option<&Arc<Report>> {
        match &self.state {
            DashboardState::Ready(report) => Some(report),
            _ => None,
        }
    }

    /// Enters `Loading` and returns the generation the caller must hand back
    /// to [`Dashboard::complete`].
    pub fn begin_refresh(&mut self) -> u64 {
        self.generation += 1;
        self.state = DashboardState::Loading;
        debug!(generation = self.generation, "Refresh started");
        self.generation
    }

    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<Report, ReportError>,
    ) -> Completion {
        if generation != self.generation {
            warn!(
                generation,
                current = self.generation,
                "Discarding outcome of superseded refresh"
            );
            return Completion::Stale;
        }
        self.state = match outcome {
            Ok(report) => DashboardState::Ready(Arc::new(report)),
            Err(e) => DashboardState::Failed(e),
        };
        Completion::Applied
    }
}

/// Runs one fetch-and-normalize cycle.
#[instrument(name = "LoadReport", skip(source), fields(source = %source.describe()))]
pub async fn load_report(
    source: &(dyn ReportSource + Send + Sync),
    policy: FetchPolicy,
    force: bool,
) -> Result<Report, ReportError> {
    let raw = source
        .acquire(policy.retries, policy.delay_ms, force)
        .await?;
    let report = normalize(&raw)?;
    info!(
        holdings = report.periodic_returns.len(),
        advisory = report.error.is_some(),
        "Risk report loaded"
    );
    Ok(report)
}
