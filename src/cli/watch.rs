//! Live dashboard: refreshes on a timer and on demand.
//!
//! Reads single-line commands from stdin while the report is on screen:
//! `r` forces a refresh, `s <key>` selects a sort column, `q` quits.

use super::{returns, ui};
use crate::core::ReportSource;
use crate::core::config::DisplayConfig;
use crate::core::dashboard::{Completion, Dashboard, DashboardState, FetchPolicy, load_report};
use crate::core::error::ReportError;
use crate::core::report::Report;
use crate::core::sort::{SortKey, SortState};
use anyhow::Result;
use chrono::Local;
use futures::future::BoxFuture;
use indicatif::ProgressBar;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const WATCH_RETRY_HINT: &str = "Press `r` and Enter to retry.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchCommand {
    Refresh,
    Sort(SortKey),
    Quit,
}

pub fn parse_watch_command(line: &str) -> Result<Option<WatchCommand>> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Ok(None);
    };
    match verb.to_lowercase().as_str() {
        "r" | "refresh" => Ok(Some(WatchCommand::Refresh)),
        "q" | "quit" | "exit" => Ok(Some(WatchCommand::Quit)),
        "s" | "sort" => {
            let key = parts
                .next()
                .ok_or_else(|| anyhow::anyhow!("Missing sort key, e.g. `s ytd`"))?;
            Ok(Some(WatchCommand::Sort(key.parse()?)))
        }
        other => Err(anyhow::anyhow!("Unknown command: {}", other)),
    }
}

type Cycle<'a> = BoxFuture<'a, (u64, Result<Report, ReportError>)>;

/// The refresh in flight, if any. Replacing it drops, and so cancels, the
/// previous cycle. Only a manual refresh does that; scheduled ticks wait.
struct InFlight<'a> {
    cycle: Option<Cycle<'a>>,
    spinner: Option<ProgressBar>,
}

impl<'a> InFlight<'a> {
    fn start(
        &mut self,
        dashboard: &mut Dashboard,
        source: &'a (dyn ReportSource + Send + Sync),
        policy: FetchPolicy,
        force: bool,
    ) {
        if self.cycle.is_some() {
            info!("Cancelling superseded refresh");
        }
        self.clear_spinner();
        let generation = dashboard.begin_refresh();
        self.cycle = Some(Box::pin(async move {
            (generation, load_report(source, policy, force).await)
        }));
        self.spinner = Some(ui::new_spinner("Running risk engine..."));
    }

    fn is_running(&self) -> bool {
        self.cycle.is_some()
    }

    async fn next_outcome(&mut self) -> (u64, Result<Report, ReportError>) {
        match self.cycle.as_mut() {
            Some(cycle) => cycle.await,
            None => std::future::pending().await,
        }
    }

    fn finish(&mut self) {
        self.cycle = None;
        self.clear_spinner();
    }

    fn clear_spinner(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }
}

fn render(
    dashboard: &Dashboard,
    sort: &SortState,
    display: &DisplayConfig,
    endpoint: &str,
) -> String {
    match dashboard.state() {
        DashboardState::Ready(report) => {
            let mut output = String::new();
            if let Some(message) = &report.error {
                output.push_str(&ui::advisory_banner(message));
                output.push_str("\n\n");
            }
            output.push_str(&report.display_summary(display));
            output.push_str("\n\n");
            output.push_str(&returns::display_returns(report, sort));
            output
        }
        DashboardState::Failed(e) => ui::failure_panel(e, endpoint, WATCH_RETRY_HINT),
        DashboardState::Idle | DashboardState::Loading => String::new(),
    }
}

fn footer(display: &DisplayConfig) -> String {
    ui::style_text(
        &format!(
            "Updated {}, next refresh in {}s   [r] refresh  [s <key>] sort  [q] quit",
            Local::now().format("%H:%M:%S"),
            display.refresh_interval_secs
        ),
        ui::StyleType::Subtle,
    )
}

fn redraw(dashboard: &Dashboard, sort: &SortState, display: &DisplayConfig, endpoint: &str) {
    let term = console::Term::stdout();
    if let Err(e) = term.clear_screen() {
        debug!("Failed to clear screen: {}", e);
    }
    println!("{}", render(dashboard, sort, display, endpoint));
    ui::print_separator();
    println!("{}", footer(display));
}

pub async fn run(
    source: &(dyn ReportSource + Send + Sync),
    policy: FetchPolicy,
    display: &DisplayConfig,
    sort: SortState,
    force: bool,
) -> Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    watch(source, policy, display, sort, force, input).await?;
    Ok(())
}

/// Drives the dashboard until `q`, ctrl-c or an input error, and returns it.
async fn watch<R>(
    source: &(dyn ReportSource + Send + Sync),
    policy: FetchPolicy,
    display: &DisplayConfig,
    mut sort: SortState,
    force: bool,
    input: R,
) -> Result<Dashboard>
where
    R: AsyncBufRead + Unpin,
{
    let endpoint = source.describe();
    let mut dashboard = Dashboard::new();
    let mut in_flight = InFlight {
        cycle: None,
        spinner: None,
    };
    let mut ticker =
        tokio::time::interval(Duration::from_secs(display.refresh_interval_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if in_flight.is_running() {
                    debug!("Refresh still running, skipping scheduled refresh");
                    continue;
                }
                debug!("Scheduled refresh");
                in_flight.start(&mut dashboard, source, policy, force);
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    debug!("stdin closed, refreshing on schedule only");
                    input_open = false;
                    continue;
                };
                match parse_watch_command(&line) {
                    Ok(Some(WatchCommand::Refresh)) => {
                        in_flight.start(&mut dashboard, source, policy, true);
                    }
                    Ok(Some(WatchCommand::Sort(key))) => {
                        sort.select(key);
                        if dashboard.report().is_some() {
                            redraw(&dashboard, &sort, display, &endpoint);
                        }
                    }
                    Ok(Some(WatchCommand::Quit)) => break,
                    Ok(None) => {}
                    Err(e) => warn!("{}", e),
                }
            }
            (generation, outcome) = in_flight.next_outcome() => {
                in_flight.finish();
                ticker.reset();
                if dashboard.complete(generation, outcome) == Completion::Applied {
                    redraw(&dashboard, &sort, display, &endpoint);
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    in_flight.finish();
    info!("Watch mode stopped");
    Ok(dashboard)
}
