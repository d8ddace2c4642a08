pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::sort::{SortDirection, SortKey, SortState};
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Summary,
    Returns {
        sort: Option<SortKey>,
        ascending: bool,
    },
    Correlation,
    Risk,
    Exposure,
    Status,
    Watch,
}

/// Command-line settings that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub force: bool,
    pub retries: Option<u32>,
    pub delay_ms: Option<u64>,
}

impl Overrides {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(retries) = self.retries {
            config.fetch.retries = retries;
        }
        if let Some(delay_ms) = self.delay_ms {
            config.fetch.delay_ms = delay_ms;
        }
    }
}

fn initial_sort(sort: Option<SortKey>, ascending: bool) -> SortState {
    let mut state = SortState::default();
    if let Some(key) = sort {
        state.key = key;
    }
    if ascending {
        state.direction = SortDirection::Ascending;
    }
    state
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    overrides: &Overrides,
) -> Result<()> {
    info!("Risk dashboard starting...");

    let mut config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    overrides.apply(&mut config);
    debug!("Loaded config: {config:#?}");

    let source = providers::HttpReportSource::new(&config.server)?;
    let policy = config.fetch_policy();
    let force = overrides.force;

    match command {
        AppCommand::Summary => cli::summary::run(&source, policy, &config.display, force).await,
        AppCommand::Returns { sort, ascending } => {
            cli::returns::run(&source, policy, initial_sort(sort, ascending), force).await
        }
        AppCommand::Correlation => cli::correlation::run(&source, policy, force).await,
        AppCommand::Risk => cli::risk::run(&source, policy, force).await,
        AppCommand::Exposure => cli::exposure::run(&source, policy, force).await,
        AppCommand::Status => cli::status::run(&source).await,
        AppCommand::Watch => {
            cli::watch::run(&source, policy, &config.display, SortState::default(), force).await
        }
    }
}
